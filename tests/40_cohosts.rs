mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

use common::TestServer;

fn cohost_path(server: &TestServer, user: uuid::Uuid) -> String {
    server.url(&format!(
        "/api/sessions/{}/cohosts/{}",
        server.fixture.approved_session, user
    ))
}

#[tokio::test]
async fn unrelated_user_cannot_remove_cohost() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .client
        .delete(cohost_path(&server, server.fixture.bob))
        .header("authorization", server.bearer(server.fixture.cy))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
    Ok(())
}

#[tokio::test]
async fn cohost_can_leave() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .client
        .delete(cohost_path(&server, server.fixture.bob))
        .header("authorization", server.bearer(server.fixture.bob))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["removed"], true);

    // Gone now, so a second removal is a 404
    let res = server
        .client
        .delete(cohost_path(&server, server.fixture.bob))
        .header("authorization", server.bearer(server.fixture.ada))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn host_removes_existing_cohost() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .client
        .delete(cohost_path(&server, server.fixture.bob))
        .header("authorization", server.bearer(server.fixture.ada))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["user_id"], server.fixture.bob.to_string());
    assert_eq!(body["data"]["removed"], true);

    let path = format!("/api/v1/sessions/{}?include=cohosts", server.fixture.approved_session);
    let body: Value = server.read(&path).await?.json().await?;
    assert_eq!(body["data"]["cohosts"], serde_json::json!([]));
    Ok(())
}

#[tokio::test]
async fn event_admin_removes_existing_cohost() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .client
        .delete(cohost_path(&server, server.fixture.bob))
        .header("authorization", server.bearer(server.fixture.dee))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["session_id"], server.fixture.approved_session.to_string());
    assert_eq!(body["data"]["removed"], true);
    Ok(())
}

#[tokio::test]
async fn removal_checks_auth_then_input_then_session() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .client
        .delete(cohost_path(&server, server.fixture.bob))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .delete(server.url("/api/sessions/nope/cohosts/also-nope"))
        .header("authorization", server.bearer(server.fixture.ada))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .client
        .delete(server.url(&format!(
            "/api/sessions/{}/cohosts/{}",
            uuid::Uuid::new_v4(),
            server.fixture.bob
        )))
        .header("authorization", server.bearer(server.fixture.dee))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn admin_sees_full_permission_list() -> Result<()> {
    let server = TestServer::spawn().await?;
    let path = server.url(&format!("/api/events/{}/permissions", server.fixture.event));

    let res = server
        .client
        .get(&path)
        .header("authorization", server.bearer(server.fixture.dee))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["label"], "Admin");
    let perms: Vec<&str> = body["data"]["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();
    assert!(perms.contains(&"manageTeam"));
    assert!(!perms.contains(&"deleteEvent"));
    Ok(())
}

#[tokio::test]
async fn attendee_permissions_and_non_members() -> Result<()> {
    let server = TestServer::spawn().await?;

    let body: Value = server
        .client
        .get(server.url(&format!("/api/events/{}/permissions", server.fixture.event)))
        .header("authorization", server.bearer(server.fixture.cy))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["data"]["permissions"], serde_json::json!(["submitProposal", "vote"]));

    let res = server
        .client
        .get(server.url(&format!("/api/events/{}/permissions", uuid::Uuid::new_v4())))
        .header("authorization", server.bearer(server.fixture.cy))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

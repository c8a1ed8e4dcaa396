use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::SecurityConfig;
use crate::handlers::{self, method_not_allowed, protected, public, v1};
use crate::middleware::{require_api_key, API_KEY_HEADER};
use crate::state::AppState;

/// Full application router
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Invites: lookup is public, the rest require a bearer token
        .merge(invite_routes())
        .merge(session_routes())
        // Versioned read API behind the API key
        .nest("/api/v1", read_api_routes(state.clone()))
        .fallback(handlers::route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn read_api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profiles", get(v1::profile_list).fallback(method_not_allowed))
        .route("/profiles/:id", get(v1::profile_get).fallback(method_not_allowed))
        .route("/sessions", get(v1::session_list).fallback(method_not_allowed))
        .route("/sessions/:id", get(v1::session_get).fallback(method_not_allowed))
        .route("/tracks", get(v1::track_list).fallback(method_not_allowed))
        .route("/tracks/:id", get(v1::track_get).fallback(method_not_allowed))
        .route("/venues", get(v1::venue_list).fallback(method_not_allowed))
        .route("/venues/:id", get(v1::venue_get).fallback(method_not_allowed))
        .route("/timeslots", get(v1::timeslot_list).fallback(method_not_allowed))
        .route("/timeslots/:id", get(v1::timeslot_get).fallback(method_not_allowed))
        // Key check wraps the method fallback too, so a keyless POST is 401
        .route_layer(middleware::from_fn_with_state(state, require_api_key))
}

fn invite_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/invites/:token",
            get(public::invite_get)
                .delete(protected::invite_revoke)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/invites/:token/accept",
            post(protected::invite_accept).fallback(method_not_allowed),
        )
}

fn session_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/sessions/:id/invites",
            get(protected::session_invite_list)
                .post(protected::session_invite_create)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/sessions/:id/cohosts/:user_id",
            delete(protected::cohost_delete).fallback(method_not_allowed),
        )
        .route(
            "/api/events/:event_id/permissions",
            get(protected::event_permissions_get).fallback(method_not_allowed),
        )
}

fn cors_layer(config: &SecurityConfig) -> CorsLayer {
    if config.permissive_cors {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(API_KEY_HEADER),
        ])
}

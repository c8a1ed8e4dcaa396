use uuid::Uuid;

use crate::database::models::Session;
use crate::database::Store;
use crate::error::ApiError;
use crate::middleware::response::not_found;
use crate::permissions::{is_admin_role, Role};

/// A loaded session plus what the acting user is to it
#[derive(Debug, Clone)]
pub struct SessionAccess {
    pub session: Session,
    pub actor: Uuid,
    pub role: Option<Role>,
}

impl SessionAccess {
    /// Load the session (404 when absent) and the actor's role in its event
    pub async fn load(store: &dyn Store, session_id: Uuid, actor: Uuid) -> Result<Self, ApiError> {
        let session = store
            .find_session(session_id)
            .await?
            .ok_or_else(|| not_found("Session"))?;
        let role = store.member_role(session.event_id, actor).await?;

        Ok(Self { session, actor, role })
    }

    pub fn is_host(&self) -> bool {
        self.session.host_id == self.actor
    }

    pub fn is_admin(&self) -> bool {
        self.role.map_or(false, is_admin_role)
    }

    /// Host or event admin, else 403 with `message`
    pub fn require_host_or_admin(&self, message: &str) -> Result<(), ApiError> {
        if self.is_host() || self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden(message))
        }
    }
}

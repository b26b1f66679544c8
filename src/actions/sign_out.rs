use chrono::Utc;

use crate::events::{AuthEvent, EventDispatcher};
use crate::repository::{AdminRepository, SessionRepository};
use crate::{AdminSessionStore, AuthError, ObjectId, SessionStore};

/// Ends one session of the signed-in user. Works for the current session
/// and for any other session the user owns.
pub struct SignOutAction<S: SessionRepository> {
    sessions: SessionStore<S>,
    events: EventDispatcher,
}

impl<S: SessionRepository> SignOutAction<S> {
    pub fn new(sessions: SessionStore<S>) -> Self {
        Self {
            sessions,
            events: EventDispatcher::new(),
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    /// # Errors
    ///
    /// `SessionNotFound` if the session does not exist, `AccessDenied` if it
    /// belongs to another user.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sign_out", skip_all, err)
    )]
    pub async fn execute(&self, user_id: ObjectId, session_id: ObjectId) -> Result<(), AuthError> {
        let session = self.sessions.find_by_id(session_id).await?;
        if session.user_id != user_id {
            return Err(AuthError::AccessDenied);
        }

        self.sessions.terminate(session_id).await?;

        log::info!(
            target: "bastion_auth",
            "msg=\"user signed out\", user_id=\"{user_id}\", session_id=\"{session_id}\""
        );
        self.events
            .dispatch(AuthEvent::SignedOut {
                user_id,
                session_id,
                at: Utc::now(),
            })
            .await;
        Ok(())
    }
}

pub struct AdminSignOutAction<A: AdminRepository> {
    sessions: AdminSessionStore<A>,
    events: EventDispatcher,
}

impl<A: AdminRepository> AdminSignOutAction<A> {
    pub fn new(admins: A) -> Self {
        Self {
            sessions: AdminSessionStore::new(admins),
            events: EventDispatcher::new(),
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "admin_sign_out", skip_all, err)
    )]
    pub async fn execute(&self, admin_id: ObjectId) -> Result<(), AuthError> {
        self.sessions.clear(admin_id).await?;

        log::info!(target: "bastion_auth", "msg=\"admin signed out\", admin_id=\"{admin_id}\"");
        self.events
            .dispatch(AuthEvent::AdminSignedOut {
                admin_id,
                at: Utc::now(),
            })
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{admin_with_password, Fixture};

    #[tokio::test]
    async fn test_sign_out_own_session() {
        let fx = Fixture::new();
        let user_id = ObjectId::new();
        let (session_id, _) = fx.session_store().create("ip", user_id, "ua").await.unwrap();

        SignOutAction::new(fx.session_store())
            .execute(user_id, session_id)
            .await
            .unwrap();
        assert!(fx.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_sign_out_foreign_session_denied() {
        let fx = Fixture::new();
        let (session_id, _) = fx
            .session_store()
            .create("ip", ObjectId::new(), "ua")
            .await
            .unwrap();

        let action = SignOutAction::new(fx.session_store());
        assert_eq!(
            action.execute(ObjectId::new(), session_id).await.unwrap_err(),
            AuthError::AccessDenied
        );
        assert_eq!(fx.sessions.len(), 1);
        assert_eq!(
            action.execute(ObjectId::new(), ObjectId::new()).await.unwrap_err(),
            AuthError::SessionNotFound
        );
    }

    #[tokio::test]
    async fn test_admin_sign_out_clears_session() {
        let fx = Fixture::new();
        fx.admins
            .insert(admin_with_password(ObjectId::ROOT, "root", "rootpassword"));
        let signed = fx
            .admin_sign_in()
            .execute("root", &"rootpassword".into())
            .await
            .unwrap();

        AdminSignOutAction::new(fx.admins.clone())
            .execute(ObjectId::ROOT)
            .await
            .unwrap();

        assert_eq!(
            fx.admin_authenticate()
                .execute(signed.token.expose_secret())
                .await
                .unwrap_err(),
            AuthError::InvalidCredentials
        );
    }
}

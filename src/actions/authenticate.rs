//! Per-request bearer token checks.
//!
//! Transport middleware calls these with the raw `Authorization` header
//! value and stores the returned identity on the request.

use crate::repository::{AdminRepository, SessionRepository};
use crate::token::{IdentityClaims, Role, TokenCodec};
use crate::{AdminSessionStore, AuthError, ObjectId, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: ObjectId,
    pub session_id: ObjectId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAdmin {
    pub admin_id: ObjectId,
    pub username: String,
}

impl AuthenticatedAdmin {
    pub fn is_root(&self) -> bool {
        self.admin_id.is_root()
    }
}

pub struct AuthenticateAction<S: SessionRepository> {
    sessions: SessionStore<S>,
    codec: TokenCodec,
}

impl<S: SessionRepository> AuthenticateAction<S> {
    /// `codec` must be the user codec.
    pub fn new(sessions: SessionStore<S>, codec: TokenCodec) -> Self {
        Self { sessions, codec }
    }

    /// Verifies the token, checks the session key it carries and refreshes
    /// the session's last activity.
    ///
    /// # Errors
    ///
    /// `TokenInvalid` for a bad, expired or non-user token;
    /// `InvalidCredentials` when the session is gone, expired or does not
    /// match.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "authenticate", skip_all, err)
    )]
    pub async fn execute(&self, authorization: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims: IdentityClaims = self.codec.verify(authorization)?;
        if claims.role != Role::User {
            return Err(AuthError::TokenInvalid);
        }
        let session_id = claims.sid.ok_or(AuthError::TokenInvalid)?;

        let session = self
            .sessions
            .verify_credentials(claims.session.expose_secret(), session_id)
            .await?;
        if session.user_id != claims.sub {
            return Err(AuthError::InvalidCredentials);
        }

        self.sessions.touch_activity(session_id).await?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            session_id,
        })
    }
}

pub struct AdminAuthenticateAction<A: AdminRepository> {
    sessions: AdminSessionStore<A>,
    codec: TokenCodec,
}

impl<A: AdminRepository> AdminAuthenticateAction<A> {
    /// `codec` must be the admin codec.
    pub fn new(admins: A, codec: TokenCodec) -> Self {
        Self {
            sessions: AdminSessionStore::new(admins),
            codec,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "admin_authenticate", skip_all, err)
    )]
    pub async fn execute(&self, authorization: &str) -> Result<AuthenticatedAdmin, AuthError> {
        let claims: IdentityClaims = self.codec.verify(authorization)?;
        if claims.role != Role::Admin {
            return Err(AuthError::TokenInvalid);
        }

        let admin = self
            .sessions
            .check(claims.sub, claims.session.expose_secret())
            .await?;
        self.sessions.touch_activity(admin.id).await?;

        Ok(AuthenticatedAdmin {
            admin_id: admin.id,
            username: admin.username,
        })
    }
}

//! Tokens for email verification and password reset links.
//!
//! The token itself is the only state: nothing is stored when one is issued,
//! and consuming one does not invalidate it. Replays are harmless because
//! the actions behind them refuse to run twice (an already verified account
//! is rejected) or converge (a reset sets the same password).

use chrono::{Duration, Utc};

use crate::events::{AuthEvent, EventDispatcher};
use crate::repository::User;
use crate::token::{ActionClaims, EmailAction, TokenCodec};
use crate::{AuthError, SecretString};

pub const DEFAULT_EMAIL_TOKEN_TTL_HOURS: i64 = 24;

/// Mints an action token and hands it to the event listeners for delivery.
#[derive(Clone)]
pub struct IssueEmailTokenAction {
    codec: TokenCodec,
    ttl: Duration,
    events: EventDispatcher,
}

impl IssueEmailTokenAction {
    /// `codec` must be the user codec.
    pub fn new(codec: TokenCodec, events: EventDispatcher) -> Self {
        Self {
            codec,
            ttl: Duration::hours(DEFAULT_EMAIL_TOKEN_TTL_HOURS),
            events,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "issue_email_token", skip_all, err)
    )]
    pub async fn execute(
        &self,
        user: &User,
        action: EmailAction,
    ) -> Result<SecretString, AuthError> {
        let claims = ActionClaims {
            sub: user.id,
            action,
            username: user.username.clone(),
            email: user.email.clone(),
        };
        let token = self.codec.issue(&claims, self.ttl)?;

        log::info!(
            target: "bastion_auth",
            "msg=\"email token issued\", user_id=\"{}\", action=\"{action}\"",
            user.id
        );
        self.events
            .dispatch(AuthEvent::EmailTokenIssued {
                user_id: user.id,
                username: user.username.clone(),
                email: user.email.clone(),
                action,
                token: token.clone(),
                at: Utc::now(),
            })
            .await;

        Ok(token)
    }
}

/// Verifies an action token and checks it was minted for `expected`.
#[derive(Clone)]
pub struct ConsumeEmailTokenAction {
    codec: TokenCodec,
}

impl ConsumeEmailTokenAction {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    /// # Errors
    ///
    /// `TokenInvalid` for a bad or expired token, `AccessDenied` when the
    /// token is valid but for the other action.
    pub fn execute(&self, token: &str, expected: EmailAction) -> Result<ActionClaims, AuthError> {
        let claims: ActionClaims = self.codec.verify(token)?;
        if claims.action != expected {
            return Err(AuthError::AccessDenied);
        }
        Ok(claims)
    }
}

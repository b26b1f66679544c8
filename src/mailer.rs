//! Delivery of email action tokens.
//!
//! Actions never send mail themselves. They emit
//! [`AuthEvent::EmailTokenIssued`] and a [`MailerListener`] turns it into an
//! [`EmailMessage`] for whatever [`Mailer`] the application provides.
//!
//! ```rust
//! use bastion::events::EventDispatcher;
//! use bastion::mailer::{EmailLinks, LogMailer, MailerListener};
//!
//! let links = EmailLinks::new(
//!     "https://app.example.com/verify?token=",
//!     "https://app.example.com/reset?token=",
//! );
//! let events = EventDispatcher::new().listen(MailerListener::new(LogMailer, links));
//! ```

use async_trait::async_trait;

use crate::events::{AuthEvent, Listener};
use crate::token::EmailAction;
use crate::{AuthError, SecretString};

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to_email: String,
    pub username: String,
    pub action: EmailAction,
    /// Link with the token appended.
    pub link: SecretString,
}

#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, message: &EmailMessage) -> Result<(), AuthError>;
}

/// Logs the recipient and action instead of sending anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), AuthError> {
        log::info!(
            target: "bastion_auth::mailer",
            "msg=\"email not sent, log mailer in use\", to=\"{}\", action=\"{}\"",
            message.to_email,
            message.action
        );
        Ok(())
    }
}

/// Link prefixes the token is appended to, one per action.
#[derive(Debug, Clone)]
pub struct EmailLinks {
    pub verify: String,
    pub reset: String,
}

impl EmailLinks {
    pub fn new(verify: impl Into<String>, reset: impl Into<String>) -> Self {
        Self {
            verify: verify.into(),
            reset: reset.into(),
        }
    }

    pub fn link_for(&self, action: EmailAction, token: &SecretString) -> SecretString {
        let base = match action {
            EmailAction::Verify => &self.verify,
            EmailAction::Reset => &self.reset,
        };
        SecretString::new(format!("{base}{}", token.expose_secret()))
    }
}

/// Sends a message for every issued email token. Delivery failures are
/// logged and swallowed; the action that issued the token still succeeds.
pub struct MailerListener<M: Mailer> {
    mailer: M,
    links: EmailLinks,
}

impl<M: Mailer> MailerListener<M> {
    pub fn new(mailer: M, links: EmailLinks) -> Self {
        Self { mailer, links }
    }
}

#[async_trait]
impl<M: Mailer> Listener for MailerListener<M> {
    async fn handle(&self, event: &AuthEvent) {
        let AuthEvent::EmailTokenIssued {
            user_id,
            username,
            email,
            action,
            token,
            ..
        } = event
        else {
            return;
        };

        let message = EmailMessage {
            to_email: email.clone(),
            username: username.clone(),
            action: *action,
            link: self.links.link_for(*action, token),
        };

        if let Err(e) = self.mailer.send(&message).await {
            log::error!(
                target: "bastion_auth::mailer",
                "msg=\"email delivery failed\", user_id=\"{user_id}\", action=\"{action}\", error=\"{e}\""
            );
        }
    }
}

#[cfg(any(test, feature = "mocks"))]
pub use mock::MockMailer;

#[cfg(any(test, feature = "mocks"))]
mod mock {
    #![allow(clippy::unwrap_used)]

    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::{EmailMessage, Mailer};
    use crate::AuthError;

    /// Keeps every message in memory.
    #[derive(Clone, Default)]
    pub struct MockMailer {
        pub sent: Arc<Mutex<Vec<EmailMessage>>>,
    }

    impl MockMailer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn last(&self) -> Option<EmailMessage> {
            self.sent.lock().unwrap().last().cloned()
        }

        pub fn count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Mailer for MockMailer {
        async fn send(&self, message: &EmailMessage) -> Result<(), AuthError> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }
}

use async_trait::async_trait;

use crate::events::{AuthEvent, Listener};

/// Writes every event to the `log` facade under `bastion_auth::events`.
pub struct LoggingListener {
    level: log::Level,
}

impl LoggingListener {
    pub fn new() -> Self {
        Self {
            level: log::Level::Info,
        }
    }

    pub fn with_level(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Listener for LoggingListener {
    async fn handle(&self, event: &AuthEvent) {
        // failed sign-ins are never quieter than warn
        let level = match event {
            AuthEvent::SignInFailed { .. } => self.level.min(log::Level::Warn),
            _ => self.level,
        };
        log::log!(
            target: "bastion_auth::events",
            level,
            "event={} {:?}",
            event.name(),
            event
        );
    }
}

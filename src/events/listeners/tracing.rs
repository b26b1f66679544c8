use async_trait::async_trait;

use crate::events::{AuthEvent, Listener};

/// Emits events through `tracing`. Requires the `tracing` feature.
pub struct TracingListener;

#[async_trait]
impl Listener for TracingListener {
    async fn handle(&self, event: &AuthEvent) {
        tracing::info!(
            target: "bastion_auth::events",
            event_name = event.name(),
            at = %event.timestamp(),
            ?event,
            "auth event"
        );
    }
}

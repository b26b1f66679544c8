use async_trait::async_trait;

use super::AuthEvent;

/// Receives every event dispatched through an
/// [`EventDispatcher`](super::EventDispatcher).
///
/// Listeners run inline, in registration order, before the action returns.
/// Match on the variants you care about and ignore the rest.
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    async fn handle(&self, event: &AuthEvent);
}

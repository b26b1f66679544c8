use std::sync::Arc;

use super::{AuthEvent, Listener};

/// Ordered set of listeners shared by the actions of one deployment.
///
/// Built once at startup and cloned into each action. Clones share the
/// same listeners.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    listeners: Vec<Arc<dyn Listener>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listeners are called in the order they are added.
    #[must_use]
    pub fn listen(mut self, listener: impl Listener) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub async fn dispatch(&self, event: AuthEvent) {
        for listener in &self.listeners {
            listener.handle(&event).await;
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::ObjectId;

    struct Recorder {
        tag: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Listener for Recorder {
        async fn handle(&self, event: &AuthEvent) {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.tag, event.name()));
        }
    }

    #[tokio::test]
    async fn test_dispatch_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let events = EventDispatcher::new()
            .listen(Recorder {
                tag: "a",
                seen: seen.clone(),
            })
            .listen(Recorder {
                tag: "b",
                seen: seen.clone(),
            });

        events
            .dispatch(AuthEvent::PasswordChanged {
                user_id: ObjectId::new(),
                at: Utc::now(),
            })
            .await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["a:auth.password.changed", "b:auth.password.changed"]
        );
    }

    #[tokio::test]
    async fn test_clones_share_listeners() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let events = EventDispatcher::new().listen(Recorder {
            tag: "x",
            seen: seen.clone(),
        });
        let cloned = events.clone();

        cloned
            .dispatch(AuthEvent::AdminSignedIn {
                admin_id: ObjectId::ROOT,
                at: Utc::now(),
            })
            .await;
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_dispatcher_is_noop() {
        let events = EventDispatcher::new();
        assert!(events.is_empty());
        events
            .dispatch(AuthEvent::EmailVerified {
                user_id: ObjectId::new(),
                at: Utc::now(),
            })
            .await;
    }
}

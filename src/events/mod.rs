//! Authentication events.
//!
//! Actions that change account state emit an [`AuthEvent`] to the
//! [`EventDispatcher`] they were constructed with. A dispatcher with no
//! listeners drops events.
//!
//! ```rust
//! use bastion::events::{listeners::LoggingListener, EventDispatcher};
//!
//! let events = EventDispatcher::new().listen(LoggingListener::new());
//! assert_eq!(events.len(), 1);
//! ```
//!
//! Custom listeners implement [`Listener`]:
//!
//! ```rust,ignore
//! use bastion::events::{AuthEvent, Listener};
//! use async_trait::async_trait;
//!
//! struct FailedSignInCounter;
//!
//! #[async_trait]
//! impl Listener for FailedSignInCounter {
//!     async fn handle(&self, event: &AuthEvent) {
//!         if let AuthEvent::SignInFailed { ip, .. } = event {
//!             // bump a counter keyed by ip
//!         }
//!     }
//! }
//! ```

mod event;
mod listener;
mod registry;

pub mod listeners;

pub use event::AuthEvent;
pub use listener::Listener;
pub use registry::EventDispatcher;

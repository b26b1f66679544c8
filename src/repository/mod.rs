//! Storage traits and records.
//!
//! The core never talks to a database directly. Each entity gets its own
//! async trait; every method is a single atomic operation on the store.
//!
//! | Trait | Records |
//! |-------|---------|
//! | [`UserRepository`] | [`User`] |
//! | [`AdminRepository`] | [`Admin`], including its single session field |
//! | [`SessionRepository`] | [`Session`](crate::Session) rows |
//! | [`AttemptRepository`] | [`AuthAttempt`] rows for throttling |
//!
//! Lookups by username and email expect lower-cased input; the actions
//! normalize before calling.
//!
//! With the `mocks` feature enabled, `Mock*Repository` types provide
//! in-memory implementations for tests.

mod admin;
mod attempt;
mod session;
mod user;

#[cfg(any(test, feature = "mocks"))]
mod admin_mock;
#[cfg(any(test, feature = "mocks"))]
mod attempt_mock;
#[cfg(any(test, feature = "mocks"))]
mod session_mock;
#[cfg(any(test, feature = "mocks"))]
mod user_mock;

pub use admin::{Admin, AdminRepository, NewAdmin};
pub use attempt::{AttemptRepository, AuthAttempt};
pub use session::{NewSession, SessionRepository};
pub use user::{NewUser, User, UserRepository};

#[cfg(any(test, feature = "mocks"))]
pub use admin_mock::MockAdminRepository;
#[cfg(any(test, feature = "mocks"))]
pub use attempt_mock::MockAttemptRepository;
#[cfg(any(test, feature = "mocks"))]
pub use session_mock::MockSessionRepository;
#[cfg(any(test, feature = "mocks"))]
pub use user_mock::MockUserRepository;

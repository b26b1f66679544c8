use chrono::{DateTime, Utc};

use crate::token::EmailAction;
use crate::{ObjectId, SecretString};

#[derive(Debug, Clone)]
pub enum AuthEvent {
    UserRegistered {
        user_id: ObjectId,
        username: String,
        email: String,
        at: DateTime<Utc>,
    },

    SignedIn {
        user_id: ObjectId,
        session_id: ObjectId,
        ip: String,
        at: DateTime<Utc>,
    },
    SignInFailed {
        username: String,
        ip: String,
        reason: &'static str,
        at: DateTime<Utc>,
    },
    SignedOut {
        user_id: ObjectId,
        session_id: ObjectId,
        at: DateTime<Utc>,
    },
    AdminSignedIn {
        admin_id: ObjectId,
        at: DateTime<Utc>,
    },
    AdminSignedOut {
        admin_id: ObjectId,
        at: DateTime<Utc>,
    },

    /// Carries the raw token so a mailer can deliver it. The token redacts
    /// itself in `Debug` output.
    EmailTokenIssued {
        user_id: ObjectId,
        username: String,
        email: String,
        action: EmailAction,
        token: SecretString,
        at: DateTime<Utc>,
    },
    EmailVerified {
        user_id: ObjectId,
        at: DateTime<Utc>,
    },
    PasswordChanged {
        user_id: ObjectId,
        at: DateTime<Utc>,
    },
    PasswordResetCompleted {
        user_id: ObjectId,
        at: DateTime<Utc>,
    },

    SessionsTerminated {
        user_id: ObjectId,
        count: u64,
        at: DateTime<Utc>,
    },
    UserStatusChanged {
        user_id: ObjectId,
        is_active: bool,
        at: DateTime<Utc>,
    },
}

impl AuthEvent {
    /// Dot-separated event name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserRegistered { .. } => "user.registered",
            Self::SignedIn { .. } => "auth.sign_in.success",
            Self::SignInFailed { .. } => "auth.sign_in.failed",
            Self::SignedOut { .. } => "auth.sign_out",
            Self::AdminSignedIn { .. } => "admin.sign_in.success",
            Self::AdminSignedOut { .. } => "admin.sign_out",
            Self::EmailTokenIssued { .. } => "auth.email.token_issued",
            Self::EmailVerified { .. } => "auth.email.verified",
            Self::PasswordChanged { .. } => "auth.password.changed",
            Self::PasswordResetCompleted { .. } => "auth.password.reset_completed",
            Self::SessionsTerminated { .. } => "auth.sessions.terminated",
            Self::UserStatusChanged { .. } => "user.status_changed",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::UserRegistered { at, .. }
            | Self::SignedIn { at, .. }
            | Self::SignInFailed { at, .. }
            | Self::SignedOut { at, .. }
            | Self::AdminSignedIn { at, .. }
            | Self::AdminSignedOut { at, .. }
            | Self::EmailTokenIssued { at, .. }
            | Self::EmailVerified { at, .. }
            | Self::PasswordChanged { at, .. }
            | Self::PasswordResetCompleted { at, .. }
            | Self::SessionsTerminated { at, .. }
            | Self::UserStatusChanged { at, .. } => *at,
        }
    }
}

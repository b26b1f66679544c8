use serde::{Deserialize, Serialize};

use crate::{ObjectId, SecretString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Names an account and the session it signed in with.
///
/// `session` is the raw session key; the store only keeps its digest, so a
/// token is useless once its session row is gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: ObjectId,
    pub session: SecretString,
    /// Session row id. Admins hold a single session on their own record and
    /// carry no `sid`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<ObjectId>,
    pub role: Role,
}

impl IdentityClaims {
    pub fn user(user_id: ObjectId, session_id: ObjectId, session_key: SecretString) -> Self {
        Self {
            sub: user_id,
            session: session_key,
            sid: Some(session_id),
            role: Role::User,
        }
    }

    pub fn admin(admin_id: ObjectId, session_key: SecretString) -> Self {
        Self {
            sub: admin_id,
            session: session_key,
            sid: None,
            role: Role::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailAction {
    Verify,
    Reset,
}

impl EmailAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verify => "verify",
            Self::Reset => "reset",
        }
    }
}

impl std::fmt::Display for EmailAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorizes one email-driven action for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionClaims {
    pub sub: ObjectId,
    pub action: EmailAction,
    pub username: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_json_shape() {
        let claims = IdentityClaims::user(ObjectId::ROOT, ObjectId::ROOT, "k3y".into());
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["session"], "k3y");
        assert_eq!(value["sid"], "000000000000000000000000");
    }

    #[test]
    fn test_admin_claims_omit_sid() {
        let claims = IdentityClaims::admin(ObjectId::ROOT, "k3y".into());
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["role"], "admin");
        assert!(value.get("sid").is_none());

        let back: IdentityClaims = serde_json::from_value(value).unwrap();
        assert_eq!(back, claims);
    }

    #[test]
    fn test_email_action_names() {
        assert_eq!(
            serde_json::to_string(&EmailAction::Reset).unwrap(),
            "\"reset\""
        );
        assert_eq!(EmailAction::Verify.to_string(), "verify");
    }
}

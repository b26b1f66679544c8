//! Admin account management. Only the root admin may call these.

use chrono::Utc;

use crate::actions::AuthenticatedAdmin;
use crate::crypto::{hash_blocking, Argon2Hasher, PasswordHasher};
use crate::pagination::{PageRequest, Paginated};
use crate::repository::{Admin, AdminRepository, NewAdmin};
use crate::validators::{validate_username, PasswordPolicy};
use crate::{AuthError, ObjectId, SecretString};

pub const ROOT_USERNAME: &str = "root";

pub struct ManageAdminsAction<A: AdminRepository, H = Argon2Hasher> {
    admins: A,
    password_policy: PasswordPolicy,
    hasher: H,
}

impl<A: AdminRepository> ManageAdminsAction<A, Argon2Hasher> {
    pub fn new(admins: A) -> Self {
        Self {
            admins,
            password_policy: PasswordPolicy::default(),
            hasher: Argon2Hasher::default(),
        }
    }
}

impl<A, H> ManageAdminsAction<A, H>
where
    A: AdminRepository,
    H: PasswordHasher + Clone + 'static,
{
    pub fn with_hasher<H2: PasswordHasher>(self, hasher: H2) -> ManageAdminsAction<A, H2> {
        ManageAdminsAction {
            admins: self.admins,
            password_policy: self.password_policy,
            hasher,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, password_policy: PasswordPolicy) -> Self {
        self.password_policy = password_policy;
        self
    }

    fn require_root(caller: &AuthenticatedAdmin) -> Result<(), AuthError> {
        if caller.is_root() {
            Ok(())
        } else {
            log::warn!(
                target: "bastion_auth",
                "msg=\"admin management denied\", admin_id=\"{}\"",
                caller.admin_id
            );
            Err(AuthError::AccessDenied)
        }
    }

    fn require_not_root(target: ObjectId) -> Result<(), AuthError> {
        if target.is_root() {
            Err(AuthError::AccessDenied)
        } else {
            Ok(())
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "create_admin", skip_all, err)
    )]
    pub async fn create(
        &self,
        caller: &AuthenticatedAdmin,
        username: &str,
        password: &SecretString,
    ) -> Result<Admin, AuthError> {
        Self::require_root(caller)?;
        validate_username(username)?;
        self.password_policy.validate(password.expose_secret())?;

        let username = username.to_lowercase();
        if self.admins.find_admin_by_username(&username).await?.is_some() {
            return Err(AuthError::UsernameExists);
        }

        let hashed_password = hash_blocking(&self.hasher, password).await?;
        let admin = self
            .admins
            .create_admin(NewAdmin {
                id: ObjectId::new(),
                username,
                hashed_password,
            })
            .await?;

        log::info!(target: "bastion_auth", "msg=\"admin created\", admin_id=\"{}\"", admin.id);
        Ok(admin)
    }

    /// Oldest first, root included.
    pub async fn list(
        &self,
        caller: &AuthenticatedAdmin,
        page: PageRequest,
    ) -> Result<Paginated<Admin>, AuthError> {
        Self::require_root(caller)?;

        let total = self.admins.count_admins().await?;
        if total == 0 {
            return Err(AuthError::AdminNotFound);
        }
        let admins = self.admins.list_admins(page.offset(), page.limit).await?;
        Ok(Paginated::new(admins, total, page))
    }

    pub async fn get(
        &self,
        caller: &AuthenticatedAdmin,
        admin_id: ObjectId,
    ) -> Result<Admin, AuthError> {
        Self::require_root(caller)?;
        self.admins
            .find_admin_by_id(admin_id)
            .await?
            .ok_or(AuthError::AdminNotFound)
    }

    /// Deactivation also signs the admin out.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "change_admin_status", skip_all, err)
    )]
    pub async fn set_status(
        &self,
        caller: &AuthenticatedAdmin,
        admin_id: ObjectId,
        is_active: bool,
    ) -> Result<(), AuthError> {
        Self::require_root(caller)?;
        Self::require_not_root(admin_id)?;

        self.admins.set_admin_active(admin_id, is_active).await?;
        if !is_active {
            self.admins
                .set_admin_session(admin_id, None, Utc::now())
                .await?;
        }

        log::info!(
            target: "bastion_auth",
            "msg=\"admin status changed\", admin_id=\"{admin_id}\", is_active={is_active}"
        );
        Ok(())
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "change_admin_username", skip_all, err)
    )]
    pub async fn change_username(
        &self,
        caller: &AuthenticatedAdmin,
        admin_id: ObjectId,
        username: &str,
    ) -> Result<(), AuthError> {
        Self::require_root(caller)?;
        Self::require_not_root(admin_id)?;
        validate_username(username)?;

        let username = username.to_lowercase();
        match self.admins.find_admin_by_username(&username).await? {
            Some(other) if other.id == admin_id => return Ok(()),
            Some(_) => return Err(AuthError::UsernameExists),
            None => {}
        }

        self.admins.update_admin_username(admin_id, &username).await
    }

    /// Root may change its own password here too.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "change_admin_password", skip_all, err)
    )]
    pub async fn change_password(
        &self,
        caller: &AuthenticatedAdmin,
        admin_id: ObjectId,
        password: &SecretString,
    ) -> Result<(), AuthError> {
        Self::require_root(caller)?;
        self.password_policy.validate(password.expose_secret())?;

        if self.admins.find_admin_by_id(admin_id).await?.is_none() {
            return Err(AuthError::AdminNotFound);
        }

        let hashed = hash_blocking(&self.hasher, password).await?;
        self.admins.update_admin_password(admin_id, &hashed).await?;

        log::info!(
            target: "bastion_auth",
            "msg=\"admin password changed\", admin_id=\"{admin_id}\""
        );
        Ok(())
    }
}

/// Creates the root admin on first start. An existing root is left as is.
pub struct EnsureRootAdminAction<A: AdminRepository, H = Argon2Hasher> {
    admins: A,
    hasher: H,
}

impl<A: AdminRepository> EnsureRootAdminAction<A, Argon2Hasher> {
    pub fn new(admins: A) -> Self {
        Self {
            admins,
            hasher: Argon2Hasher::default(),
        }
    }
}

impl<A, H> EnsureRootAdminAction<A, H>
where
    A: AdminRepository,
    H: PasswordHasher + Clone + 'static,
{
    pub fn with_hasher<H2: PasswordHasher>(self, hasher: H2) -> EnsureRootAdminAction<A, H2> {
        EnsureRootAdminAction {
            admins: self.admins,
            hasher,
        }
    }

    /// Returns `true` when the root admin was created by this call.
    pub async fn execute(&self, password: &SecretString) -> Result<bool, AuthError> {
        if self.admins.find_admin_by_id(ObjectId::ROOT).await?.is_some() {
            return Ok(false);
        }
        if password.is_empty() {
            return Err(AuthError::ConfigurationError(
                "root admin password is empty".to_owned(),
            ));
        }

        let hashed_password = hash_blocking(&self.hasher, password).await?;
        self.admins
            .create_admin(NewAdmin {
                id: ObjectId::ROOT,
                username: ROOT_USERNAME.to_owned(),
                hashed_password,
            })
            .await?;

        log::info!(target: "bastion_auth", "msg=\"root admin created\"");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{admin_with_password, fast_hasher, Fixture};

    fn root() -> AuthenticatedAdmin {
        AuthenticatedAdmin {
            admin_id: ObjectId::ROOT,
            username: ROOT_USERNAME.to_owned(),
        }
    }

    fn operator(id: ObjectId) -> AuthenticatedAdmin {
        AuthenticatedAdmin {
            admin_id: id,
            username: "operator".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_only_root_manages_admins() {
        let fx = Fixture::new();
        let op = admin_with_password(ObjectId::new(), "operator", "operatorpass");
        fx.admins.insert(op.clone());
        let action = fx.manage_admins();
        let caller = operator(op.id);

        assert_eq!(
            action
                .create(&caller, "another", &"password123".into())
                .await
                .unwrap_err(),
            AuthError::AccessDenied
        );
        assert_eq!(
            action
                .list(&caller, PageRequest::default())
                .await
                .unwrap_err(),
            AuthError::AccessDenied
        );
        assert_eq!(
            action.get(&caller, op.id).await.unwrap_err(),
            AuthError::AccessDenied
        );
        assert_eq!(
            action
                .change_password(&caller, op.id, &"password123".into())
                .await
                .unwrap_err(),
            AuthError::AccessDenied
        );
    }

    #[tokio::test]
    async fn test_root_creates_and_lists() {
        let fx = Fixture::new();
        fx.admins
            .insert(admin_with_password(ObjectId::ROOT, "root", "rootpassword"));
        let action = fx.manage_admins();

        let created = action
            .create(&root(), "Support", &"password123".into())
            .await
            .unwrap();
        assert_eq!(created.username, "support");
        assert!(created.is_active);
        assert!(fast_hasher().verify("password123", &created.hashed_password));

        assert_eq!(
            action
                .create(&root(), "support", &"password123".into())
                .await
                .unwrap_err(),
            AuthError::UsernameExists
        );

        let page = action.list(&root(), PageRequest::default()).await.unwrap();
        assert_eq!(page.items.total, 2);
        assert_eq!(action.get(&root(), created.id).await.unwrap().id, created.id);
        assert_eq!(
            action.get(&root(), ObjectId::new()).await.unwrap_err(),
            AuthError::AdminNotFound
        );
    }

    #[tokio::test]
    async fn test_root_is_immutable() {
        let fx = Fixture::new();
        fx.admins
            .insert(admin_with_password(ObjectId::ROOT, "root", "rootpassword"));
        let action = fx.manage_admins();

        assert_eq!(
            action
                .set_status(&root(), ObjectId::ROOT, false)
                .await
                .unwrap_err(),
            AuthError::AccessDenied
        );
        assert_eq!(
            action
                .change_username(&root(), ObjectId::ROOT, "boss")
                .await
                .unwrap_err(),
            AuthError::AccessDenied
        );

        action
            .change_password(&root(), ObjectId::ROOT, &"rotatedpass1".into())
            .await
            .unwrap();
        let stored = action.get(&root(), ObjectId::ROOT).await.unwrap();
        assert!(fast_hasher().verify("rotatedpass1", &stored.hashed_password));
    }

    #[tokio::test]
    async fn test_deactivation_signs_admin_out() {
        let fx = Fixture::new();
        fx.admins
            .insert(admin_with_password(ObjectId::ROOT, "root", "rootpassword"));
        let op = admin_with_password(ObjectId::new(), "operator", "operatorpass");
        fx.admins.insert(op.clone());

        let signed = fx
            .admin_sign_in()
            .execute("operator", &"operatorpass".into())
            .await
            .unwrap();
        fx.admin_authenticate()
            .execute(signed.token.expose_secret())
            .await
            .unwrap();

        fx.manage_admins()
            .set_status(&root(), op.id, false)
            .await
            .unwrap();
        let stored = fx.admins.find_admin_by_id(op.id).await.unwrap().unwrap();
        assert!(!stored.is_active);
        assert!(stored.session.is_none());
        assert_eq!(
            fx.admin_authenticate()
                .execute(signed.token.expose_secret())
                .await
                .unwrap_err(),
            AuthError::AdminNotFound
        );

        fx.manage_admins()
            .set_status(&root(), op.id, true)
            .await
            .unwrap();
        assert_eq!(
            fx.admin_authenticate()
                .execute(signed.token.expose_secret())
                .await
                .unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn test_change_username() {
        let fx = Fixture::new();
        let op = admin_with_password(ObjectId::new(), "operator", "operatorpass");
        fx.admins.insert(op.clone());
        fx.admins
            .insert(admin_with_password(ObjectId::new(), "auditor", "auditorpass"));
        let action = fx.manage_admins();

        action
            .change_username(&root(), op.id, "Ops")
            .await
            .unwrap();
        assert_eq!(action.get(&root(), op.id).await.unwrap().username, "ops");
        assert_eq!(
            action
                .change_username(&root(), op.id, "auditor")
                .await
                .unwrap_err(),
            AuthError::UsernameExists
        );
    }

    #[tokio::test]
    async fn test_ensure_root_admin() {
        let fx = Fixture::new();
        let action = EnsureRootAdminAction::new(fx.admins.clone()).with_hasher(fast_hasher());

        assert!(action.execute(&"rootpassword".into()).await.unwrap());
        assert!(!action.execute(&"different".into()).await.unwrap());

        let root = fx
            .admins
            .find_admin_by_id(ObjectId::ROOT)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(root.username, ROOT_USERNAME);
        assert!(fast_hasher().verify("rootpassword", &root.hashed_password));

        fx.admin_sign_in()
            .execute("root", &"rootpassword".into())
            .await
            .unwrap();
    }
}

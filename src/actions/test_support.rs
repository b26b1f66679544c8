#![allow(clippy::unwrap_used)]

use crate::actions::*;
use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::events::EventDispatcher;
use crate::mailer::{EmailLinks, MailerListener, MockMailer};
use crate::repository::{Admin, User};
use crate::{
    AttemptThrottle, AuthConfig, MockAdminRepository, MockAttemptRepository,
    MockSessionRepository, MockUserRepository, ObjectId, SessionStore, ThrottleConfig,
    TokenCodec,
};

pub const VERIFY_LINK: &str = "https://app.test/verify?token=";
pub const RESET_LINK: &str = "https://app.test/reset?token=";

pub fn fast_hasher() -> Argon2Hasher {
    Argon2Hasher::new(1024, 1, 1)
}

pub fn user_with_password(username: &str, email: &str, password: &str) -> User {
    User::mock(username, email, &fast_hasher().hash(password).unwrap())
}

pub fn admin_with_password(id: ObjectId, username: &str, password: &str) -> Admin {
    Admin::mock(id, username, &fast_hasher().hash(password).unwrap())
}

/// Mock stores plus the wiring a deployment would do at startup.
pub struct Fixture {
    pub config: AuthConfig,
    pub users: MockUserRepository,
    pub admins: MockAdminRepository,
    pub sessions: MockSessionRepository,
    pub attempts: MockAttemptRepository,
    pub mailer: MockMailer,
    pub events: EventDispatcher,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_throttle(ThrottleConfig::default())
    }

    pub fn with_throttle(throttle: ThrottleConfig) -> Self {
        let config = AuthConfig::new(
            "user-secret-user-secret-user-secret!",
            "admin-secret-admin-secret-admin-secret",
        )
        .with_throttle(throttle);
        let mailer = MockMailer::new();
        let events = EventDispatcher::new().listen(MailerListener::new(
            mailer.clone(),
            EmailLinks::new(VERIFY_LINK, RESET_LINK),
        ));

        Self {
            config,
            users: MockUserRepository::new(),
            admins: MockAdminRepository::new(),
            sessions: MockSessionRepository::new(),
            attempts: MockAttemptRepository::new(),
            mailer,
            events,
        }
    }

    pub fn user_codec(&self) -> TokenCodec {
        self.config.user_codec().unwrap()
    }

    pub fn admin_codec(&self) -> TokenCodec {
        self.config.admin_codec().unwrap()
    }

    pub fn session_store(&self) -> SessionStore<MockSessionRepository> {
        SessionStore::new(self.sessions.clone()).with_ttl(self.config.session_ttl)
    }

    pub fn throttle(&self) -> AttemptThrottle<MockAttemptRepository> {
        AttemptThrottle::new(self.attempts.clone(), self.config.throttle)
    }

    pub fn issuer(&self) -> IssueEmailTokenAction {
        IssueEmailTokenAction::new(self.user_codec(), self.events.clone())
            .with_ttl(self.config.email_token_ttl)
    }

    pub fn consumer(&self) -> ConsumeEmailTokenAction {
        ConsumeEmailTokenAction::new(self.user_codec())
    }

    pub fn sign_in(
        &self,
    ) -> SignInAction<MockUserRepository, MockSessionRepository, MockAttemptRepository> {
        SignInAction::new(
            self.users.clone(),
            self.session_store(),
            self.throttle(),
            self.user_codec(),
        )
        .with_hasher(fast_hasher())
        .with_events(self.events.clone())
    }

    pub fn admin_sign_in(&self) -> AdminSignInAction<MockAdminRepository> {
        AdminSignInAction::new(self.admins.clone(), self.admin_codec())
            .with_hasher(fast_hasher())
            .with_ttl(self.config.session_ttl)
            .with_events(self.events.clone())
    }

    pub fn authenticate(&self) -> AuthenticateAction<MockSessionRepository> {
        AuthenticateAction::new(self.session_store(), self.user_codec())
    }

    pub fn admin_authenticate(&self) -> AdminAuthenticateAction<MockAdminRepository> {
        AdminAuthenticateAction::new(self.admins.clone(), self.admin_codec())
    }

    pub fn signup(&self) -> SignupAction<MockUserRepository> {
        SignupAction::new(self.users.clone(), self.issuer())
            .with_hasher(fast_hasher())
            .with_events(self.events.clone())
    }

    pub fn verify_email(&self) -> VerifyEmailAction<MockUserRepository> {
        VerifyEmailAction::new(self.users.clone(), self.consumer()).with_events(self.events.clone())
    }

    pub fn reset_password(&self) -> ResetPasswordAction<MockUserRepository> {
        ResetPasswordAction::new(self.users.clone(), self.consumer())
            .with_hasher(fast_hasher())
            .with_events(self.events.clone())
    }

    pub fn change_password(&self) -> ChangePasswordAction<MockUserRepository> {
        ChangePasswordAction::new(self.users.clone())
            .with_hasher(fast_hasher())
            .with_events(self.events.clone())
    }

    pub fn manage_users(&self) -> ManageUsersAction<MockUserRepository, MockSessionRepository> {
        ManageUsersAction::new(self.users.clone(), self.session_store())
            .with_hasher(fast_hasher())
            .with_events(self.events.clone())
    }

    pub fn manage_admins(&self) -> ManageAdminsAction<MockAdminRepository> {
        ManageAdminsAction::new(self.admins.clone()).with_hasher(fast_hasher())
    }

    pub fn prune_expired(
        &self,
    ) -> PruneExpiredAction<MockSessionRepository, MockAttemptRepository> {
        PruneExpiredAction::new(self.session_store(), self.throttle())
    }
}

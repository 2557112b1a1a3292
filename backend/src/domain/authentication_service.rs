//! Registration, login and logout orchestration.
//!
//! The service is stateless: identity lives in the session store and
//! accounts in the credential store. Every outcome, success or failure, is
//! reported through the caller's [`FlashChannel`] so the inbound adapter only
//! has to pick a redirect target.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    PasswordHashError, PasswordHasher, SessionStore, SessionStoreError, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    AuthError, Email, FlashChannel, FlashMessage, IdentitySnapshot, LoginCredentials, NewUser,
    PasswordDigest, PasswordPolicy, Registration, Role, SessionToken, User,
};

/// Flash text after a successful registration.
pub const REGISTERED_MESSAGE: &str = "Registration succeeded, please log in";
/// Flash text after a successful login.
pub const LOGGED_IN_MESSAGE: &str = "Logged in successfully";

// Input for the digest compared against when an email is unknown.
const DUMMY_PASSWORD: &str = "bookshelf-dummy-password";

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Token to hand to the client.
    pub token: SessionToken,
    /// Who the new session belongs to.
    pub identity: IdentitySnapshot,
}

/// Result of the operator bootstrap at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminBootstrap {
    Created(User),
    AlreadyPresent,
}

/// Authentication service wiring the credential store, hasher and session
/// store together.
#[derive(Clone)]
pub struct AuthenticationService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    sessions: Arc<dyn SessionStore>,
    policy: PasswordPolicy,
    dummy_digest: Arc<OnceCell<PasswordDigest>>,
}

impl AuthenticationService {
    /// Create a new service over the given ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        sessions: Arc<dyn SessionStore>,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            users,
            hasher,
            sessions,
            policy,
            dummy_digest: Arc::new(OnceCell::new()),
        }
    }

    /// Password policy applied at registration.
    pub fn policy(&self) -> PasswordPolicy {
        self.policy
    }

    /// Register a `member` account. Never opens a session.
    pub async fn register(
        &self,
        display_name: &str,
        email: &str,
        password: &str,
        flash: &dyn FlashChannel,
    ) -> Result<User, AuthError> {
        let result = self.try_register(display_name, email, password).await;
        match &result {
            Ok(user) => {
                info!(user_id = %user.id(), "user registered");
                push_flash(flash, FlashMessage::info(REGISTERED_MESSAGE));
            }
            Err(err) => report_failure("register", err, flash),
        }
        result
    }

    async fn try_register(
        &self,
        display_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let registration =
            Registration::try_from_parts(display_name, email, password, &self.policy)?;
        if self.find_user(registration.email()).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }
        let digest = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(map_hash_error)?;
        let new_user = NewUser::member(
            registration.display_name().clone(),
            registration.email().clone(),
            digest,
        );
        // A concurrent registration can still win between lookup and insert;
        // the store rejects it and it reads the same as the lookup hit.
        self.users.create(new_user).await.map_err(map_user_error)
    }

    /// Check credentials and open a session on success.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        flash: &dyn FlashChannel,
    ) -> Result<LoginOutcome, AuthError> {
        let result = self.try_login(email, password).await;
        match &result {
            Ok(outcome) => {
                info!(user_id = %outcome.identity.id, "user logged in");
                push_flash(flash, FlashMessage::info(LOGGED_IN_MESSAGE));
            }
            Err(err) => report_failure("login", err, flash),
        }
        result
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let credentials = LoginCredentials::try_from_parts(email, password)
            .map_err(|_| AuthError::InvalidCredentials)?;
        let Some(user) = self.find_user(credentials.email()).await? else {
            self.verify_against_dummy(credentials.password()).await?;
            return Err(AuthError::InvalidCredentials);
        };
        let matches = self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .await
            .map_err(map_hash_error)?;
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        let identity = IdentitySnapshot::from(&user);
        let token = self
            .sessions
            .create(identity.clone())
            .await
            .map_err(map_session_error)?;
        Ok(LoginOutcome { token, identity })
    }

    /// Spend the same hashing effort as a real comparison so an unknown
    /// email is not distinguishable by response time.
    async fn verify_against_dummy(&self, password: &str) -> Result<(), AuthError> {
        let digest = self
            .dummy_digest
            .get_or_try_init(|| self.hasher.hash(DUMMY_PASSWORD))
            .await
            .map_err(map_hash_error)?;
        self.hasher
            .verify(password, digest)
            .await
            .map_err(map_hash_error)?;
        Ok(())
    }

    /// Destroy the current session, if any. Repeating it is harmless.
    pub async fn logout(&self, token: Option<&SessionToken>) -> Result<(), AuthError> {
        let Some(token) = token else {
            return Ok(());
        };
        self.sessions.destroy(token).await.map_err(|err| {
            let err = map_session_error(err);
            error!(error = %err, "logout failed to destroy session");
            err
        })
    }

    /// Identity behind `token`, or `None` when absent or expired.
    pub async fn current_identity(
        &self,
        token: &SessionToken,
    ) -> Result<Option<IdentitySnapshot>, AuthError> {
        self.sessions.find(token).await.map_err(map_session_error)
    }

    /// Create an `admin` account from operator configuration unless the
    /// email is already registered. Existing accounts are left untouched.
    pub async fn bootstrap_admin(
        &self,
        display_name: &str,
        email: &str,
        password: &str,
    ) -> Result<AdminBootstrap, AuthError> {
        let registration =
            Registration::try_from_parts(display_name, email, password, &self.policy)?;
        if self.find_user(registration.email()).await?.is_some() {
            return Ok(AdminBootstrap::AlreadyPresent);
        }
        let digest = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(map_hash_error)?;
        let new_user = NewUser {
            role: Role::Admin,
            ..NewUser::member(
                registration.display_name().clone(),
                registration.email().clone(),
                digest,
            )
        };
        match self.users.create(new_user).await {
            Ok(user) => Ok(AdminBootstrap::Created(user)),
            Err(UserPersistenceError::DuplicateEmail) => Ok(AdminBootstrap::AlreadyPresent),
            Err(err) => Err(map_user_error(err)),
        }
    }

    async fn find_user(&self, email: &Email) -> Result<Option<User>, AuthError> {
        self.users.find_by_email(email).await.map_err(map_user_error)
    }
}

fn map_user_error(err: UserPersistenceError) -> AuthError {
    match err {
        UserPersistenceError::DuplicateEmail => AuthError::EmailTaken,
        other => AuthError::Unavailable(other.to_string()),
    }
}

fn map_hash_error(err: PasswordHashError) -> AuthError {
    AuthError::CryptoFailure(err.to_string())
}

fn map_session_error(err: SessionStoreError) -> AuthError {
    AuthError::Unavailable(err.to_string())
}

fn report_failure(operation: &'static str, err: &AuthError, flash: &dyn FlashChannel) {
    if err.is_operational() {
        error!(operation, error = %err, "authentication backend fault");
    } else {
        debug!(operation, error = %err, "authentication rejected");
    }
    push_flash(flash, FlashMessage::error(err.user_message()));
}

fn push_flash(flash: &dyn FlashChannel, message: FlashMessage) {
    if let Err(err) = flash.push(message) {
        warn!(error = %err, "failed to queue flash message");
    }
}

#[cfg(test)]
#[path = "authentication_service_tests.rs"]
mod tests;

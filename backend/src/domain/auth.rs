//! Authentication primitives: validated registration and login inputs, the
//! password policy, and the error taxonomy of the authentication service.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use thiserror::Error;
use zeroize::Zeroizing;

use super::{DisplayName, Email, UserValidationError};

/// Default minimum password length, in characters.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;
/// bcrypt only consumes the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Minimum/maximum password length enforced at registration.
///
/// Hashers accept any input; length policy lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    min_length: usize,
}

impl PasswordPolicy {
    /// Policy requiring at least `min_length` characters.
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Shortest accepted password, in characters.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Check `password` against the policy.
    pub fn check(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.min_length {
            return Err(AuthError::WeakPassword {
                min: self.min_length,
            });
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AuthError::PasswordTooLong {
                max: MAX_PASSWORD_BYTES,
            });
        }
        Ok(())
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PASSWORD_LENGTH)
    }
}

/// Shape errors for registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    DisplayName(UserValidationError),
    Email(UserValidationError),
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DisplayName(err) | Self::Email(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

/// Validated registration request.
///
/// ## Invariants
/// - `display_name` is trimmed and non-empty.
/// - `email` is normalised and well formed.
/// - `password` satisfied the [`PasswordPolicy`] it was built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    display_name: DisplayName,
    email: Email,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate raw registration fields in form order.
    pub fn try_from_parts(
        display_name: &str,
        email: &str,
        password: &str,
        policy: &PasswordPolicy,
    ) -> Result<Self, AuthError> {
        let display_name =
            DisplayName::new(display_name).map_err(RegistrationValidationError::DisplayName)?;
        let email = Email::new(email).map_err(RegistrationValidationError::Email)?;
        policy.check(password)?;
        Ok(Self {
            display_name,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or not a well-formed address.
    InvalidEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by the authentication service.
///
/// ## Invariants
/// - `email` is normalised the same way as at registration.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use bookshelf::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ana@Example.com", "secret1").unwrap();
/// assert_eq!(creds.email().as_ref(), "ana@example.com");
/// assert_eq!(creds.password(), "secret1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = Email::new(email).map_err(|_| LoginValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email suitable for credential lookups.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Generic text shown when an infrastructure fault interrupts a flow.
pub const TRY_AGAIN_MESSAGE: &str = "Something went wrong, please try again";
/// Shared text for unknown email and wrong password.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";
/// Shown when an email is already registered.
pub const EMAIL_TAKEN_MESSAGE: &str = "That email is already registered";

/// Failures of the register and login flows.
///
/// Every variant has a fixed [`user_message`](Self::user_message); the
/// `Display` output may include infrastructure detail and is for logs only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid registration: {0}")]
    InvalidRegistration(#[from] RegistrationValidationError),
    #[error("password shorter than {min} characters")]
    WeakPassword { min: usize },
    #[error("password longer than {max} bytes")]
    PasswordTooLong { max: usize },
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    CryptoFailure(String),
    #[error("authentication backend unavailable: {0}")]
    Unavailable(String),
}

impl AuthError {
    /// Text safe to show to the end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidRegistration(RegistrationValidationError::DisplayName(
                UserValidationError::DisplayNameTooLong { max },
            )) => format!("Display name must be at most {max} characters"),
            Self::InvalidRegistration(RegistrationValidationError::DisplayName(_)) => {
                "Please enter a display name".to_owned()
            }
            Self::InvalidRegistration(RegistrationValidationError::Email(_)) => {
                "Please enter a valid email address".to_owned()
            }
            Self::WeakPassword { min } => format!("Password must be at least {min} characters"),
            Self::PasswordTooLong { max } => format!("Password must be at most {max} bytes"),
            Self::EmailTaken => EMAIL_TAKEN_MESSAGE.to_owned(),
            Self::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_owned(),
            Self::CryptoFailure(_) | Self::Unavailable(_) => TRY_AGAIN_MESSAGE.to_owned(),
        }
    }

    /// Whether the failure reflects the environment rather than user input.
    pub fn is_operational(&self) -> bool {
        matches!(self, Self::CryptoFailure(_) | Self::Unavailable(_))
    }
}

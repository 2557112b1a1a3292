//! Domain primitives, services and ports.
//!
//! Purpose: Define strongly typed entities for accounts, sessions and the
//! book catalogue, the authentication service that orchestrates them, and
//! the pure authorization gates. Nothing here depends on actix or Diesel.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport agnostic error payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - User, Email, Role: the credential store entity and its values.
//! - IdentitySnapshot, SessionToken: what a session holds and how it is named.
//! - FlashChannel, FlashMessage: read-once feedback across a redirect.
//! - AuthenticationService: register, login, logout.
//! - require_authenticated, require_role: authorization gates.

pub mod auth;
pub mod authentication_service;
pub mod authorization;
pub mod books;
pub mod error;
pub mod flash;
pub mod identity;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    AuthError, DEFAULT_MIN_PASSWORD_LENGTH, EMAIL_TAKEN_MESSAGE, INVALID_CREDENTIALS_MESSAGE,
    LoginCredentials, LoginValidationError, MAX_PASSWORD_BYTES, PasswordPolicy, Registration,
    RegistrationValidationError, TRY_AGAIN_MESSAGE,
};
pub use self::authentication_service::{
    AdminBootstrap, AuthenticationService, LOGGED_IN_MESSAGE, LoginOutcome, REGISTERED_MESSAGE,
};
pub use self::authorization::{
    GuardDenial, LOGIN_PATH, ROOT_PATH, require_authenticated, require_role,
};
pub use self::books::{Book, BookDraft, BookId, BookValidationError, Price};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::flash::{FlashChannel, FlashError, FlashKind, FlashMessage, FlashQueue};
pub use self::identity::{IdentitySnapshot, SessionToken};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DisplayName, Email, NewUser, PasswordDigest, Role, User, UserId, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use bookshelf::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;

//! Session-held identity and the opaque token that references it.

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use super::{DisplayName, Email, Role, User, UserId};

/// Number of random bytes behind a session token.
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Copy of the user's identity taken at login.
///
/// Not a live reference: later changes to the stored user are not reflected
/// until the next login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySnapshot {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: UserId,
    #[schema(value_type = String, example = "Ana")]
    pub display_name: DisplayName,
    #[schema(value_type = String, example = "ana@example.com")]
    pub email: Email,
    pub role: Role,
}

impl From<&User> for IdentitySnapshot {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().clone(),
            display_name: user.display_name().clone(),
            email: user.email().clone(),
            role: user.role(),
        }
    }
}

/// Opaque, unguessable session identifier handed to the client.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Draw a fresh token from the operating system CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0_u8; SESSION_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Rehydrate a token presented by a client.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// SHA-256 of the token, hex encoded. Stores key sessions by this value.
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

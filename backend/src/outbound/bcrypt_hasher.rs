//! bcrypt implementation of the `PasswordHasher` port.
//!
//! bcrypt is CPU bound and deliberately slow, so both operations run on
//! tokio's blocking pool. Its output embeds the salt and cost, which lets a
//! digest produced at one cost be verified after the configured cost
//! changes.

use async_trait::async_trait;
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::PasswordDigest;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Cost used when none is configured.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Cost outside the range bcrypt accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("bcrypt cost must be between {min} and {max}, got {cost}")]
pub struct InvalidBcryptCost {
    pub cost: u32,
    pub min: u32,
    pub max: u32,
}

/// Password hasher backed by the `bcrypt` crate.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// Smallest cost bcrypt accepts. Only suitable for tests.
    pub const MIN_COST: u32 = 4;
    /// Largest cost bcrypt accepts.
    pub const MAX_COST: u32 = 31;

    /// Create a hasher after validating the cost factor.
    pub fn new(cost: u32) -> Result<Self, InvalidBcryptCost> {
        if !(Self::MIN_COST..=Self::MAX_COST).contains(&cost) {
            return Err(InvalidBcryptCost {
                cost,
                min: Self::MIN_COST,
                max: Self::MAX_COST,
            });
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self {
            cost: DEFAULT_BCRYPT_COST,
        }
    }
}

#[async_trait]
impl PasswordHasher for BcryptHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordDigest, PasswordHashError> {
        let password = Zeroizing::new(plaintext.to_owned());
        let cost = self.cost;

        tokio::task::spawn_blocking(move || {
            bcrypt::hash(password.as_bytes(), cost)
                .map(PasswordDigest::new)
                .map_err(|err| PasswordHashError::worker(err.to_string()))
        })
        .await
        .map_err(|err| PasswordHashError::worker(format!("hashing task failed: {err}")))?
    }

    async fn verify(
        &self,
        plaintext: &str,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHashError> {
        let password = Zeroizing::new(plaintext.to_owned());
        let digest = digest.as_str().to_owned();

        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password.as_bytes(), &digest))
            .await
            .map_err(|err| PasswordHashError::worker(format!("verification task failed: {err}")))?;

        match outcome {
            Ok(matches) => Ok(matches),
            Err(err) => {
                warn!(error = %err, "stored password digest could not be parsed");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Hashing runs at the minimum cost to keep the suite fast.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> BcryptHasher {
        BcryptHasher::new(BcryptHasher::MIN_COST).expect("minimum cost is valid")
    }

    #[rstest]
    #[tokio::test]
    async fn digests_are_salted_and_verifiable(hasher: BcryptHasher) {
        let first = hasher.hash("secret1").await.expect("hash");
        let second = hasher.hash("secret1").await.expect("hash");

        assert_ne!(first.as_str(), "secret1");
        assert_ne!(first, second);
        assert!(hasher.verify("secret1", &first).await.expect("verify"));
        assert!(hasher.verify("secret1", &second).await.expect("verify"));
    }

    #[rstest]
    #[tokio::test]
    async fn wrong_password_does_not_verify(hasher: BcryptHasher) {
        let digest = hasher.hash("secret1").await.expect("hash");
        assert!(!hasher.verify("secret1x", &digest).await.expect("verify"));
    }

    #[rstest]
    #[tokio::test]
    async fn empty_password_is_valid_input(hasher: BcryptHasher) {
        let digest = hasher.hash("").await.expect("hash");
        assert!(hasher.verify("", &digest).await.expect("verify"));
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_digest_verifies_false(hasher: BcryptHasher) {
        let digest = PasswordDigest::new("not-a-bcrypt-digest");
        assert!(!hasher.verify("secret1", &digest).await.expect("verify"));
    }

    #[rstest]
    #[case(3)]
    #[case(32)]
    fn rejects_out_of_range_cost(#[case] cost: u32) {
        assert_eq!(
            BcryptHasher::new(cost).map(|hasher| hasher.cost()),
            Err(InvalidBcryptCost {
                cost,
                min: BcryptHasher::MIN_COST,
                max: BcryptHasher::MAX_COST,
            })
        );
    }
}

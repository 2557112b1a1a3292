//! Credential store kept in memory, keyed by normalised email.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, NewUser, User, UserId};

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Email, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, UserPersistenceError> {
        // Check and insert under one write guard.
        let mut users = self.users.write().await;
        if users.contains_key(&new_user.email) {
            return Err(UserPersistenceError::duplicate_email());
        }
        let user = User::from_new(UserId::random(), new_user, Utc::now());
        users.insert(user.email().clone(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.id() == id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{DisplayName, PasswordDigest};
    use rstest::rstest;

    fn new_user(email: &str) -> NewUser {
        NewUser::member(
            DisplayName::new("Ana").expect("name"),
            Email::new(email).expect("email"),
            PasswordDigest::new("digest"),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn lookups_use_normalised_email() {
        let repo = InMemoryUserRepository::new();
        let created = repo
            .create(new_user("Ana@Example.com"))
            .await
            .expect("create");

        let by_email = repo
            .find_by_email(&Email::new("ANA@example.COM").expect("email"))
            .await
            .expect("lookup");
        let by_id = repo.find_by_id(created.id()).await.expect("lookup");

        assert_eq!(by_email.as_ref(), Some(&created));
        assert_eq!(by_id, Some(created));
    }

    #[rstest]
    #[tokio::test]
    async fn second_create_with_same_email_is_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("ana@example.com")).await.expect("first");

        let err = repo
            .create(new_user("ANA@example.com"))
            .await
            .expect_err("duplicate");

        assert_eq!(err, UserPersistenceError::DuplicateEmail);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_admit_exactly_one() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let attempts = (0..16).map(|_| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move { repo.create(new_user("ana@example.com")).await })
        });

        let results = futures::future::join_all(attempts).await;
        let successes = results
            .into_iter()
            .map(|joined| joined.expect("task completes"))
            .filter(Result::is_ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(repo.len().await, 1);
    }
}

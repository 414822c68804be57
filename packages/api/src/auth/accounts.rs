//! Credential operations: sign-up, sign-in and the username collision check.

use checklist_store::{Created, UserId, UserStore};

use super::Passwords;
use crate::error::{Error, Result};

pub struct Accounts<S> {
    store: S,
    passwords: Passwords,
}

impl<S> Accounts<S>
where
    S: UserStore,
    Error: From<S::Error>,
{
    pub fn new(store: S, passwords: Passwords) -> Self {
        Self { store, passwords }
    }

    /// Check a username and password. Returns the user's id when the password
    /// verifies against the stored hash, `None` for an unknown user or a wrong
    /// password.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserId>> {
        let Some(user) = self.store.find_user(username).await? else {
            tracing::warn!(username, "sign-in for unknown user");
            return Ok(None);
        };

        if !self.passwords.verify(password, &user.password_hash)? {
            tracing::warn!(username, "sign-in with wrong password");
            return Ok(None);
        }

        Ok(Some(user.id))
    }

    /// Register a new user. A taken username yields [`Created::Duplicate`].
    pub async fn create_user(&self, username: &str, password: &str) -> Result<Created<UserId>> {
        let password_hash = self.passwords.hash(password)?;
        let created = self.store.insert_user(username, &password_hash).await?;
        tracing::debug!(username, ?created, "create user");
        Ok(created)
    }

    /// Whether the username is already registered.
    pub async fn exists_user(&self, username: &str) -> Result<bool> {
        Ok(self.store.find_user(username).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checklist_store::MemoryStore;

    fn accounts() -> Accounts<MemoryStore> {
        Accounts::new(MemoryStore::new(), crate::auth::password::cheap())
    }

    #[tokio::test]
    async fn test_authenticate_alice() {
        let accounts = accounts();
        let alice = accounts
            .create_user("alice", "secret123")
            .await
            .unwrap()
            .id()
            .unwrap();

        assert_eq!(
            accounts.authenticate("alice", "secret123").await.unwrap(),
            Some(alice)
        );
        assert_eq!(accounts.authenticate("alice", "wrongpass").await.unwrap(), None);
        assert_eq!(accounts.authenticate("bob", "secret123").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_exists_user() {
        let accounts = accounts();
        assert!(!accounts.exists_user("alice").await.unwrap());

        accounts.create_user("alice", "secret123").await.unwrap();
        assert!(accounts.exists_user("alice").await.unwrap());
        assert!(!accounts.exists_user("Alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let accounts = accounts();
        assert!(accounts
            .create_user("alice", "secret123")
            .await
            .unwrap()
            .is_created());
        assert_eq!(
            accounts.create_user("alice", "other").await.unwrap(),
            Created::Duplicate
        );
        // The first password still works.
        assert!(accounts
            .authenticate("alice", "secret123")
            .await
            .unwrap()
            .is_some());
    }
}

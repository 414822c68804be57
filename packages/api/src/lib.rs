//! # API crate: server side of the checklist
//!
//! This crate turns the storage-agnostic operations of [`checklist_store`] into a
//! PostgreSQL-backed service that request handlers call. Routing, rendering and
//! session-store wiring belong to the web layer; everything a handler needs to read
//! or change a user's data lives here.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | Argon2 password hashing, the [`Accounts`](auth::Accounts) credential service, and the session principal (`sign_in`, `sign_out`, `tasks_for_session`) |
//! | [`db`] | PostgreSQL pool (lazy `OnceCell` singleton), migrations, and [`PgStore`](db::PgStore) |
//! | [`settings`] | Layered configuration (defaults, `checklist.toml`, `CHECKLIST__*` environment) |
//! | [`error`] | The crate-wide [`Error`] type |
//!
//! ## Request flow
//!
//! A handler reads the principal from its `tower_sessions::Session` with
//! [`auth::tasks_for_session`], which hands back a [`Tasks`] bound to that user (or
//! `None` for an anonymous visitor). Every list and item call made through that value
//! is scoped to the user. Write operations report [`Mutation`] or [`Created`] so the
//! handler can tell "not yours / not found" from "nothing to do" from "title taken".

pub mod auth;
pub mod db;
pub mod error;
pub mod settings;

pub use checklist_store::{Created, Item, ItemId, ListId, Mutation, Tasks, TodoList, UserId};
pub use error::{Error, Result};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use checklist_store::MemoryStore;
    use tower_sessions::Session;

    use super::*;
    use crate::auth::Accounts;

    #[tokio::test]
    async fn test_sign_up_sign_in_and_use_lists() {
        let store = MemoryStore::new();
        let accounts = Accounts::new(store.clone(), crate::auth::password::cheap());
        let session = Session::new(None, Arc::new(tower_sessions::MemoryStore::default()), None);

        assert!(!accounts.exists_user("alice").await.unwrap());
        accounts.create_user("alice", "secret123").await.unwrap();
        assert!(accounts.exists_user("alice").await.unwrap());

        assert!(accounts.authenticate("alice", "wrongpass").await.unwrap().is_none());
        let alice = accounts
            .authenticate("alice", "secret123")
            .await
            .unwrap()
            .unwrap();
        auth::sign_in(&session, alice).await.unwrap();

        let tasks = auth::tasks_for_session(&session, store.clone())
            .await
            .unwrap()
            .unwrap();
        let list_id = tasks.create_list("Work").await.unwrap().id().unwrap();
        assert_eq!(tasks.create_list("Work").await.unwrap(), Created::Duplicate);
        assert_eq!(tasks.sorted_lists().await.unwrap()[0].id, list_id);

        auth::sign_out(&session).await.unwrap();
        assert!(auth::tasks_for_session(&session, store)
            .await
            .unwrap()
            .is_none());
    }
}

//! # Domain models for users, lists and items
//!
//! Defines the rows handed out by [`crate::Tasks`] and the store backends. They are
//! `Serialize + Deserialize` so a handler can pass them straight to a template
//! context.
//!
//! ## Types
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`User`] | A registered account: its id, unique username and Argon2 PHC hash. |
//! | [`TodoList`] | A titled list owned by one user, together with its [`Item`]s. |
//! | [`Item`] | A single completable entry belonging to exactly one list. |
//!
//! ## Completion state
//!
//! A list has no stored completion flag. [`TodoList::is_done`] derives it from the
//! items: a list is done when it has at least one item and every item is done. An
//! empty list is never done, and it has no undone items either.
//!
//! With the `sqlx` feature enabled, [`TodoList`] and [`Item`] derive `sqlx::FromRow`
//! so the PostgreSQL backend can load them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type ListId = i64;
pub type ItemId = i64;

/// A registered account as stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Argon2 PHC string, never the plaintext.
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// A list and the items it owns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TodoList {
    pub id: ListId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Filled in by the store after the list row is read.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<Item>,
}

impl TodoList {
    /// A list is done when it has at least one item and all of them are done.
    pub fn is_done(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| item.done)
    }

    /// Does the list have any item that is still open?
    pub fn has_undone_items(&self) -> bool {
        self.items.iter().any(|item| !item.done)
    }
}

/// A single entry of a list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    pub id: ItemId,
    pub list_id: ListId,
    pub title: String,
    pub done: bool,
}

//! Results of write operations.
//!
//! A mutation that touches zero rows can mean three different things: the target is
//! not owned by the caller, the target exists but is already in the requested state,
//! or a uniqueness rule rejected the write. [`Mutation`] and [`Created`] keep those
//! cases apart so handlers can answer with a 404, a no-op notice or a validation
//! message respectively.

use serde::{Deserialize, Serialize};

/// Outcome of an update or delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    /// The write changed this many rows (always at least one).
    Updated(u64),
    /// The target exists for the caller but nothing needed changing.
    NoEffect,
    /// The target does not resolve under the caller's ownership.
    NotFound,
    /// The write would break a uniqueness rule (renaming onto an existing title).
    Duplicate,
}

impl Mutation {
    /// Map a plain affected-row count: zero rows means not found.
    pub fn from_rows(rows: u64) -> Self {
        if rows == 0 {
            Mutation::NotFound
        } else {
            Mutation::Updated(rows)
        }
    }

    /// Whether any row changed.
    pub fn is_applied(&self) -> bool {
        matches!(self, Mutation::Updated(_))
    }
}

/// Outcome of an insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Created<T> {
    /// The row was inserted with this id.
    New(T),
    /// A row with the same unique key already exists.
    Duplicate,
    /// The parent row does not resolve under the caller's ownership.
    NotFound,
}

impl<T> Created<T> {
    pub fn id(self) -> Option<T> {
        match self {
            Created::New(id) => Some(id),
            Created::Duplicate | Created::NotFound => None,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Created::New(_))
    }
}

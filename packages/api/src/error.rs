//! Error type for the server side of the checklist.
//!
//! Not-found and duplicate outcomes are values (see [`checklist_store::Mutation`]
//! and [`checklist_store::Created`]), so everything here is a genuine failure that a
//! handler turns into a server error.

use std::convert::Infallible;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

impl From<Infallible> for Error {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

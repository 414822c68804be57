//! # Database module: PostgreSQL pool and store
//!
//! - [`connect`] / [`get_pool`] open the connection pool. [`get_pool`] is a lazy,
//!   process-wide singleton backed by a [`tokio::sync::OnceCell`] and configured from
//!   [`Settings`](crate::settings::Settings); `DATABASE_URL` overrides the configured
//!   connection string.
//! - [`migrate`] applies `migrations/*.sql` with `sqlx::migrate!`.
//! - [`PgStore`] implements [`checklist_store::TaskStore`] and
//!   [`checklist_store::UserStore`] on top of the pool.

mod pg;
mod pool;

pub use pg::PgStore;
pub use pool::{connect, get_pool, migrate};

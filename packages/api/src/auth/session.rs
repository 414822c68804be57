//! Principal stored in the session.
//!
//! Handlers never reach into the session themselves: they call [`sign_in`] after a
//! successful [`Accounts::authenticate`](super::Accounts::authenticate), build their
//! per-request [`Tasks`] with [`tasks_for_session`], and call [`sign_out`] to end
//! the session.

use checklist_store::{TaskStore, Tasks, UserId};
use tower_sessions::Session;

use crate::error::Result;

/// Key for storing user ID in session.
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// Bind an authenticated user to the session. The session id is rotated first.
pub async fn sign_in(session: &Session, user_id: UserId) -> Result<()> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_ID_KEY, user_id).await?;
    tracing::debug!(user_id, "signed in");
    Ok(())
}

/// The signed-in user, if any.
pub async fn principal(session: &Session) -> Result<Option<UserId>> {
    Ok(session.get::<UserId>(SESSION_USER_ID_KEY).await?)
}

/// Drop everything stored for this session.
pub async fn sign_out(session: &Session) -> Result<()> {
    session.flush().await?;
    Ok(())
}

/// The [`Tasks`] of the signed-in user, or `None` for an anonymous session.
pub async fn tasks_for_session<S: TaskStore>(
    session: &Session,
    store: S,
) -> Result<Option<Tasks<S>>> {
    Ok(principal(session)
        .await?
        .map(|owner| Tasks::new(store, owner)))
}

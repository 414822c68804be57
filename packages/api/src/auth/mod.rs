//! Authentication: password hashing, accounts and the session principal.

mod accounts;
pub(crate) mod password;
mod session;

pub use accounts::Accounts;
pub use password::Passwords;
pub use session::{principal, sign_in, sign_out, tasks_for_session, SESSION_USER_ID_KEY};

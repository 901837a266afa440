//! Domain models for the web application.
//!
//! Recipe, draft and identity types come from `recipe-box-core`; this module
//! holds the account record and what is kept in the browser session.

pub mod session;
pub mod user;

pub use session::{CurrentUser, keys as session_keys};
pub use user::Account;

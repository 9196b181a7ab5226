//! Sign-in and session handling.

mod identity;
mod sessions;

pub use identity::{AuthError, IdentityClient};
pub use sessions::{SessionData, SessionStore};

//! Credential hashing, bearer token codec and session cookie helpers.
//!
//! These are the leaf utilities shared by the login/registration handlers,
//! the route guard, the edge gatekeeper and the client session store.

pub mod cookie;
pub mod password;
pub mod token;

pub use cookie::DEFAULT_COOKIE_NAME;
pub use password::{PasswordError, PasswordHasher};
pub use token::{AuthenticatedIdentity, Claims, TokenCodec, TokenError};

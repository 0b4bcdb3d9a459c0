pub mod auth;
pub mod gatekeeper;

pub use auth::{require_bearer, AuthUser, USER_ID_HEADER};
pub use gatekeeper::{edge_gatekeeper, GatePolicy, PathClass};

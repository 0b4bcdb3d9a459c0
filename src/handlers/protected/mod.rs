// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Routes here are wrapped with `middleware::require_bearer`, which injects
// `AuthUser`. Resource-level authorization stays with each handler.

pub mod auth;

// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Only the edge gatekeeper runs in front of these; it lets them through.

pub mod auth;

// handlers/mod.rs - Handlers grouped by security tier
//
// Public (no auth) → Protected (bearer token via route guard) → Pages
// (session cookie via edge gatekeeper)

pub mod pages;
pub mod protected;
pub mod public;

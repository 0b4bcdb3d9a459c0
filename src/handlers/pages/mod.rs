// handlers/pages/mod.rs - Page routes gated by the session cookie

pub mod dashboard;

pub use dashboard::dashboard;

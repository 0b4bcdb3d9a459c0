//! Shared fixtures for in-crate unit tests.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::MemoryUserStore;
use crate::server::AppState;

pub const TEST_SECRET: &str = "test-secret";

/// Development profile with a fixed secret and cheap password hashing.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = Some(TEST_SECRET.to_string());
    config.security.password_memory_kib = 4096;
    config.security.password_iterations = 1;
    config.security.password_parallelism = 1;
    config
}

pub fn test_state() -> AppState {
    AppState::new(test_config(), Arc::new(MemoryUserStore::new())).expect("test state")
}

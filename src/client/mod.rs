//! Client-side session handling: token persistence, the session cookie the
//! edge gatekeeper reads, and current-user resolution.

pub mod navigator;
pub mod session;
pub mod storage;

pub use navigator::{LogNavigator, Navigator, RecordingNavigator};
pub use session::{Navigation, Session, SessionConfig, SessionError, SessionStore};
pub use storage::{FileTokenStorage, MemoryTokenStorage, StorageError, TokenStorage};

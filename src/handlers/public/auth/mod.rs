// handlers/public/auth/mod.rs - Public authentication handlers
//
// Token acquisition endpoints that do not require authentication.

pub mod login;
pub mod register;
pub mod validation;

pub use login::{login, LoginRequest, LoginResponse};
pub use register::{register, RegisterRequest, RegisterResponse};

pub mod password;
pub mod serve;
pub mod session;
pub mod token;

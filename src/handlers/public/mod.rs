// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Account creation and token acquisition. Every input is untrusted.
pub mod auth;

pub use auth::*;

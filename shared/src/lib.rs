//! Sys Touch Shared Library
//!
//! Wire types and domain labels shared between the backend and any
//! client of the login API.

pub mod errors;
pub mod models;
pub mod types;

// Re-export commonly used items
pub use errors::*;
pub use models::Role;
pub use types::*;

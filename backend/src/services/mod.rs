//! Business logic services
//!
//! Services encapsulate the authentication flows and coordinate between
//! the credential store and the auth primitives.

pub mod auth;
pub mod user;

pub use auth::AuthService;
pub use user::UserService;

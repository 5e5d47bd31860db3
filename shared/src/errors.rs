//! Error types for the Sys Touch application

use thiserror::Error;

/// Authentication error types
///
/// `InvalidCredentials` deliberately covers both an unknown username and a
/// wrong password so callers cannot enumerate accounts.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Missing token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient scope")]
    InsufficientScope,
}

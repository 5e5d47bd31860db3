//! Authentication module
//!
//! Password verification, scope construction and JWT issuance.

mod jwt;
mod middleware;
mod password;
pub mod scope;

pub use jwt::{Claims, IssuedToken, JwtKeys, TokenIssuer};
pub use middleware::AuthUser;
pub use password::PasswordService;
pub use scope::{has_authority, scope_from_roles};

//! Domain models shared across crates

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named authorization label granted to a user (e.g. `ADMIN`, `BASIC`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub const ADMIN: &'static str = "ADMIN";
    pub const BASIC: &'static str = "BASIC";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn admin() -> Self {
        Self::new(Self::ADMIN)
    }

    pub fn basic() -> Self {
        Self::new(Self::BASIC)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

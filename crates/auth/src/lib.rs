//! bcrypt adapter for the `PasswordHasher` port.
//!
//! Hashing is an external primitive to the domain: `roster-core` only
//! knows the [`PasswordHasher`] trait, this crate supplies the bcrypt
//! implementation wired in by the binary.

use roster_core::error::{DomainError, DomainResult};
use roster_core::ports::PasswordHasher;

/// bcrypt-backed password hasher.
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// Create a hasher with the default bcrypt cost.
    pub fn new() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Create a hasher with an explicit cost factor.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plain: &str) -> DomainResult<String> {
        bcrypt::hash(plain, self.cost).map_err(|e| DomainError::HashingError(e.to_string()))
    }

    fn verify(&self, plain: &str, hash: &str) -> DomainResult<bool> {
        bcrypt::verify(plain, hash).map_err(|e| DomainError::HashingError(e.to_string()))
    }
}

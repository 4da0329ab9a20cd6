//! Port trait for password hashing.
//!
//! Hashing is an external primitive to this service: the domain only
//! needs the hash/verify capability, never the algorithm. The concrete
//! implementation lives in `roster-auth`.

use crate::error::DomainResult;

/// Hashes and verifies passwords.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plain-text password for storage.
    fn hash(&self, plain: &str) -> DomainResult<String>;

    /// Check a plain-text candidate against a stored hash.
    fn verify(&self, plain: &str, hash: &str) -> DomainResult<bool>;
}

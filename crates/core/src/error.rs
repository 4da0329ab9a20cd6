//! Error types for the Roster domain layer.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`PaginationError`] - Cursor decoding and integrity failures
//! - [`StorageError`] - Database/repository errors
//! - [`DomainError`] - Business logic errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Pagination Errors
// =============================================================================

/// Failures of the cursor codec and the pagination engine.
///
/// Both cursor failure kinds are fatal to the current pagination call.
/// There is no retry inside the engine - pagination is idempotent and
/// side-effect-free, so callers may safely retry the whole call.
#[derive(Debug, Error)]
pub enum PaginationError {
    /// The cursor payload is structurally invalid, or a cursor-integrity
    /// check against the first returned result failed.
    #[error("Invalid cursor")]
    InvalidCursor,

    /// The cursor was issued for a different entity type.
    ///
    /// Carries both types for diagnostics.
    #[error("Invalid cursor, expected type {expected}, but got type {actual}")]
    InvalidCursorType {
        /// The entity type the caller expected.
        expected: String,
        /// The entity type embedded in the cursor.
        actual: String,
    },

    /// One of the two underlying read queries failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Database and repository errors.
///
/// These errors originate from storage operations like queries,
/// transactions, and data serialization.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to establish database connection.
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// SQL query execution failed.
    #[error("Query execution error: {0}")]
    QueryError(String),

    /// Database constraint was violated (unique, foreign key, etc.).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Database migration failed.
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// Transaction commit/rollback failed.
    #[error("Transaction error: {0}")]
    TransactionError(String),

    /// Data serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// =============================================================================
// Domain Errors
// =============================================================================

/// Business logic and domain rule violations.
///
/// This is the main error type returned by [`crate::services::UserService`].
#[derive(Debug, Error)]
pub enum DomainError {
    /// No user exists with the given id.
    #[error("User not found: {0}")]
    UserNotFound(i64),

    /// The email address is already registered.
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Password hashing or verification failed.
    #[error("Password hashing error: {0}")]
    HashingError(String),

    /// Rejected registration input.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Pagination failure.
    #[error("Pagination error: {0}")]
    Pagination(#[from] PaginationError),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for pagination operations.
pub type PaginationResult<T> = Result<T, PaginationError>;

#[cfg(test)]
mod tests {
    use super::*;

    // Test critique: la chaîne de conversion d'erreurs fonctionne
    // Permet d'utiliser ? à travers les couches
    #[test]
    fn test_error_conversion_chain() {
        // Storage -> Pagination -> Domain
        let storage_err = StorageError::QueryError("db failed".into());
        let pagination_err: PaginationError = storage_err.into();
        let domain_err: DomainError = pagination_err.into();

        // Le message original est préservé
        assert!(domain_err.to_string().contains("db failed"));

        // Storage -> Domain
        let storage_err = StorageError::ConstraintViolation("users_email_key".into());
        let domain_err: DomainError = storage_err.into();
        assert!(domain_err.to_string().contains("users_email_key"));
    }

    // Test critique: le diagnostic contient les deux types de curseur
    #[test]
    fn test_invalid_cursor_type_includes_both_types() {
        let err = PaginationError::InvalidCursorType {
            expected: "User".into(),
            actual: "UserMetadata".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("User") && msg.contains("UserMetadata"));
    }
}

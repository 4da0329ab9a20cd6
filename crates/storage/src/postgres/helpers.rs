//! Shared helpers for PostgreSQL query building and row conversion.

use roster_core::error::{StorageError, StorageResult};
use roster_core::models::UserRole;

/// A bound value for a dynamically assembled query.
///
/// Dynamic SQL in this crate is built from hardcoded column names and
/// operators only; every value travels through a bound parameter.
#[derive(Debug, Clone)]
pub(crate) enum SqlParam {
    Text(String),
    Flag(bool),
    Int(i64),
}

/// Bind a parameter list onto a `query_as` builder, in order.
macro_rules! bind_params {
    ($query:expr, $params:expr) => {{
        let mut query = $query;
        for param in $params {
            query = match param {
                SqlParam::Text(s) => query.bind(s),
                SqlParam::Flag(b) => query.bind(*b),
                SqlParam::Int(n) => query.bind(*n),
            };
        }
        query
    }};
}

pub(crate) use bind_params;

/// Parse the stored role string back into the domain enum.
pub(crate) fn parse_role(s: &str, field_name: &str) -> StorageResult<UserRole> {
    UserRole::parse(s).ok_or_else(|| {
        StorageError::SerializationError(format!("{field_name} holds unknown role '{s}'"))
    })
}

/// Map a sqlx error onto the domain storage error, surfacing constraint
/// violations distinctly so callers can react to them.
pub(crate) fn map_query_error(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() || db.is_foreign_key_violation() => {
            StorageError::ConstraintViolation(db.message().to_string())
        }
        _ => StorageError::QueryError(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test critique: erreurs incluent le nom du champ pour debug
    #[test]
    fn test_parse_role_error_includes_field_name() {
        let err = parse_role("Admin", "users.role").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("users.role"));
        assert!(msg.contains("Admin"));
    }

    #[test]
    fn test_parse_role_accepts_stored_forms() {
        assert_eq!(parse_role("Client", "users.role").unwrap(), UserRole::Client);
        assert_eq!(parse_role("Owner", "users.role").unwrap(), UserRole::Owner);
        assert_eq!(
            parse_role("Delivery", "users.role").unwrap(),
            UserRole::Delivery
        );
    }
}

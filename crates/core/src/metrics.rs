//! Metrics definitions for the service.
//!
//! Metrics are collected using the `metrics` crate and can be exported
//! to Prometheus via `metrics-exporter-prometheus`.

use metrics::{counter, describe_counter};

/// Initialize all metric descriptions.
/// Call this once at startup before any metrics are recorded.
pub fn init_metrics() {
    describe_counter!(
        "users_registered_total",
        "Total number of user accounts registered"
    );
    describe_counter!(
        "pagination_queries_total",
        "Total number of paginated list queries served"
    );
    describe_counter!(
        "invalid_cursor_total",
        "Total number of list queries rejected for an invalid cursor"
    );
}

/// Record a successful registration.
pub fn record_user_registered() {
    counter!("users_registered_total").increment(1);
}

/// Record a paginated list query.
///
/// # Arguments
/// * `entity` - The entity type listed ("User" or "UserMetadata")
pub fn record_pagination_query(entity: &str) {
    counter!("pagination_queries_total", "entity" => entity.to_string()).increment(1);
}

/// Record a rejected cursor.
pub fn record_invalid_cursor(entity: &str) {
    counter!("invalid_cursor_total", "entity" => entity.to_string()).increment(1);
}

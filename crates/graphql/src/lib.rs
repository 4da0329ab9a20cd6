//! GraphQL API for the Roster user directory service.
//!
//! Provides a GraphQL endpoint to query users and their profile metadata
//! with Relay-style cursor pagination, plus the account mutations.

mod schema;
mod server;
mod types;

pub use schema::{
    build_schema, RosterMutation, RosterQuery, MAX_QUERY_COMPLEXITY, MAX_QUERY_DEPTH,
};
pub use server::{serve, serve_with_shutdown, ServerConfig};
pub use types::RosterSchema;

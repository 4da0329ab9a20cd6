//! GraphQL type definitions.

use async_graphql::{EmptySubscription, Schema};

use crate::schema::{RosterMutation, RosterQuery};

/// The Roster GraphQL schema type.
pub type RosterSchema = Schema<RosterQuery, RosterMutation, EmptySubscription>;

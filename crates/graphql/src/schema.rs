//! GraphQL schema definition.
//!
//! This module provides the GraphQL schema for the user directory:
//! user/metadata queries with cursor pagination, and account mutations.

use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, InputObject, Object, Result, Schema};
use chrono::{DateTime, Utc};

use roster_core::error::PaginationError;
use roster_core::metrics::{record_invalid_cursor, record_pagination_query};
use roster_core::models::{self, RegisterUser, UserMetadataUpdate, UserUpdate};
use roster_core::pagination::{CursorArgs, PageArgs};
use roster_core::ports::{OrderDirection, Repositories, UserFilter};
use roster_core::services::UserService;

use crate::types::RosterSchema;

// -----------------------------------------------------------------------------
// Schema Configuration
// -----------------------------------------------------------------------------

/// Maximum query depth to prevent deeply nested queries (DoS protection).
/// Note: GraphQL introspection requires depth ~13, so we use 15 to allow it.
pub const MAX_QUERY_DEPTH: usize = 15;

/// Maximum query complexity score (DoS protection).
/// Each field has a default complexity of 1, nested objects multiply.
pub const MAX_QUERY_COMPLEXITY: usize = 500;

/// Build the GraphQL schema with repositories and the user service.
///
/// Includes query depth and complexity limits for DoS protection.
pub fn build_schema(repositories: Arc<dyn Repositories>, service: Arc<UserService>) -> RosterSchema {
    Schema::build(RosterQuery, RosterMutation, EmptySubscription)
        .data(repositories)
        .data(service)
        .limit_depth(MAX_QUERY_DEPTH)
        .limit_complexity(MAX_QUERY_COMPLEXITY)
        .finish()
}

// -----------------------------------------------------------------------------
// Query Root
// -----------------------------------------------------------------------------

/// Query root for the user directory.
#[derive(Default)]
pub struct RosterQuery;

#[Object]
impl RosterQuery {
    /// Get service status and row counts.
    async fn status<'ctx>(&self, ctx: &Context<'ctx>) -> Result<ServiceStatus> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;

        let total_users = repos.users().count_users().await?;
        let total_metadata = repos.metadata().count_metadata().await?;

        Ok(ServiceStatus {
            total_users: total_users as i64,
            total_metadata: total_metadata as i64,
        })
    }

    /// Get a user by id.
    async fn user<'ctx>(&self, ctx: &Context<'ctx>, id: i64) -> Result<Option<User>> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;

        let user = repos.users().get_user(id).await?;
        Ok(user.map(User::from))
    }

    /// Get a user by email address.
    async fn user_by_email<'ctx>(&self, ctx: &Context<'ctx>, email: String) -> Result<Option<User>> {
        validate_filter_string(&Some(email.clone()), "email")?;
        let repos = ctx.data::<Arc<dyn Repositories>>()?;

        let user = repos.users().get_user_by_email(&email).await?;
        Ok(user.map(User::from))
    }

    /// List users as a cursor-paginated connection.
    #[allow(clippy::too_many_arguments)]
    async fn users<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        #[graphql(default = 20)] first: Option<i32>,
        after: Option<String>,
        #[graphql(default = false)] validate_cursor: bool,
        role: Option<Role>,
        verified: Option<bool>,
        email_contains: Option<String>,
        #[graphql(default)] order: Order,
    ) -> Result<UserConnection> {
        validate_filter_string(&email_contains, "emailContains")?;

        let repos = ctx.data::<Arc<dyn Repositories>>()?;

        let filter = UserFilter {
            role: role.map(Into::into),
            verified,
            email_contains,
        };
        let args = CursorArgs {
            first: Some(validate_pagination_first(first) as u64),
            after,
            validate_cursor,
        };

        record_pagination_query(models::User::CURSOR_TYPE);
        let connection = repos
            .users()
            .list_users(filter, args, order.into())
            .await
            .map_err(|e| map_pagination_error(models::User::CURSOR_TYPE, e))?;

        Ok(UserConnection::from(connection))
    }

    /// List users with classic page/limit pagination.
    async fn users_page<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        page: Option<i32>,
        limit: Option<i32>,
        role: Option<Role>,
        verified: Option<bool>,
    ) -> Result<UserPage> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;

        let filter = UserFilter {
            role: role.map(Into::into),
            verified,
            email_contains: None,
        };
        let args = PageArgs {
            page: page.map(|p| p.max(1) as u64),
            limit: limit.map(|l| l.clamp(1, MAX_PAGE_SIZE) as u64),
        };

        record_pagination_query(models::User::CURSOR_TYPE);
        let page = repos.users().paginate_users(filter, args).await?;

        Ok(UserPage::from(page))
    }

    /// Get the metadata row for a user.
    async fn metadata_for_user<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        user_id: i64,
    ) -> Result<Option<UserMetadata>> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;

        let metadata = repos.metadata().get_metadata_for_user(user_id).await?;
        Ok(metadata.map(UserMetadata::from))
    }

    /// List metadata rows as a cursor-paginated connection.
    async fn user_metadata<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        #[graphql(default = 20)] first: Option<i32>,
        after: Option<String>,
        #[graphql(default = false)] validate_cursor: bool,
    ) -> Result<MetadataConnection> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;

        let args = CursorArgs {
            first: Some(validate_pagination_first(first) as u64),
            after,
            validate_cursor,
        };

        record_pagination_query(models::UserMetadata::CURSOR_TYPE);
        let connection = repos
            .metadata()
            .list_metadata(args)
            .await
            .map_err(|e| map_pagination_error(models::UserMetadata::CURSOR_TYPE, e))?;

        Ok(MetadataConnection::from(connection))
    }
}

// -----------------------------------------------------------------------------
// Mutation Root
// -----------------------------------------------------------------------------

/// Mutation root for the user directory.
#[derive(Default)]
pub struct RosterMutation;

#[Object]
impl RosterMutation {
    /// Register a new account with its profile metadata.
    async fn register_user<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        input: RegisterInput,
    ) -> Result<RegisteredUser> {
        let service = ctx.data::<Arc<UserService>>()?;

        let (user, metadata) = service.register(input.into()).await?;

        Ok(RegisteredUser {
            user: User::from(user),
            metadata: UserMetadata::from(metadata),
        })
    }

    /// Update a user's account fields.
    async fn update_user<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        id: i64,
        input: UpdateUserInput,
    ) -> Result<Option<User>> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;

        let update = UserUpdate {
            email: input.email,
            role: input.role.map(Into::into),
            verified: input.verified,
        };
        let user = repos.users().update_user(id, update).await?;
        Ok(user.map(User::from))
    }

    /// Mark a user's email address as verified.
    async fn verify_user<'ctx>(&self, ctx: &Context<'ctx>, id: i64) -> Result<User> {
        let service = ctx.data::<Arc<UserService>>()?;

        let user = service.verify_user(id).await?;
        Ok(User::from(user))
    }

    /// Delete an account and its metadata.
    async fn delete_user<'ctx>(&self, ctx: &Context<'ctx>, id: i64) -> Result<bool> {
        let service = ctx.data::<Arc<UserService>>()?;

        service.delete_account(id).await?;
        Ok(true)
    }

    /// Update a user's profile metadata.
    async fn update_user_metadata<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        user_id: i64,
        input: UpdateMetadataInput,
    ) -> Result<UserMetadata> {
        let service = ctx.data::<Arc<UserService>>()?;

        let metadata = service.update_profile(user_id, input.into()).await?;
        Ok(UserMetadata::from(metadata))
    }

    /// Delete a user's profile metadata, keeping the account.
    async fn delete_user_metadata<'ctx>(&self, ctx: &Context<'ctx>, user_id: i64) -> Result<bool> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;

        let removed = repos.metadata().delete_metadata_for_user(user_id).await?;
        Ok(removed)
    }
}

// -----------------------------------------------------------------------------
// GraphQL Types
// -----------------------------------------------------------------------------

/// Ordering direction.
#[derive(async_graphql::Enum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl From<Order> for OrderDirection {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => OrderDirection::Asc,
            Order::Desc => OrderDirection::Desc,
        }
    }
}

/// Account role.
#[derive(async_graphql::Enum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Client,
    Owner,
    Delivery,
}

impl From<Role> for models::UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Client => models::UserRole::Client,
            Role::Owner => models::UserRole::Owner,
            Role::Delivery => models::UserRole::Delivery,
        }
    }
}

impl From<models::UserRole> for Role {
    fn from(role: models::UserRole) -> Self {
        match role {
            models::UserRole::Client => Role::Client,
            models::UserRole::Owner => Role::Owner,
            models::UserRole::Delivery => Role::Delivery,
        }
    }
}

/// Service status.
#[derive(async_graphql::SimpleObject)]
pub struct ServiceStatus {
    pub total_users: i64,
    pub total_metadata: i64,
}

/// User account. Credentials are never exposed.
#[derive(async_graphql::SimpleObject)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<models::User> for User {
    fn from(u: models::User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            role: u.role.into(),
            verified: u.verified,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// User profile metadata.
#[derive(async_graphql::SimpleObject)]
pub struct UserMetadata {
    pub id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: String,
    pub postal_code: String,
    pub address: String,
    pub phone: Option<String>,
    pub signup_id: Option<String>,
    pub unit_no: Option<String>,
    pub state_province: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<models::UserMetadata> for UserMetadata {
    fn from(m: models::UserMetadata) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            country: m.country,
            postal_code: m.postal_code,
            address: m.address,
            phone: m.phone,
            signup_id: m.signup_id,
            unit_no: m.unit_no,
            state_province: m.state_province,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Result of a successful registration.
#[derive(async_graphql::SimpleObject)]
pub struct RegisteredUser {
    pub user: User,
    pub metadata: UserMetadata,
}

/// A page from classic offset pagination.
#[derive(async_graphql::SimpleObject)]
pub struct UserPage {
    pub items: Vec<User>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl From<roster_core::pagination::Page<models::User>> for UserPage {
    fn from(page: roster_core::pagination::Page<models::User>) -> Self {
        let total_pages = page.total_pages() as i64;
        Self {
            items: page.items.into_iter().map(User::from).collect(),
            total: page.total as i64,
            page: page.page as i64,
            limit: page.limit as i64,
            total_pages,
        }
    }
}

// -----------------------------------------------------------------------------
// Connection Types (Relay-style pagination)
// -----------------------------------------------------------------------------

#[derive(async_graphql::SimpleObject)]
pub struct PageInfo {
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// Generate Relay-style connection types (Edge + Connection) with From impl.
macro_rules! define_connection {
    ($node:ty, $core_model:ty, $edge:ident, $connection:ident) => {
        #[derive(async_graphql::SimpleObject)]
        pub struct $edge {
            pub node: $node,
            pub cursor: String,
        }

        #[derive(async_graphql::SimpleObject)]
        pub struct $connection {
            pub total_count: i64,
            pub page_info: PageInfo,
            pub edges: Vec<$edge>,
        }

        impl From<roster_core::pagination::Connection<$core_model>> for $connection {
            fn from(conn: roster_core::pagination::Connection<$core_model>) -> Self {
                Self {
                    total_count: conn.total_count as i64,
                    page_info: PageInfo {
                        start_cursor: conn.page_info.start_cursor,
                        end_cursor: conn.page_info.end_cursor,
                        has_next_page: conn.page_info.has_next_page,
                        has_prev_page: conn.page_info.has_prev_page,
                    },
                    edges: conn
                        .edges
                        .into_iter()
                        .map(|e| $edge {
                            node: <$node>::from(e.node),
                            cursor: e.cursor,
                        })
                        .collect(),
                }
            }
        }
    };
}

define_connection!(User, models::User, UserEdge, UserConnection);
define_connection!(
    UserMetadata,
    models::UserMetadata,
    MetadataEdge,
    MetadataConnection
);

// -----------------------------------------------------------------------------
// Inputs
// -----------------------------------------------------------------------------

/// Input for registering a new account.
#[derive(InputObject)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub postal_code: String,
    pub address: String,
    pub phone: Option<String>,
    pub signup_id: Option<String>,
    pub unit_no: Option<String>,
    pub state_province: Option<String>,
}

impl From<RegisterInput> for RegisterUser {
    fn from(input: RegisterInput) -> Self {
        Self {
            email: input.email,
            password: input.password,
            role: input.role.into(),
            first_name: input.first_name,
            last_name: input.last_name,
            country: input.country,
            postal_code: input.postal_code,
            address: input.address,
            phone: input.phone,
            signup_id: input.signup_id,
            unit_no: input.unit_no,
            state_province: input.state_province,
        }
    }
}

/// Partial update of account fields.
#[derive(InputObject)]
pub struct UpdateUserInput {
    pub email: Option<String>,
    pub role: Option<Role>,
    pub verified: Option<bool>,
}

/// Partial update of profile metadata.
#[derive(InputObject)]
pub struct UpdateMetadataInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub unit_no: Option<String>,
    pub state_province: Option<String>,
}

impl From<UpdateMetadataInput> for UserMetadataUpdate {
    fn from(input: UpdateMetadataInput) -> Self {
        Self {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            country: input.country,
            postal_code: input.postal_code,
            address: input.address,
            phone: input.phone,
            unit_no: input.unit_no,
            state_province: input.state_province,
        }
    }
}

// -----------------------------------------------------------------------------
// Helpers & Validation
// -----------------------------------------------------------------------------

/// Maximum length for string filter parameters.
const MAX_FILTER_STRING_LENGTH: usize = 128;
/// Maximum page size for pagination.
const MAX_PAGE_SIZE: i32 = 100;
/// Default page size for pagination.
const DEFAULT_PAGE_SIZE: i32 = 20;

/// Validate a filter string parameter.
fn validate_filter_string(s: &Option<String>, field_name: &str) -> Result<()> {
    if let Some(value) = s {
        if value.len() > MAX_FILTER_STRING_LENGTH {
            return Err(async_graphql::Error::new(format!(
                "{} too long: maximum {} characters allowed",
                field_name, MAX_FILTER_STRING_LENGTH
            )));
        }
        if value.is_empty() {
            return Err(async_graphql::Error::new(format!(
                "{} cannot be empty",
                field_name
            )));
        }
    }
    Ok(())
}

/// Validate and normalize pagination first parameter.
fn validate_pagination_first(first: Option<i32>) -> i32 {
    first.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Convert a pagination failure to a GraphQL error, counting rejected
/// cursors on the way through.
fn map_pagination_error(entity: &str, err: PaginationError) -> async_graphql::Error {
    if matches!(
        err,
        PaginationError::InvalidCursor | PaginationError::InvalidCursorType { .. }
    ) {
        record_invalid_cursor(entity);
    }
    async_graphql::Error::new(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_filter_string_boundaries() {
        // Vide = erreur (évite les requêtes inutiles)
        assert!(validate_filter_string(&Some("".into()), "x").is_err());
        // Trop long = erreur (DoS prevention)
        assert!(validate_filter_string(&Some("x".repeat(200)), "x").is_err());
        // None = OK (optionnel)
        assert!(validate_filter_string(&None, "x").is_ok());
    }

    #[test]
    fn test_pagination_clamping() {
        // Valeurs négatives/zéro clampées à 1
        assert_eq!(validate_pagination_first(Some(-100)), 1);
        assert_eq!(validate_pagination_first(Some(0)), 1);
        // Valeurs trop grandes clampées à MAX
        assert_eq!(validate_pagination_first(Some(10000)), MAX_PAGE_SIZE);
        assert_eq!(validate_pagination_first(None), DEFAULT_PAGE_SIZE);
    }

    // Test critique: le message du diagnostic de type traverse la couche GraphQL
    #[test]
    fn test_map_pagination_error_keeps_diagnostic() {
        let err = PaginationError::InvalidCursorType {
            expected: "User".into(),
            actual: "UserMetadata".into(),
        };
        let gql = map_pagination_error("User", err);
        assert!(gql.message.contains("expected type User"));
        assert!(gql.message.contains("got type UserMetadata"));
    }

    // Test de conversion critique - vérifie la forme de sortie GraphQL
    #[test]
    fn test_user_connection_conversion() {
        use chrono::Utc;
        use roster_core::pagination::{Connection, Edge, PageInfo as CorePageInfo};

        let user = models::User {
            id: 1,
            email: "ada@example.com".into(),
            role: models::UserRole::Client,
            verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let conn = Connection {
            total_count: 5,
            page_info: CorePageInfo {
                start_cursor: Some("a".into()),
                end_cursor: Some("a".into()),
                has_next_page: true,
                has_prev_page: false,
            },
            edges: vec![Edge {
                node: user,
                cursor: "a".into(),
            }],
        };

        let gql = UserConnection::from(conn);
        assert_eq!(gql.total_count, 5);
        assert_eq!(gql.edges.len(), 1);
        assert_eq!(gql.edges[0].cursor, "a");
        assert!(gql.page_info.has_next_page);
        assert!(!gql.page_info.has_prev_page);
    }
}

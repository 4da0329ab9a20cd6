//! Port traits for data repositories.
//!
//! These traits define the storage interface used by the domain layer.
//! Implementations live in the infrastructure layer (e.g., `roster-storage`).

use async_trait::async_trait;

use crate::error::{PaginationResult, StorageResult};
use crate::models::{
    NewUser, NewUserMetadata, User, UserMetadata, UserMetadataUpdate, UserUpdate,
};
use crate::pagination::{Connection, CursorArgs, Page, PageArgs};

// =============================================================================
// Filter Types
// =============================================================================

/// Filter options for user list queries.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<crate::models::UserRole>,
    pub verified: Option<bool>,
    /// Case-insensitive substring match on the email address.
    pub email_contains: Option<String>,
}

/// Ordering direction for sorted queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderDirection {
    /// Ascending order (smallest id first).
    #[default]
    Asc,
    /// Descending order (largest id first).
    Desc,
}

// =============================================================================
// Repository Traits
// =============================================================================

/// Repository for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user.
    async fn create_user(&self, user: NewUser) -> StorageResult<User>;

    /// Get a user by id.
    async fn get_user(&self, id: i64) -> StorageResult<Option<User>>;

    /// Get a user by email.
    async fn get_user_by_email(&self, email: &str) -> StorageResult<Option<User>>;

    /// Fetch the stored password hash for a user.
    ///
    /// Credentials are excluded from every other projection.
    async fn get_password_hash(&self, id: i64) -> StorageResult<Option<String>>;

    /// List users as a cursor-paginated connection.
    async fn list_users(
        &self,
        filter: UserFilter,
        args: CursorArgs,
        order: OrderDirection,
    ) -> PaginationResult<Connection<User>>;

    /// List users with classic page/limit pagination.
    async fn paginate_users(
        &self,
        filter: UserFilter,
        args: PageArgs,
    ) -> PaginationResult<Page<User>>;

    /// Count all users.
    async fn count_users(&self) -> StorageResult<u64>;

    /// Apply a partial update; returns the updated user, or `None` if the
    /// id does not exist.
    async fn update_user(&self, id: i64, update: UserUpdate) -> StorageResult<Option<User>>;

    /// Delete a user (metadata rows cascade). Returns whether a row was
    /// removed.
    async fn delete_user(&self, id: i64) -> StorageResult<bool>;
}

/// Repository for user profile metadata.
#[async_trait]
pub trait UserMetadataRepository: Send + Sync {
    /// Insert a metadata row for an existing user.
    async fn create_metadata(
        &self,
        user_id: i64,
        metadata: NewUserMetadata,
    ) -> StorageResult<UserMetadata>;

    /// Get the metadata row for a user.
    async fn get_metadata_for_user(&self, user_id: i64) -> StorageResult<Option<UserMetadata>>;

    /// List metadata rows as a cursor-paginated connection.
    async fn list_metadata(&self, args: CursorArgs) -> PaginationResult<Connection<UserMetadata>>;

    /// Count all metadata rows.
    async fn count_metadata(&self) -> StorageResult<u64>;

    /// Apply a partial update; returns the updated row, or `None` if the
    /// user has no metadata.
    async fn update_metadata(
        &self,
        user_id: i64,
        update: UserMetadataUpdate,
    ) -> StorageResult<Option<UserMetadata>>;

    /// Delete the metadata row for a user, keeping the account itself.
    /// Returns whether a row was removed.
    async fn delete_metadata_for_user(&self, user_id: i64) -> StorageResult<bool>;
}

// =============================================================================
// Composite Repository
// =============================================================================

/// Combined repository access for the service layer.
///
/// This trait provides access to the individual repositories and the
/// atomic operation that spans both tables. Handles are passed in
/// explicitly wherever they are needed; nothing resolves repositories
/// from ambient global state.
#[async_trait]
pub trait Repositories: Send + Sync {
    /// Access the user repository.
    fn users(&self) -> &dyn UserRepository;

    /// Access the metadata repository.
    fn metadata(&self) -> &dyn UserMetadataRepository;

    /// Insert a user and its metadata row in a single transaction.
    ///
    /// The metadata row takes the freshly assigned user id. If either
    /// insert fails, both are rolled back.
    async fn create_user_with_metadata(
        &self,
        user: NewUser,
        metadata: NewUserMetadata,
    ) -> StorageResult<(User, UserMetadata)>;
}

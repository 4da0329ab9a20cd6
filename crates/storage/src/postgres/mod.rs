//! PostgreSQL storage adapter.
//!
//! This module implements the repository traits defined in `roster-core`
//! using PostgreSQL as the backing store.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool and migrations
//! - [`PgRepositories`] - Composite repository implementing `Repositories`
//! - Individual repos: [`PgUserRepository`], [`PgUserMetadataRepository`]
//!
//! # Usage
//!
//! ```ignore
//! let config = DatabaseConfig::for_service(&database_url);
//! let db = Database::connect(&config).await?;
//! db.migrate().await?;
//!
//! let repositories = PgRepositories::new(Arc::new(db));
//! ```

mod database;
mod helpers;
mod metadata_repo;
mod user_repo;

pub use database::{Database, DatabaseConfig};
pub use metadata_repo::PgUserMetadataRepository;
pub use user_repo::PgUserRepository;

use std::sync::Arc;

use async_trait::async_trait;

use roster_core::error::{StorageError, StorageResult};
use roster_core::models::{NewUser, NewUserMetadata, User, UserMetadata};
use roster_core::ports::{Repositories, UserMetadataRepository, UserRepository};

use helpers::map_query_error;
use metadata_repo::MetadataRow;
use user_repo::UserRow;

// =============================================================================
// Composite Repository
// =============================================================================

/// Aggregated PostgreSQL repositories implementing the `Repositories` trait.
///
/// This provides a single entry point for all storage operations and
/// implements the atomic registration insert that spans both tables.
pub struct PgRepositories {
    db: Arc<Database>,
    users: PgUserRepository,
    metadata: PgUserMetadataRepository,
}

impl PgRepositories {
    /// Create a new repository aggregate from a database connection.
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            users: PgUserRepository::new(&db),
            metadata: PgUserMetadataRepository::new(&db),
            db,
        }
    }
}

#[async_trait]
impl Repositories for PgRepositories {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn metadata(&self) -> &dyn UserMetadataRepository {
        &self.metadata
    }

    async fn create_user_with_metadata(
        &self,
        user: NewUser,
        metadata: NewUserMetadata,
    ) -> StorageResult<(User, UserMetadata)> {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| StorageError::TransactionError(e.to_string()))?;

        // Insert the user
        let user_row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, email, role, verified, created_at, updated_at
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_query_error)?;

        let created = user_row.into_user()?;

        // Insert the metadata row against the fresh user id
        let metadata_row = sqlx::query_as::<_, MetadataRow>(
            r#"
            INSERT INTO user_metadata (
                user_id, first_name, last_name, email, country,
                postal_code, address, phone, signup_id, unit_no, state_province
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, user_id, first_name, last_name, email, country,
                      postal_code, address, phone, signup_id, unit_no,
                      state_province, created_at, updated_at
            "#,
        )
        .bind(created.id)
        .bind(&metadata.first_name)
        .bind(&metadata.last_name)
        .bind(&metadata.email)
        .bind(&metadata.country)
        .bind(&metadata.postal_code)
        .bind(&metadata.address)
        .bind(&metadata.phone)
        .bind(&metadata.signup_id)
        .bind(&metadata.unit_no)
        .bind(&metadata.state_province)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_query_error)?;

        tx.commit()
            .await
            .map_err(|e| StorageError::TransactionError(e.to_string()))?;

        Ok((created, metadata_row.into_metadata()))
    }
}

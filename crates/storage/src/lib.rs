//! Storage layer for the Roster user directory service.
//!
//! This crate provides PostgreSQL implementations of the repository traits
//! defined in `roster-core`. It handles all database interactions including
//! connection pooling, migrations, and CRUD operations.
//!
//! # Architecture
//!
//! The storage layer follows the repository pattern:
//!
//! - [`postgres::Database`] - Connection pool management
//! - [`postgres::PgRepositories`] - Composite repository for users + metadata
//! - Per-entity [`roster_core::pagination::PageSource`] adapters backing the
//!   cursor-pagination engine with `OFFSET`/`COUNT` queries
//!
//! # Usage
//!
//! ```ignore
//! use roster_storage::{Database, DatabaseConfig, PgRepositories};
//!
//! // Connect to the database
//! let config = DatabaseConfig::for_service(&database_url);
//! let db = Database::connect(&config).await?;
//!
//! // Run migrations
//! db.migrate().await?;
//!
//! // Create repositories
//! let repositories = Arc::new(PgRepositories::new(Arc::new(db)));
//! ```

pub mod postgres;

pub use postgres::{Database, DatabaseConfig, PgRepositories};

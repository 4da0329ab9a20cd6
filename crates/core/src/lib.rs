//! Core domain layer for the Roster user directory service.
//!
//! This crate contains the domain models, port traits (interfaces), the
//! cursor-pagination engine, and the business logic services. It follows
//! hexagonal architecture principles - this is the innermost layer with
//! no dependencies on infrastructure.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      roster (binary)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │        roster-graphql         │        roster-auth          │
//! │          (API)                │        (bcrypt)             │
//! ├───────────────────────────────┴─────────────────────────────┤
//! │                       roster-storage                        │
//! │                       (PostgreSQL)                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     roster-core  ← YOU ARE HERE             │
//! │            (models, ports, pagination, services)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`models`] - Domain models (User, UserMetadata)
//! - [`pagination`] - Opaque cursor codec and connection-style pagination
//! - [`ports`] - Interface traits for adapters to implement
//! - [`services`] - Core business logic (UserService)
//! - [`error`] - Domain error types
//! - [`metrics`] - Prometheus metrics definitions
//!
//! # Key Concepts
//!
//! ## Ports
//!
//! Ports define interfaces that external adapters must implement:
//!
//! - [`ports::Repositories`] - Persist and query users and their metadata
//! - [`ports::PasswordHasher`] - Hash and verify passwords
//!
//! ## Cursor Pagination
//!
//! List queries return Relay-style connections (edges + pageInfo). Each edge
//! carries an opaque cursor that encodes the entity type, the entity id, and
//! a 1-based running index into the full result set. Passing the last edge's
//! cursor as `after` resumes exactly after it, independent of page size.
//!
//! The engine is a pure function over a narrow [`pagination::PageSource`]
//! capability (offset read + count); storage adapters implement that seam
//! instead of extending a base repository type.

pub mod error;
pub mod metrics;
pub mod models;
pub mod pagination;
pub mod ports;
pub mod services;

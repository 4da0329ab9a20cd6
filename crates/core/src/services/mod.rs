//! Core business logic services.

mod users;

pub use users::UserService;

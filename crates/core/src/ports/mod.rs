mod password;
mod repository;

pub use password::*;
pub use repository::*;

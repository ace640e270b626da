//! User service: read-only user directory for its sibling services.

pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub use handler::UserHandler;
pub use model::User;
pub use repository::{MemoryUserRepository, RepositoryError, UserRepository};
pub use service::UserService;

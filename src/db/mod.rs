pub mod pool;
pub mod roles;
pub mod schema;
pub mod sessions;
pub mod users;

pub use pool::{create_pool, health_check, run_migrations};

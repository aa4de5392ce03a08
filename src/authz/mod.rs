pub mod middleware;
pub mod roles;

pub use middleware::CurrentUser;

// City CMS auth backend library

pub mod api;
pub mod auth;
pub mod authz;
pub mod config;
pub mod db;
pub mod errors;
pub mod observability;

pub use config::Config;
pub use errors::{AppError, Result};

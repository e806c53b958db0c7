//! Database layer
//!
//! Connection pool creation, embedded migrations, and repository
//! implementations for all entities.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DbPool};

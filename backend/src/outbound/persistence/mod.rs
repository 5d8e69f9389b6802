//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the stream and push repository ports backed by
//! PostgreSQL through `diesel-async` and `bb8` pooling.
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   records. Lifecycle rules live in the domain.
//! - **Constraints as guards**: the unique external id and the partial unique
//!   index on active pushes settle concurrent writers.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//!
//! # Example
//!
//! ```ignore
//! use stream_relay::outbound::persistence::{DbPool, DieselStreamRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/stream_relay")).await?;
//! let streams = DieselStreamRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_push_repository;
mod diesel_stream_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_push_repository::DieselPushRepository;
pub use diesel_stream_repository::DieselStreamRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: in-process repositories for development and tests
//! - **media_server**: reqwest client for the media server control API
//!
//! Adapters are thin translators between domain types and
//! infrastructure-specific representations. They contain no lifecycle rules.

pub mod media_server;
pub mod memory;
pub mod persistence;

//! Stream relay: control plane between API clients and a WebRTC media server.
//!
//! The crate follows a hexagonal layout. `domain` owns the stream and push
//! lifecycle rules and the ports they depend on, `inbound` adapts HTTP
//! requests and media server webhooks onto driving ports, and `outbound`
//! implements the driven ports over PostgreSQL, memory and the media server
//! control API.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;

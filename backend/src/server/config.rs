//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::IngestEndpoint;
use crate::outbound::media_server::MediaServerApiConfig;
use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) ingest: IngestEndpoint,
    pub(crate) media_server: MediaServerApiConfig,
    pub(crate) request_timeout: Duration,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a configuration backed by the in-memory lifecycle store.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        ingest: IngestEndpoint,
        media_server: MediaServerApiConfig,
        request_timeout: Duration,
    ) -> Self {
        Self {
            bind_addr,
            ingest,
            media_server,
            request_timeout,
            db_pool: None,
        }
    }

    /// Attach a database connection pool so the Diesel repositories are used.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Whether the server persists state in PostgreSQL.
    #[must_use]
    pub fn uses_database(&self) -> bool {
        self.db_pool.is_some()
    }
}

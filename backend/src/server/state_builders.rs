//! Builders wiring lifecycle services into HTTP state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::domain::ports::{MediaServerClient, PushRepository, StreamRepository};
use crate::domain::{IngestEndpoint, StreamLifecycleService, StreamQueryService};
use crate::inbound::http::state::HttpState;
use crate::outbound::media_server::OmeHttpClient;
use crate::outbound::memory::InMemoryLifecycleStore;
use crate::outbound::persistence::{DieselPushRepository, DieselStreamRepository};

use super::ServerConfig;

/// Build HTTP state over one lifecycle service shared by every driving port.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use mockable::DefaultClock;
/// use stream_relay::domain::IngestEndpoint;
/// use stream_relay::domain::ports::FixtureMediaServerClient;
/// use stream_relay::outbound::memory::InMemoryLifecycleStore;
/// use stream_relay::server::lifecycle_http_state;
///
/// let store = Arc::new(InMemoryLifecycleStore::new());
/// let _state = lifecycle_http_state(
///     Arc::clone(&store),
///     store,
///     Arc::new(FixtureMediaServerClient),
///     Arc::new(DefaultClock),
///     IngestEndpoint::new("http://localhost:3333", "app"),
/// );
/// ```
pub fn lifecycle_http_state<S, P, M>(
    streams: Arc<S>,
    pushes: Arc<P>,
    media_server: Arc<M>,
    clock: Arc<dyn Clock>,
    ingest: IngestEndpoint,
) -> HttpState
where
    S: StreamRepository + 'static,
    P: PushRepository + 'static,
    M: MediaServerClient + 'static,
{
    let query = Arc::new(StreamQueryService::new(
        Arc::clone(&streams),
        Arc::clone(&pushes),
    ));
    let lifecycle = Arc::new(StreamLifecycleService::new(
        streams,
        pushes,
        media_server,
        clock,
        ingest,
    ));
    HttpState::new(
        Arc::clone(&lifecycle) as _,
        query,
        Arc::clone(&lifecycle) as _,
        lifecycle,
    )
}

/// Build HTTP state from server configuration.
///
/// Uses the Diesel repositories when a pool is configured and the in-memory
/// store otherwise.
///
/// # Errors
/// Returns [`std::io::Error`] when the media server HTTP client cannot be
/// constructed.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let media_server = Arc::new(
        OmeHttpClient::new(config.media_server.clone(), config.request_timeout).map_err(
            |err| std::io::Error::other(format!("media server client setup failed: {err}")),
        )?,
    );
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let ingest = config.ingest.clone();

    let state = match &config.db_pool {
        Some(pool) => lifecycle_http_state(
            Arc::new(DieselStreamRepository::new(pool.clone())),
            Arc::new(DieselPushRepository::new(pool.clone())),
            media_server,
            clock,
            ingest,
        ),
        None => {
            let store = Arc::new(InMemoryLifecycleStore::new());
            lifecycle_http_state(Arc::clone(&store), store, media_server, clock, ingest)
        }
    };
    Ok(state)
}

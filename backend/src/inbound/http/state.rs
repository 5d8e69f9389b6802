//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    FixturePushCommand, FixtureStreamCommand, FixtureStreamEventIngest, FixtureStreamQuery,
    PushCommand, StreamCommand, StreamEventIngest, StreamQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub streams: Arc<dyn StreamCommand>,
    pub streams_query: Arc<dyn StreamQuery>,
    pub pushes: Arc<dyn PushCommand>,
    pub events: Arc<dyn StreamEventIngest>,
}

impl HttpState {
    /// Construct state from port implementations.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use stream_relay::domain::ports::{
    ///     FixturePushCommand, FixtureStreamCommand, FixtureStreamEventIngest, FixtureStreamQuery,
    /// };
    /// use stream_relay::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureStreamCommand),
    ///     Arc::new(FixtureStreamQuery),
    ///     Arc::new(FixturePushCommand),
    ///     Arc::new(FixtureStreamEventIngest),
    /// );
    /// let _events = state.events.clone();
    /// ```
    pub fn new(
        streams: Arc<dyn StreamCommand>,
        streams_query: Arc<dyn StreamQuery>,
        pushes: Arc<dyn PushCommand>,
        events: Arc<dyn StreamEventIngest>,
    ) -> Self {
        Self {
            streams,
            streams_query,
            pushes,
            events,
        }
    }

    /// State wired to fixture ports that accept every call.
    pub fn fixtures() -> Self {
        Self::new(
            Arc::new(FixtureStreamCommand),
            Arc::new(FixtureStreamQuery),
            Arc::new(FixturePushCommand),
            Arc::new(FixtureStreamEventIngest),
        )
    }
}

//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`StreamRepository`, `PushRepository`, `MediaServerClient`)
//! are implemented by outbound adapters. Driving ports (`StreamCommand`,
//! `StreamQuery`, `PushCommand`, `StreamEventIngest`) are implemented by the
//! lifecycle services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod media_server_client;
mod push_command;
mod push_repository;
mod stream_command;
mod stream_event_ingest;
mod stream_query;
mod stream_repository;

#[cfg(test)]
pub use media_server_client::MockMediaServerClient;
pub use media_server_client::{
    FixtureMediaServerClient, MediaServerClient, MediaServerError, StartPushCommand,
};
#[cfg(test)]
pub use push_command::MockPushCommand;
pub use push_command::{
    FixturePushCommand, PushCommand, PushPayload, StartPushRequest, StartPushResponse,
    StopPushRequest, StopPushResponse,
};
#[cfg(test)]
pub use push_repository::MockPushRepository;
pub use push_repository::{FixturePushRepository, PushRepository, PushRepositoryError};
#[cfg(test)]
pub use stream_command::MockStreamCommand;
pub use stream_command::{
    CloseStreamRequest, CreateStreamRequest, CreateStreamResponse, FixtureStreamCommand,
    StreamCommand, StreamPayload,
};
#[cfg(test)]
pub use stream_event_ingest::MockStreamEventIngest;
pub use stream_event_ingest::{FixtureStreamEventIngest, ReconcileOutcome, StreamEventIngest};
#[cfg(test)]
pub use stream_query::MockStreamQuery;
pub use stream_query::{FixtureStreamQuery, PushHistory, StreamQuery};
#[cfg(test)]
pub use stream_repository::MockStreamRepository;
pub use stream_repository::{FixtureStreamRepository, StreamRepository, StreamRepositoryError};

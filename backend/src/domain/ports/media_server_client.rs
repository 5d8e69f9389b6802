//! Driven port for commands sent to the media server control API.
//!
//! Every call is a blocking remote procedure with a binary outcome. The core
//! never retries; adapters own transport timeouts.

use async_trait::async_trait;

use crate::domain::{PushId, RtmpDestination};

use super::define_port_error;

/// Command asking a media server node to republish a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartPushCommand {
    /// Address of the node hosting the stream.
    pub node_address: String,
    /// Stream name as known by the media server.
    pub stream_name: String,
    pub destination: RtmpDestination,
    /// Correlation id the node tracks the push under.
    pub push_id: PushId,
}

define_port_error! {
    /// Errors surfaced while commanding the media server.
    pub enum MediaServerError {
        /// Network transport failed or the node answered with a server error.
        Transport { message: String } =>
            "media server transport failed: {message}",
        /// The node did not answer in time.
        Timeout { message: String } =>
            "media server timeout: {message}",
        /// The addressed push or stream does not exist on the node.
        NotFound { message: String } =>
            "media server resource not found: {message}",
        /// The node refused the command.
        Rejected { message: String } =>
            "media server rejected command: {message}",
        /// The command could not be built from the supplied values.
        InvalidRequest { message: String } =>
            "media server request invalid: {message}",
    }
}

impl MediaServerError {
    /// Whether the failure means the addressed resource is already gone.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Port for the media server control API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaServerClient: Send + Sync {
    async fn start_push(&self, command: &StartPushCommand) -> Result<(), MediaServerError>;

    async fn stop_push(&self, node_address: &str, push_id: &PushId)
    -> Result<(), MediaServerError>;

    /// Delete a stream resource. A missing stream counts as success.
    async fn delete_stream(
        &self,
        stream_name: &str,
        node_address: &str,
    ) -> Result<(), MediaServerError>;
}

/// Fixture client that accepts every command.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMediaServerClient;

#[async_trait]
impl MediaServerClient for FixtureMediaServerClient {
    async fn start_push(&self, _command: &StartPushCommand) -> Result<(), MediaServerError> {
        Ok(())
    }

    async fn stop_push(
        &self,
        _node_address: &str,
        _push_id: &PushId,
    ) -> Result<(), MediaServerError> {
        Ok(())
    }

    async fn delete_stream(
        &self,
        _stream_name: &str,
        _node_address: &str,
    ) -> Result<(), MediaServerError> {
        Ok(())
    }
}

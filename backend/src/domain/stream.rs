//! Stream aggregate and its identifiers.
//!
//! A stream is the logical ingest session a client publishes into. The media
//! server reports its lifecycle through webhooks, so `status` stays an open
//! string: the core only ever assigns [`StreamStatus::initiated`] itself and
//! stores every reported value verbatim.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum accepted length for caller-supplied external identifiers.
pub const EXTERNAL_ID_MAX_LEN: usize = 256;

/// Opaque stream identifier, also used as the media server stream name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(Uuid);

impl StreamId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StreamId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Validation failures for [`ExternalId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExternalIdValidationError {
    #[error("external id must not be empty")]
    Empty,
    #[error("external id must be at most {max} characters")]
    TooLong { max: usize },
}

/// Caller-supplied correlation key used for idempotent stream creation.
///
/// # Examples
/// ```
/// use stream_relay::domain::ExternalId;
///
/// let id = ExternalId::new("ext-1").expect("valid external id");
/// assert_eq!(id.as_str(), "ext-1");
/// assert_eq!(ExternalId::new("  ext-1 ").expect("valid external id"), id);
/// assert!(ExternalId::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalId(String);

impl ExternalId {
    /// Validate and wrap an external identifier.
    ///
    /// Surrounding whitespace is dropped, so padded and bare keys name the
    /// same stream.
    pub fn new(value: impl Into<String>) -> Result<Self, ExternalIdValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ExternalIdValidationError::Empty);
        }
        if trimmed.chars().count() > EXTERNAL_ID_MAX_LEN {
            return Err(ExternalIdValidationError::TooLong {
                max: EXTERNAL_ID_MAX_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for ExternalId {
    type Error = ExternalIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExternalId> for String {
    fn from(value: ExternalId) -> Self {
        value.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stream status as stored; an open set of media-server-reported strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamStatus(String);

impl StreamStatus {
    /// Status assigned when the stream record is first created.
    pub const INITIATED: &'static str = "initiated";
    /// Status reported when a media server node starts hosting the stream.
    pub const OPENING: &'static str = "opening";

    /// The only status the core assigns on its own.
    #[must_use]
    pub fn initiated() -> Self {
        Self(Self::INITIATED.to_owned())
    }

    /// Wrap a reported status verbatim.
    #[must_use]
    pub fn reported(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Whether this status announces a node taking over the stream.
    #[must_use]
    pub fn is_opening(&self) -> bool {
        self.0 == Self::OPENING
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hosting details reported by an `opening` webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOpening {
    pub status: StreamStatus,
    pub protocol: String,
    pub server_ip_address: String,
}

/// Field bundle used to rehydrate a [`Stream`] from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDraft {
    pub id: StreamId,
    pub external_id: ExternalId,
    pub status: StreamStatus,
    pub server_ip_address: Option<String>,
    pub protocol: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A logical live stream session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    id: StreamId,
    external_id: ExternalId,
    status: StreamStatus,
    server_ip_address: Option<String>,
    protocol: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Stream {
    /// Build a freshly initiated stream that no node hosts yet.
    #[must_use]
    pub fn initiate(id: StreamId, external_id: ExternalId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            external_id,
            status: StreamStatus::initiated(),
            server_ip_address: None,
            protocol: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrate a stream from stored fields.
    ///
    /// Blank addresses and protocols are normalised to `None`.
    #[must_use]
    pub fn from_draft(draft: StreamDraft) -> Self {
        let StreamDraft {
            id,
            external_id,
            status,
            server_ip_address,
            protocol,
            created_at,
            updated_at,
        } = draft;
        Self {
            id,
            external_id,
            status,
            server_ip_address: server_ip_address.filter(|value| !value.trim().is_empty()),
            protocol: protocol.filter(|value| !value.trim().is_empty()),
            created_at,
            updated_at,
        }
    }

    /// Apply an `opening` report: status, protocol and hosting node.
    pub fn apply_opening(&mut self, opening: &StreamOpening, at: DateTime<Utc>) {
        self.status = opening.status.clone();
        self.protocol = Some(opening.protocol.clone()).filter(|value| !value.is_empty());
        self.server_ip_address =
            Some(opening.server_ip_address.clone()).filter(|value| !value.is_empty());
        self.updated_at = at;
    }

    /// Overwrite the status only.
    pub fn apply_status(&mut self, status: StreamStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    pub fn external_id(&self) -> &ExternalId {
        &self.external_id
    }

    pub fn status(&self) -> &StreamStatus {
        &self.status
    }

    /// Node currently hosting the stream, once an `opening` was reported.
    pub fn server_ip_address(&self) -> Option<&str> {
        self.server_ip_address.as_deref()
    }

    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Name the media server knows this stream by.
    #[must_use]
    pub fn media_server_name(&self) -> String {
        self.id.to_string()
    }
}

/// Template for the WHIP ingest URL handed to publishing clients.
///
/// # Examples
/// ```
/// use stream_relay::domain::{IngestEndpoint, StreamId};
///
/// let endpoint = IngestEndpoint::new("https://media.example.test/", "app");
/// let id: StreamId = "6f1c2f54-4c1a-4d8e-9a57-2d0f1f0c9b11".parse().expect("uuid");
/// assert_eq!(
///     endpoint.url_for(&id),
///     "https://media.example.test/app/6f1c2f54-4c1a-4d8e-9a57-2d0f1f0c9b11?direction=whip"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestEndpoint {
    base_url: String,
    application: String,
}

impl IngestEndpoint {
    /// Query parameter selecting the WHIP ingest direction.
    pub const DIRECTION_PARAM: &'static str = "direction=whip";

    pub fn new(base_url: impl Into<String>, application: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let application = application.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            application: application.trim_matches('/').to_owned(),
        }
    }

    /// Ingest URL for the given stream.
    #[must_use]
    pub fn url_for(&self, stream_id: &StreamId) -> String {
        format!(
            "{}/{}/{}?{}",
            self.base_url,
            self.application,
            stream_id,
            Self::DIRECTION_PARAM
        )
    }
}

//! Push (re-broadcast) records layered on top of a stream.
//!
//! A push moves `active -> inactive` exactly once; restarting always creates a
//! new record, so the push history of a stream is append-only.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::StreamId;

/// Opaque push identifier, doubling as the media server correlation id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PushId(Uuid);

impl PushId {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PushId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PushId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Push lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushStatus {
    Active,
    Inactive,
}

impl PushStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for PushStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored push status is outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown push status: {0}")]
pub struct UnknownPushStatus(pub String);

impl FromStr for PushStatus {
    type Err = UnknownPushStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(UnknownPushStatus(other.to_owned())),
        }
    }
}

/// Validation failures for [`RtmpDestination`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RtmpDestinationError {
    #[error("rtmp url must not be empty")]
    Empty,
    #[error("rtmp url is not a valid URL: {0}")]
    Malformed(String),
    #[error("rtmp url scheme must be rtmp or rtmps, got {0}")]
    UnsupportedScheme(String),
    #[error("rtmp url must include a host")]
    MissingHost,
}

/// Validated republish target.
///
/// The original string is preserved so the media server receives exactly what
/// the caller sent.
///
/// # Examples
/// ```
/// use stream_relay::domain::RtmpDestination;
///
/// let dest = RtmpDestination::parse("rtmp://dest/a").expect("valid destination");
/// assert_eq!(dest.as_str(), "rtmp://dest/a");
/// assert!(RtmpDestination::parse("https://dest/a").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RtmpDestination(String);

impl RtmpDestination {
    pub fn parse(raw: impl Into<String>) -> Result<Self, RtmpDestinationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RtmpDestinationError::Empty);
        }
        let url =
            Url::parse(trimmed).map_err(|err| RtmpDestinationError::Malformed(err.to_string()))?;
        if !matches!(url.scheme(), "rtmp" | "rtmps") {
            return Err(RtmpDestinationError::UnsupportedScheme(
                url.scheme().to_owned(),
            ));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(RtmpDestinationError::MissingHost);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RtmpDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Field bundle used to build or rehydrate a [`Push`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushDraft {
    pub id: PushId,
    pub stream_id: StreamId,
    pub rtmp_url: String,
    pub status: PushStatus,
    pub server_ip_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One re-broadcast of a stream to an RTMP destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Push {
    id: PushId,
    stream_id: StreamId,
    rtmp_url: String,
    status: PushStatus,
    server_ip_address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Push {
    /// Record a push the media server has just accepted.
    #[must_use]
    pub fn activate(
        id: PushId,
        stream_id: StreamId,
        destination: &RtmpDestination,
        server_ip_address: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            stream_id,
            rtmp_url: destination.as_str().to_owned(),
            status: PushStatus::Active,
            server_ip_address: server_ip_address.into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn from_draft(draft: PushDraft) -> Self {
        let PushDraft {
            id,
            stream_id,
            rtmp_url,
            status,
            server_ip_address,
            created_at,
            updated_at,
        } = draft;
        Self {
            id,
            stream_id,
            rtmp_url,
            status,
            server_ip_address,
            created_at,
            updated_at,
        }
    }

    /// Transition to `inactive`. Already inactive pushes keep their timestamp.
    pub fn deactivate(&mut self, at: DateTime<Utc>) {
        if self.status == PushStatus::Active {
            self.status = PushStatus::Inactive;
            self.updated_at = at;
        }
    }

    pub fn id(&self) -> PushId {
        self.id
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    pub fn rtmp_url(&self) -> &str {
        self.rtmp_url.as_str()
    }

    pub fn status(&self) -> PushStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == PushStatus::Active
    }

    /// Media server node the push was started on.
    pub fn server_ip_address(&self) -> &str {
        self.server_ip_address.as_str()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for push primitives.

    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(seconds: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, seconds)
            .single()
            .expect("valid fixture timestamp")
    }

    #[rstest]
    #[case::rtmp("rtmp://dest/a")]
    #[case::rtmps("rtmps://live.example.test:443/app/key")]
    #[case::padded("  rtmp://dest/b  ")]
    fn accepts_rtmp_destinations(#[case] raw: &str) {
        let dest = RtmpDestination::parse(raw).expect("destination accepted");
        assert_eq!(dest.as_str(), raw.trim());
    }

    #[rstest]
    #[case::empty("", RtmpDestinationError::Empty)]
    #[case::http("http://dest/a", RtmpDestinationError::UnsupportedScheme("http".to_owned()))]
    fn rejects_invalid_destinations(#[case] raw: &str, #[case] expected: RtmpDestinationError) {
        assert_eq!(RtmpDestination::parse(raw), Err(expected));
    }

    #[rstest]
    fn rejects_relative_destinations() {
        assert!(matches!(
            RtmpDestination::parse("dest/a"),
            Err(RtmpDestinationError::Malformed(_))
        ));
    }

    #[rstest]
    fn deactivate_is_one_way() {
        let dest = RtmpDestination::parse("rtmp://dest/a").expect("valid destination");
        let mut push = Push::activate(PushId::random(), StreamId::random(), &dest, "10.0.0.5", at(0));

        push.deactivate(at(10));
        push.deactivate(at(20));

        assert_eq!(push.status(), PushStatus::Inactive);
        assert_eq!(push.updated_at(), at(10));
        assert_eq!(push.created_at(), at(0));
    }

    #[rstest]
    #[case::active("active", Ok(PushStatus::Active))]
    #[case::inactive("inactive", Ok(PushStatus::Inactive))]
    #[case::unknown("paused", Err(UnknownPushStatus("paused".to_owned())))]
    fn parses_stored_statuses(
        #[case] raw: &str,
        #[case] expected: Result<PushStatus, UnknownPushStatus>,
    ) {
        assert_eq!(raw.parse::<PushStatus>(), expected);
    }
}

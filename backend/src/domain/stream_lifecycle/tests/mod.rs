//! Shared fixtures and module wiring for lifecycle service unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::StreamLifecycleService;
use crate::domain::ports::{MockMediaServerClient, MockPushRepository, MockStreamRepository};
use crate::domain::{
    ExternalId, IngestEndpoint, Push, PushId, RtmpDestination, Stream, StreamDraft, StreamId,
    StreamStatus,
};

mod pushes;

pub(super) const INGEST_BASE_URL: &str = "https://media.example.test";
pub(super) const NODE: &str = "10.0.0.5";

pub(super) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(super) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(super) type TestService =
    StreamLifecycleService<MockStreamRepository, MockPushRepository, MockMediaServerClient>;

pub(super) fn make_service(
    streams: MockStreamRepository,
    pushes: MockPushRepository,
    media_server: MockMediaServerClient,
) -> TestService {
    StreamLifecycleService::new(
        Arc::new(streams),
        Arc::new(pushes),
        Arc::new(media_server),
        fixture_clock(),
        IngestEndpoint::new(INGEST_BASE_URL, "app"),
    )
}

pub(super) fn external_id(raw: &str) -> ExternalId {
    ExternalId::new(raw).expect("valid external id")
}

pub(super) fn destination(raw: &str) -> RtmpDestination {
    RtmpDestination::parse(raw).expect("valid rtmp destination")
}

pub(super) fn initiated_stream(external: &str) -> Stream {
    Stream::initiate(StreamId::random(), external_id(external), fixture_timestamp())
}

pub(super) fn hosted_stream(external: &str) -> Stream {
    Stream::from_draft(StreamDraft {
        id: StreamId::random(),
        external_id: external_id(external),
        status: StreamStatus::reported("opening"),
        server_ip_address: Some(NODE.to_owned()),
        protocol: Some("whip".to_owned()),
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    })
}

pub(super) fn active_push(stream: &Stream, rtmp_url: &str) -> Push {
    Push::activate(
        PushId::random(),
        stream.id(),
        &destination(rtmp_url),
        NODE,
        fixture_timestamp(),
    )
}

/// Expect exactly one lookup of `stream` by id.
pub(super) fn expect_stream_lookup(streams: &mut MockStreamRepository, stream: &Stream) {
    let expected_id = stream.id();
    let found = stream.clone();
    streams
        .expect_find_by_id()
        .withf(move |id| *id == expected_id)
        .times(1)
        .return_once(move |_| Ok(Some(found)));
}

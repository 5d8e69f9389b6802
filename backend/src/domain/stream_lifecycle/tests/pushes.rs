//! Push start, failover and stop coverage.

use std::sync::{Arc, Mutex};

use mockall::Sequence;
use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::PushStatus;
use crate::domain::ports::{
    MediaServerError, PushCommand, PushRepositoryError, StartPushCommand, StartPushRequest,
    StopPushRequest,
};

fn start_request(stream: &Stream, rtmp_url: &str) -> StartPushRequest {
    StartPushRequest {
        stream_id: stream.id(),
        destination: destination(rtmp_url),
    }
}

fn inactive_copy(push: &Push) -> Push {
    let mut retired = push.clone();
    retired.deactivate(fixture_timestamp());
    retired
}

#[rstest]
#[tokio::test]
async fn start_push_commands_hosting_node_and_records_active_push() {
    let stream = hosted_stream("ext-1");
    let stream_id = stream.id();
    let expected_name = stream_id.to_string();
    let commanded = Arc::new(Mutex::new(None::<PushId>));
    let commanded_in_mock = Arc::clone(&commanded);

    let mut streams = MockStreamRepository::new();
    expect_stream_lookup(&mut streams, &stream);
    let mut pushes = MockPushRepository::new();
    pushes
        .expect_find_active_for_stream()
        .times(1)
        .return_once(|_| Ok(None));
    pushes
        .expect_insert()
        .withf(move |push| {
            push.is_active()
                && push.stream_id() == stream_id
                && push.rtmp_url() == "rtmp://dest/a"
                && push.server_ip_address() == NODE
        })
        .times(1)
        .return_once(|_| Ok(()));
    let mut media_server = MockMediaServerClient::new();
    media_server
        .expect_start_push()
        .withf(move |command: &StartPushCommand| {
            command.node_address == NODE
                && command.stream_name == expected_name
                && command.destination.as_str() == "rtmp://dest/a"
        })
        .times(1)
        .returning(move |command| {
            *commanded_in_mock.lock().expect("lock") = Some(command.push_id);
            Ok(())
        });
    media_server.expect_stop_push().times(0);

    let service = make_service(streams, pushes, media_server);
    let response = service
        .start_push(start_request(&stream, "rtmp://dest/a"))
        .await
        .expect("push started");

    assert_eq!(response.push.status, PushStatus::Active);
    assert_eq!(response.push.stream_id, stream_id);
    assert!(response.replaced.is_none());
    assert_eq!(*commanded.lock().expect("lock"), Some(response.push.id));
}

#[rstest]
#[tokio::test]
async fn start_push_fails_over_from_the_active_push() {
    let stream = hosted_stream("ext-1");
    let previous = active_push(&stream, "rtmp://dest/a");
    let previous_id = previous.id();
    let retired = inactive_copy(&previous);
    let mut seq = Sequence::new();

    let mut streams = MockStreamRepository::new();
    expect_stream_lookup(&mut streams, &stream);
    let mut pushes = MockPushRepository::new();
    let mut media_server = MockMediaServerClient::new();

    pushes
        .expect_find_active_for_stream()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_| Ok(Some(previous)));
    media_server
        .expect_stop_push()
        .withf(move |node, push_id| node == NODE && *push_id == previous_id)
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_, _| Ok(()));
    pushes
        .expect_mark_inactive()
        .withf(move |push_id, _at| *push_id == previous_id)
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_, _| Ok(Some(retired)));
    media_server
        .expect_start_push()
        .withf(|command| command.destination.as_str() == "rtmp://dest/b")
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(()));
    pushes
        .expect_insert()
        .withf(|push| push.is_active() && push.rtmp_url() == "rtmp://dest/b")
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(()));

    let service = make_service(streams, pushes, media_server);
    let response = service
        .start_push(start_request(&stream, "rtmp://dest/b"))
        .await
        .expect("failover succeeds");

    assert_eq!(response.replaced, Some(previous_id));
    assert_ne!(response.push.id, previous_id);
    assert_eq!(response.push.rtmp_url, "rtmp://dest/b");
}

#[rstest]
#[tokio::test]
async fn failover_tolerates_previous_push_missing_remotely() {
    let stream = hosted_stream("ext-1");
    let previous = active_push(&stream, "rtmp://dest/a");
    let previous_id = previous.id();

    let mut streams = MockStreamRepository::new();
    expect_stream_lookup(&mut streams, &stream);
    let mut pushes = MockPushRepository::new();
    pushes
        .expect_find_active_for_stream()
        .times(1)
        .return_once(move |_| Ok(Some(previous)));
    pushes
        .expect_mark_inactive()
        .times(1)
        .return_once(|_, _| Ok(None));
    pushes.expect_insert().times(1).return_once(|_| Ok(()));
    let mut media_server = MockMediaServerClient::new();
    media_server
        .expect_stop_push()
        .times(1)
        .return_once(|_, _| Err(MediaServerError::not_found("status 404: no such push")));
    media_server
        .expect_start_push()
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(streams, pushes, media_server);
    let response = service
        .start_push(start_request(&stream, "rtmp://dest/b"))
        .await
        .expect("missing remote push is not fatal");

    assert_eq!(response.replaced, Some(previous_id));
}

#[rstest]
#[tokio::test]
async fn failover_aborts_when_previous_push_cannot_be_stopped() {
    let stream = hosted_stream("ext-1");
    let previous = active_push(&stream, "rtmp://dest/a");

    let mut streams = MockStreamRepository::new();
    expect_stream_lookup(&mut streams, &stream);
    let mut pushes = MockPushRepository::new();
    pushes
        .expect_find_active_for_stream()
        .times(1)
        .return_once(move |_| Ok(Some(previous)));
    pushes.expect_mark_inactive().times(0);
    pushes.expect_insert().times(0);
    let mut media_server = MockMediaServerClient::new();
    media_server
        .expect_stop_push()
        .times(1)
        .return_once(|_, _| Err(MediaServerError::rejected("status 400: bad id")));
    media_server.expect_start_push().times(0);

    let service = make_service(streams, pushes, media_server);
    let error = service
        .start_push(start_request(&stream, "rtmp://dest/b"))
        .await
        .expect_err("stop failure aborts failover");

    assert_eq!(error.code(), ErrorCode::RemoteCommandFailed);
}

#[rstest]
#[tokio::test]
async fn remote_start_failure_records_nothing() {
    let stream = hosted_stream("ext-1");
    let mut streams = MockStreamRepository::new();
    expect_stream_lookup(&mut streams, &stream);
    let mut pushes = MockPushRepository::new();
    pushes
        .expect_find_active_for_stream()
        .times(1)
        .return_once(|_| Ok(None));
    pushes.expect_insert().times(0);
    let mut media_server = MockMediaServerClient::new();
    media_server
        .expect_start_push()
        .times(1)
        .return_once(|_| Err(MediaServerError::timeout("no answer within 10s")));

    let service = make_service(streams, pushes, media_server);
    let error = service
        .start_push(start_request(&stream, "rtmp://dest/a"))
        .await
        .expect_err("remote failure propagates");

    assert_eq!(error.code(), ErrorCode::RemoteCommandFailed);
}

#[rstest]
#[tokio::test]
async fn failed_record_stops_the_started_push() {
    let stream = hosted_stream("ext-1");
    let started = Arc::new(Mutex::new(None::<PushId>));
    let started_in_mock = Arc::clone(&started);
    let stopped = Arc::new(Mutex::new(None::<PushId>));
    let stopped_in_mock = Arc::clone(&stopped);

    let mut streams = MockStreamRepository::new();
    expect_stream_lookup(&mut streams, &stream);
    let stream_id = stream.id();
    let mut pushes = MockPushRepository::new();
    pushes
        .expect_find_active_for_stream()
        .times(1)
        .return_once(|_| Ok(None));
    pushes
        .expect_insert()
        .times(1)
        .return_once(move |_| Err(PushRepositoryError::duplicate_active(stream_id.to_string())));
    let mut media_server = MockMediaServerClient::new();
    media_server
        .expect_start_push()
        .times(1)
        .returning(move |command| {
            *started_in_mock.lock().expect("lock") = Some(command.push_id);
            Ok(())
        });
    media_server
        .expect_stop_push()
        .withf(|node, _| node == NODE)
        .times(1)
        .returning(move |_, push_id| {
            *stopped_in_mock.lock().expect("lock") = Some(*push_id);
            Ok(())
        });

    let service = make_service(streams, pushes, media_server);
    let error = service
        .start_push(start_request(&stream, "rtmp://dest/a"))
        .await
        .expect_err("duplicate active push");

    assert_eq!(error.code(), ErrorCode::Conflict);
    let started = *started.lock().expect("lock");
    assert!(started.is_some());
    assert_eq!(started, *stopped.lock().expect("lock"));
}

#[rstest]
#[tokio::test]
async fn start_push_requires_a_hosting_node() {
    let stream = initiated_stream("ext-1");
    let mut streams = MockStreamRepository::new();
    expect_stream_lookup(&mut streams, &stream);
    let mut pushes = MockPushRepository::new();
    pushes.expect_find_active_for_stream().times(0);
    let mut media_server = MockMediaServerClient::new();
    media_server.expect_start_push().times(0);

    let service = make_service(streams, pushes, media_server);
    let error = service
        .start_push(start_request(&stream, "rtmp://dest/a"))
        .await
        .expect_err("stream is not hosted");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn start_push_rejects_unknown_streams() {
    let mut streams = MockStreamRepository::new();
    streams.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let service = make_service(streams, MockPushRepository::new(), MockMediaServerClient::new());
    let error = service
        .start_push(StartPushRequest {
            stream_id: StreamId::random(),
            destination: destination("rtmp://dest/a"),
        })
        .await
        .expect_err("unknown stream");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn stop_push_without_active_push_is_not_found() {
    let stream = hosted_stream("ext-1");
    let mut streams = MockStreamRepository::new();
    expect_stream_lookup(&mut streams, &stream);
    let mut pushes = MockPushRepository::new();
    pushes
        .expect_find_active_for_stream()
        .times(1)
        .return_once(|_| Ok(None));
    pushes.expect_mark_inactive().times(0);
    let mut media_server = MockMediaServerClient::new();
    media_server.expect_stop_push().times(0);

    let service = make_service(streams, pushes, media_server);
    let error = service
        .stop_push(StopPushRequest {
            stream_id: stream.id(),
        })
        .await
        .expect_err("nothing to stop");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case::marked_by_store(true)]
#[case::vanished_from_store(false)]
#[tokio::test]
async fn stop_push_stops_remotely_and_marks_inactive(#[case] store_returns_record: bool) {
    let stream = hosted_stream("ext-1");
    let active = active_push(&stream, "rtmp://dest/a");
    let active_id = active.id();
    let retired = inactive_copy(&active);

    let mut streams = MockStreamRepository::new();
    expect_stream_lookup(&mut streams, &stream);
    let mut pushes = MockPushRepository::new();
    pushes
        .expect_find_active_for_stream()
        .times(1)
        .return_once(move |_| Ok(Some(active)));
    pushes
        .expect_mark_inactive()
        .withf(move |push_id, at| *push_id == active_id && *at == fixture_timestamp())
        .times(1)
        .return_once(move |_, _| Ok(store_returns_record.then_some(retired)));
    let mut media_server = MockMediaServerClient::new();
    media_server
        .expect_stop_push()
        .withf(move |node, push_id| node == NODE && *push_id == active_id)
        .times(1)
        .return_once(|_, _| Ok(()));

    let service = make_service(streams, pushes, media_server);
    let response = service
        .stop_push(StopPushRequest {
            stream_id: stream.id(),
        })
        .await
        .expect("push stopped");

    assert_eq!(response.push.id, active_id);
    assert_eq!(response.push.status, PushStatus::Inactive);
}

#[rstest]
#[tokio::test]
async fn stop_push_keeps_record_active_when_remote_stop_fails() {
    let stream = hosted_stream("ext-1");
    let active = active_push(&stream, "rtmp://dest/a");

    let mut streams = MockStreamRepository::new();
    expect_stream_lookup(&mut streams, &stream);
    let mut pushes = MockPushRepository::new();
    pushes
        .expect_find_active_for_stream()
        .times(1)
        .return_once(move |_| Ok(Some(active)));
    pushes.expect_mark_inactive().times(0);
    let mut media_server = MockMediaServerClient::new();
    media_server
        .expect_stop_push()
        .times(1)
        .return_once(|_, _| Err(MediaServerError::transport("connection refused")));

    let service = make_service(streams, pushes, media_server);
    let error = service
        .stop_push(StopPushRequest {
            stream_id: stream.id(),
        })
        .await
        .expect_err("remote failure propagates");

    assert_eq!(error.code(), ErrorCode::RemoteCommandFailed);
}

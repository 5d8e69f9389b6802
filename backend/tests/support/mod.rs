//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`. This
//! module holds a scripted media server fake and an app builder that wires it
//! to the in-memory lifecycle store.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test as actix_test, web};
use async_trait::async_trait;
use mockable::DefaultClock;
use serde_json::Value;

use stream_relay::domain::IngestEndpoint;
use stream_relay::domain::PushId;
use stream_relay::domain::ports::{MediaServerClient, MediaServerError, StartPushCommand};
use stream_relay::inbound::http::health::HealthState;
use stream_relay::outbound::memory::InMemoryLifecycleStore;
use stream_relay::server::{build_app, lifecycle_http_state};

pub const INGEST_BASE_URL: &str = "https://media.example.test";
pub const NODE: &str = "10.0.0.5";

/// One command observed by the fake media server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    StartPush {
        node: String,
        stream_name: String,
        url: String,
        push_id: String,
    },
    StopPush {
        node: String,
        push_id: String,
    },
    DeleteStream {
        node: String,
        stream_name: String,
    },
}

/// Media server fake that records commands and replays scripted failures.
#[derive(Debug, Clone, Default)]
pub struct RecordingMediaServer {
    calls: Arc<Mutex<Vec<RemoteCall>>>,
    start_failures: Arc<Mutex<VecDeque<MediaServerError>>>,
}

impl RecordingMediaServer {
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Fail the next `startPush` with `error`.
    pub fn fail_next_start(&self, error: MediaServerError) {
        self.start_failures
            .lock()
            .expect("failures lock")
            .push_back(error);
    }

    fn record(&self, call: RemoteCall) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait]
impl MediaServerClient for RecordingMediaServer {
    async fn start_push(&self, command: &StartPushCommand) -> Result<(), MediaServerError> {
        if let Some(error) = self
            .start_failures
            .lock()
            .expect("failures lock")
            .pop_front()
        {
            return Err(error);
        }
        self.record(RemoteCall::StartPush {
            node: command.node_address.clone(),
            stream_name: command.stream_name.clone(),
            url: command.destination.as_str().to_owned(),
            push_id: command.push_id.to_string(),
        });
        Ok(())
    }

    async fn stop_push(
        &self,
        node_address: &str,
        push_id: &PushId,
    ) -> Result<(), MediaServerError> {
        self.record(RemoteCall::StopPush {
            node: node_address.to_owned(),
            push_id: push_id.to_string(),
        });
        Ok(())
    }

    async fn delete_stream(
        &self,
        stream_name: &str,
        node_address: &str,
    ) -> Result<(), MediaServerError> {
        self.record(RemoteCall::DeleteStream {
            node: node_address.to_owned(),
            stream_name: stream_name.to_owned(),
        });
        Ok(())
    }
}

/// Build the full application over a fresh in-memory store.
pub fn relay_app(
    media_server: RecordingMediaServer,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let store = Arc::new(InMemoryLifecycleStore::new());
    let http_state = lifecycle_http_state(
        Arc::clone(&store),
        store,
        Arc::new(media_server),
        Arc::new(DefaultClock),
        IngestEndpoint::new(INGEST_BASE_URL, "app"),
    );
    let health_state = web::Data::new(HealthState::new());
    health_state.mark_ready();
    build_app(health_state, web::Data::new(http_state))
}

/// Read a JSON response body.
pub async fn json_body(response: ServiceResponse) -> Value {
    let bytes = actix_test::read_body(response).await;
    serde_json::from_slice(&bytes).expect("json body")
}

/// Admission webhook body for a status report about `stream_id`.
pub fn webhook_body(stream_id: &str, status: &str) -> Value {
    serde_json::json!({
        "client": { "address": "203.0.113.7", "port": 50123 },
        "request": {
            "direction": "incoming",
            "protocol": "whip",
            "status": status,
            "url": format!("http://{NODE}:3333/app/{stream_id}?direction=whip"),
            "time": "2026-03-01T09:30:00.000Z"
        }
    })
}

//! Reqwest-backed media server control client.
//!
//! This adapter owns transport details only: node URL construction, basic
//! authentication, timeout and HTTP error mapping. Every command addresses the
//! node named by the caller; there is no fixed base URL.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use tracing::debug;

use super::dto::{ControlResponseDto, StartPushBodyDto, StopPushBodyDto};
use crate::domain::PushId;
use crate::domain::ports::{MediaServerClient, MediaServerError, StartPushCommand};

const DEFAULT_SCHEME: &str = "http";
const DEFAULT_PORT: u16 = 8081;
const DEFAULT_VHOST: &str = "default";
const DEFAULT_APPLICATION: &str = "app";
const DEFAULT_PUSH_STREAM_SUFFIX: &str = "_rtmp";
const DEFAULT_ACCESS_TOKEN: &str = "ome-access-token";

/// Addressing and credentials shared by every media server node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaServerApiConfig {
    /// Scheme of the control API.
    pub scheme: String,
    /// Port the control API listens on.
    pub port: u16,
    pub vhost: String,
    pub application: String,
    /// Appended to the stream name when starting a push.
    pub push_stream_suffix: String,
    /// Raw token; sent base64-encoded as HTTP basic credentials.
    pub access_token: String,
}

impl Default for MediaServerApiConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_owned(),
            port: DEFAULT_PORT,
            vhost: DEFAULT_VHOST.to_owned(),
            application: DEFAULT_APPLICATION.to_owned(),
            push_stream_suffix: DEFAULT_PUSH_STREAM_SUFFIX.to_owned(),
            access_token: DEFAULT_ACCESS_TOKEN.to_owned(),
        }
    }
}

/// Media server client issuing control commands over HTTP.
pub struct OmeHttpClient {
    client: Client,
    config: MediaServerApiConfig,
    authorization: String,
}

impl OmeHttpClient {
    /// Build a client with an explicit per-request timeout.
    /// ```rust,ignore
    /// let client = OmeHttpClient::new(MediaServerApiConfig::default(), timeout);
    /// assert!(client.is_ok() || client.is_err());
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: MediaServerApiConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        let authorization = basic_authorization(&config.access_token);
        Ok(Self {
            client,
            config,
            authorization,
        })
    }

    fn node_url(&self, node_address: &str) -> Result<Url, MediaServerError> {
        let node = node_address.trim();
        if node.is_empty() {
            return Err(MediaServerError::invalid_request(
                "node address must not be empty",
            ));
        }
        let raw = format!(
            "{}://{}:{}/",
            self.config.scheme,
            url_host(node),
            self.config.port
        );
        Url::parse(&raw).map_err(|error| {
            MediaServerError::invalid_request(format!("invalid node address {node}: {error}"))
        })
    }

    /// `{node}/v1/vhosts/{vhost}/apps/{app}:{action}`
    fn action_url(&self, node_address: &str, action: &str) -> Result<Url, MediaServerError> {
        let mut url = self.node_url(node_address)?;
        let app_action = format!("{}:{action}", self.config.application);
        extend_path(
            &mut url,
            &[
                "v1",
                "vhosts",
                self.config.vhost.as_str(),
                "apps",
                app_action.as_str(),
            ],
        )?;
        Ok(url)
    }

    /// `{node}/v1/vhosts/{vhost}/apps/{app}/streams/{name}`
    fn stream_url(&self, node_address: &str, stream_name: &str) -> Result<Url, MediaServerError> {
        let mut url = self.node_url(node_address)?;
        extend_path(
            &mut url,
            &[
                "v1",
                "vhosts",
                self.config.vhost.as_str(),
                "apps",
                self.config.application.as_str(),
                "streams",
                stream_name,
            ],
        )?;
        Ok(url)
    }

    fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(reqwest::header::AUTHORIZATION, self.authorization.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>, MediaServerError> {
        let response = self
            .authorised(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl MediaServerClient for OmeHttpClient {
    async fn start_push(&self, command: &StartPushCommand) -> Result<(), MediaServerError> {
        let url = self.action_url(&command.node_address, "startPush")?;
        let body = StartPushBodyDto::from_command(command, &self.config.push_stream_suffix);
        let response = self.execute(self.client.post(url).json(&body)).await?;
        let decoded = ControlResponseDto::decode_lenient(&response);
        debug!(
            push_id = %command.push_id,
            node = command.node_address.as_str(),
            status_code = decoded.status_code,
            message = decoded.message.as_deref().unwrap_or_default(),
            state = decoded.push_state().unwrap_or("unknown"),
            "media server accepted push"
        );
        Ok(())
    }

    async fn stop_push(
        &self,
        node_address: &str,
        push_id: &PushId,
    ) -> Result<(), MediaServerError> {
        let url = self.action_url(node_address, "stopPush")?;
        let body = StopPushBodyDto {
            id: push_id.to_string(),
        };
        self.execute(self.client.post(url).json(&body)).await?;
        debug!(push_id = %push_id, node = node_address, "media server stopped push");
        Ok(())
    }

    async fn delete_stream(
        &self,
        stream_name: &str,
        node_address: &str,
    ) -> Result<(), MediaServerError> {
        let url = self.stream_url(node_address, stream_name)?;
        let outcome = self.execute(self.client.delete(url)).await.map(|_| ());
        delete_outcome(outcome)?;
        debug!(stream = stream_name, node = node_address, "media server stream gone");
        Ok(())
    }
}

/// A stream the node no longer has counts as deleted.
fn delete_outcome(outcome: Result<(), MediaServerError>) -> Result<(), MediaServerError> {
    match outcome {
        Err(error) if error.is_not_found() => Ok(()),
        other => other,
    }
}

/// IPv6 literals need brackets inside a URL authority.
fn url_host(node: &str) -> String {
    let unbracketed = node.trim_start_matches('[').trim_end_matches(']');
    match unbracketed.parse::<IpAddr>() {
        Ok(IpAddr::V6(address)) => format!("[{address}]"),
        _ => node.to_owned(),
    }
}

fn basic_authorization(access_token: &str) -> String {
    format!("Basic {}", STANDARD.encode(access_token))
}

fn extend_path(url: &mut Url, segments: &[&str]) -> Result<(), MediaServerError> {
    url.path_segments_mut()
        .map_err(|()| MediaServerError::invalid_request("node url cannot carry a path"))?
        .pop_if_empty()
        .extend(segments);
    Ok(())
}

fn map_transport_error(error: reqwest::Error) -> MediaServerError {
    if error.is_timeout() {
        MediaServerError::timeout(error.to_string())
    } else {
        MediaServerError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> MediaServerError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::NOT_FOUND => MediaServerError::not_found(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            MediaServerError::timeout(message)
        }
        _ if status.is_client_error() => MediaServerError::rejected(message),
        _ => MediaServerError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

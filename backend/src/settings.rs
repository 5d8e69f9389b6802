//! Runtime configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `STREAM_RELAY_*` environment variables, or a
//! configuration file. Every field is optional; accessors supply defaults.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::IngestEndpoint;
use crate::outbound::media_server::MediaServerApiConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_INGEST_BASE_URL: &str = "http://localhost:3333";
const DEFAULT_INGEST_APPLICATION: &str = "app";
const DEFAULT_DB_POOL_SIZE: u32 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Settings for the stream relay service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STREAM_RELAY")]
pub struct RelaySettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    pub db_pool_size: Option<u32>,
    /// Public base URL publishers send WHIP media to.
    pub ingest_base_url: Option<String>,
    pub ingest_application: Option<String>,
    /// `http` or `https` for the media server control API.
    pub media_server_scheme: Option<String>,
    pub media_server_port: Option<u16>,
    pub media_server_vhost: Option<String>,
    pub media_server_application: Option<String>,
    /// Suffix appended to stream names when republishing.
    pub push_stream_suffix: Option<String>,
    pub media_server_access_token: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// Reasons the settings cannot be turned into runtime values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

impl RelaySettings {
    /// Parsed bind address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim()
            .parse()
            .map_err(|source| SettingsError::BindAddr {
                value: raw.to_owned(),
                source,
            })
    }

    /// Database URL when one is configured and non-blank.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size.unwrap_or(DEFAULT_DB_POOL_SIZE)
    }

    /// Where newly created streams are told to publish.
    pub fn ingest_endpoint(&self) -> IngestEndpoint {
        IngestEndpoint::new(
            self.ingest_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_INGEST_BASE_URL.to_owned()),
            self.ingest_application
                .clone()
                .unwrap_or_else(|| DEFAULT_INGEST_APPLICATION.to_owned()),
        )
    }

    /// Control API settings, overlaying configured values on the defaults.
    pub fn media_server(&self) -> MediaServerApiConfig {
        let defaults = MediaServerApiConfig::default();
        MediaServerApiConfig {
            scheme: self.media_server_scheme.clone().unwrap_or(defaults.scheme),
            port: self.media_server_port.unwrap_or(defaults.port),
            vhost: self.media_server_vhost.clone().unwrap_or(defaults.vhost),
            application: self
                .media_server_application
                .clone()
                .unwrap_or(defaults.application),
            push_stream_suffix: self
                .push_stream_suffix
                .clone()
                .unwrap_or(defaults.push_stream_suffix),
            access_token: self
                .media_server_access_token
                .clone()
                .unwrap_or(defaults.access_token),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for relay settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 12] = [
        "STREAM_RELAY_BIND_ADDR",
        "STREAM_RELAY_DATABASE_URL",
        "STREAM_RELAY_DB_POOL_SIZE",
        "STREAM_RELAY_INGEST_BASE_URL",
        "STREAM_RELAY_INGEST_APPLICATION",
        "STREAM_RELAY_MEDIA_SERVER_SCHEME",
        "STREAM_RELAY_MEDIA_SERVER_PORT",
        "STREAM_RELAY_MEDIA_SERVER_VHOST",
        "STREAM_RELAY_MEDIA_SERVER_APPLICATION",
        "STREAM_RELAY_PUSH_STREAM_SUFFIX",
        "STREAM_RELAY_MEDIA_SERVER_ACCESS_TOKEN",
        "STREAM_RELAY_REQUEST_TIMEOUT_SECS",
    ];

    fn cleared_env() -> Vec<(&'static str, Option<String>)> {
        VARS.iter().map(|name| (*name, None::<String>)).collect()
    }

    fn load_from_empty_args() -> RelaySettings {
        RelaySettings::load_from_iter([OsString::from("stream-relay")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_configured() {
        let _guard = lock_env(cleared_env());

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("default bind address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("socket address")
        );
        assert!(settings.database_url().is_none());
        assert_eq!(settings.db_pool_size(), 10);
        assert_eq!(settings.media_server(), MediaServerApiConfig::default());
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(
            settings.ingest_endpoint(),
            IngestEndpoint::new("http://localhost:3333", "app")
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let mut vars = cleared_env();
        vars.extend([
            ("STREAM_RELAY_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "STREAM_RELAY_DATABASE_URL",
                Some("postgres://relay@db/relay".to_owned()),
            ),
            ("STREAM_RELAY_MEDIA_SERVER_PORT", Some("9081".to_owned())),
            ("STREAM_RELAY_PUSH_STREAM_SUFFIX", Some("_out".to_owned())),
            ("STREAM_RELAY_REQUEST_TIMEOUT_SECS", Some("3".to_owned())),
        ]);
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("bind address").port(),
            9000
        );
        assert_eq!(settings.database_url(), Some("postgres://relay@db/relay"));
        let media_server = settings.media_server();
        assert_eq!(media_server.port, 9081);
        assert_eq!(media_server.push_stream_suffix, "_out");
        assert_eq!(media_server.vhost, "default");
        assert_eq!(settings.request_timeout(), Duration::from_secs(3));
    }

    #[rstest]
    #[case::blank(Some("   "), None)]
    #[case::present(Some(" postgres://db "), Some("postgres://db"))]
    #[case::absent(None, None)]
    fn blank_database_urls_select_the_memory_store(
        #[case] raw: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let settings = RelaySettings {
            bind_addr: None,
            database_url: raw.map(str::to_owned),
            db_pool_size: None,
            ingest_base_url: None,
            ingest_application: None,
            media_server_scheme: None,
            media_server_port: None,
            media_server_vhost: None,
            media_server_application: None,
            push_stream_suffix: None,
            media_server_access_token: None,
            request_timeout_secs: None,
        };
        assert_eq!(settings.database_url(), expected);
    }

    #[rstest]
    fn malformed_bind_address_is_reported() {
        let settings = RelaySettings {
            bind_addr: Some("not-an-address".to_owned()),
            database_url: None,
            db_pool_size: None,
            ingest_base_url: None,
            ingest_application: None,
            media_server_scheme: None,
            media_server_port: None,
            media_server_vhost: None,
            media_server_application: None,
            push_stream_suffix: None,
            media_server_access_token: None,
            request_timeout_secs: None,
        };
        let error = settings.bind_addr().expect_err("rejected");
        assert!(error.to_string().contains("not-an-address"));
    }
}

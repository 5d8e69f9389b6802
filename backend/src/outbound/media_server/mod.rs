//! Media server outbound adapters.
//!
//! This module provides a reqwest implementation of the `MediaServerClient`
//! port against the OvenMediaEngine REST API.

mod dto;
mod http_client;

pub use http_client::{MediaServerApiConfig, OmeHttpClient};

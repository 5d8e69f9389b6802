//! HTTP inbound adapter exposing REST endpoints and the media server webhook.

pub mod error;
pub mod health;
pub mod pushes;
pub mod schemas;
pub mod state;
pub mod streams;
pub mod validation;
pub mod webhook;

pub use error::ApiResult;

//! # Catalogue Client Library
//!
//! Authenticated HTTP client for the content catalogue service. It keeps a bearer
//! token pair alive (login with an API key, refresh before expiry), wraps every
//! outbound call in a bounded retry loop with linear backoff, and decodes the
//! upstream's loosely typed JSON into strict types.
//!
//! Modules:
//! - `request` — request engine, call context and request preparation
//! - `auth` — credential state and the login/refresh protocol
//! - `resilience` — retry loop and status classification
//! - `parser` — token expiry inspection and tolerant value decoders
//! - `catalogue` — works, people and articles services
//! - `config` — client settings and YAML config for the CLI

pub mod auth;
pub mod catalogue;
pub mod client;
pub mod config;
pub mod error;
pub mod observability;
pub mod parser;
pub mod request;
pub mod resilience;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::client::CatalogueClient;
pub use crate::config::settings::ClientConfig;
pub use crate::error::ClientError;
pub use crate::parser::flexible::{FlexibleDate, FlexibleFloat};
pub use crate::request::context::CallContext;

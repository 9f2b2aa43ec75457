//! Catalogue domain services.
//!
//! Each service builds a URL under the catalogue base URL and hands it to the shared
//! [`RequestEngine`], which takes care of tokens, retries and decoding.

pub mod articles;
pub mod people;
pub mod types;
pub mod works;

use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::request::context::CallContext;
use crate::request::engine::{build_url, RequestEngine};
use crate::request::spec::Payload;

pub use articles::ArticleService;
pub use people::PeopleService;
pub use types::{Article, Person, Work};
pub use works::WorkService;

/// `GET {catalogue}/{resource}/{identifier}`
pub(crate) async fn fetch_one<T: DeserializeOwned>(
    engine: &RequestEngine,
    ctx: &CallContext,
    resource: &str,
    identifier: &str,
) -> Result<T, ClientError> {
    if identifier.is_empty() {
        return Err(ClientError::invalid_request(resource, "identifier cannot be empty"));
    }
    let url = build_url(engine.catalogue_base_url(), &[resource, identifier])?;
    engine
        .get::<T>(ctx, &url, Payload::Empty)
        .await?
        .ok_or(ClientError::EmptyResponse { url })
}

/// `GET {catalogue}/{resource}/batch?identifiers=a,b,c`
pub(crate) async fn fetch_batch<T: DeserializeOwned>(
    engine: &RequestEngine,
    ctx: &CallContext,
    resource: &str,
    identifiers: &[String],
) -> Result<Vec<T>, ClientError> {
    if identifiers.is_empty() {
        return Err(ClientError::invalid_request(resource, "identifiers cannot be empty"));
    }
    let url = build_url(engine.catalogue_base_url(), &[resource, "batch"])?;
    let params = Payload::params([("identifiers", identifiers.join(","))]);
    let items = engine.get::<Option<Vec<T>>>(ctx, &url, params).await?;
    Ok(items.flatten().unwrap_or_default())
}

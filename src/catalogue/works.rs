use crate::catalogue::types::Work;
use crate::catalogue::{fetch_batch, fetch_one};
use crate::error::ClientError;
use crate::request::context::CallContext;
use crate::request::engine::RequestEngine;
use crate::utils::constants::RESOURCE_WORKS;

#[derive(Debug, Clone)]
pub struct WorkService {
    engine: RequestEngine,
}

impl WorkService {
    pub fn new(engine: RequestEngine) -> Self {
        Self { engine }
    }

    /// Retrieves a work by its identifier.
    pub async fn get_by_identifier(
        &self,
        ctx: &CallContext,
        identifier: &str,
    ) -> Result<Work, ClientError> {
        fetch_one(&self.engine, ctx, RESOURCE_WORKS, identifier).await
    }

    /// Retrieves several works in one call.
    pub async fn get_by_identifiers(
        &self,
        ctx: &CallContext,
        identifiers: &[String],
    ) -> Result<Vec<Work>, ClientError> {
        fetch_batch(&self.engine, ctx, RESOURCE_WORKS, identifiers).await
    }
}

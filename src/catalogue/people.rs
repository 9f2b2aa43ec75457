use crate::catalogue::types::Person;
use crate::catalogue::{fetch_batch, fetch_one};
use crate::error::ClientError;
use crate::request::context::CallContext;
use crate::request::engine::RequestEngine;
use crate::utils::constants::RESOURCE_PEOPLE;

#[derive(Debug, Clone)]
pub struct PeopleService {
    engine: RequestEngine,
}

impl PeopleService {
    pub fn new(engine: RequestEngine) -> Self {
        Self { engine }
    }

    pub async fn get_by_identifier(
        &self,
        ctx: &CallContext,
        identifier: &str,
    ) -> Result<Person, ClientError> {
        fetch_one(&self.engine, ctx, RESOURCE_PEOPLE, identifier).await
    }

    pub async fn get_by_identifiers(
        &self,
        ctx: &CallContext,
        identifiers: &[String],
    ) -> Result<Vec<Person>, ClientError> {
        fetch_batch(&self.engine, ctx, RESOURCE_PEOPLE, identifiers).await
    }
}

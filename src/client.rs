use reqwest::Url;

use crate::catalogue::{ArticleService, PeopleService, WorkService};
use crate::config::settings::ClientConfig;
use crate::error::ClientError;
use crate::request::engine::RequestEngine;

/// Entry point: one instance owns one set of credentials.
#[derive(Debug, Clone)]
pub struct CatalogueClient {
    engine: RequestEngine,
    works: WorkService,
    people: PeopleService,
    articles: ArticleService,
}

impl CatalogueClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        for (name, url) in [
            ("IAM base URL", &config.iam_base_url),
            ("catalogue base URL", &config.catalogue_base_url),
        ] {
            Url::parse(url)
                .map_err(|e| ClientError::Configuration(format!("invalid {name} '{url}': {e}")))?;
        }
        Ok(Self::from_engine(RequestEngine::new(config)?))
    }

    pub fn from_engine(engine: RequestEngine) -> Self {
        Self {
            works: WorkService::new(engine.clone()),
            people: PeopleService::new(engine.clone()),
            articles: ArticleService::new(engine.clone()),
            engine,
        }
    }

    pub fn works(&self) -> &WorkService {
        &self.works
    }

    pub fn people(&self) -> &PeopleService {
        &self.people
    }

    pub fn articles(&self) -> &ArticleService {
        &self.articles
    }

    /// Raw engine, for endpoints the services do not cover.
    pub fn engine(&self) -> &RequestEngine {
        &self.engine
    }
}

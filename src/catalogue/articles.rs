use crate::catalogue::fetch_one;
use crate::catalogue::types::Article;
use crate::error::ClientError;
use crate::request::context::CallContext;
use crate::request::engine::RequestEngine;
use crate::utils::constants::RESOURCE_ARTICLES;

#[derive(Debug, Clone)]
pub struct ArticleService {
    engine: RequestEngine,
}

impl ArticleService {
    pub fn new(engine: RequestEngine) -> Self {
        Self { engine }
    }

    pub async fn get_by_identifier(
        &self,
        ctx: &CallContext,
        identifier: &str,
    ) -> Result<Article, ClientError> {
        fetch_one(&self.engine, ctx, RESOURCE_ARTICLES, identifier).await
    }
}

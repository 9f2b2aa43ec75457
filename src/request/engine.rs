use std::sync::Arc;

use http::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{Method, StatusCode};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tracing::debug;

use crate::auth::state::AuthStore;
use crate::config::settings::ClientConfig;
use crate::error::{CancelReason, ClientError};
use crate::observability::metrics::{
    get_metrics, OUTCOME_CANCELLED, OUTCOME_RETRY, OUTCOME_SUCCESS, OUTCOME_TERMINAL,
    OUTCOME_TRANSPORT,
};
use crate::request::context::CallContext;
use crate::request::spec::{Payload, PreparedRequest, RequestSpec};
use crate::resilience::retry::{classify_status, AttemptError, RetrySettings, StatusClass};

/// Body of a successful exchange.
#[derive(Debug)]
struct SuccessfulResponse {
    status: StatusCode,
    body: Vec<u8>,
}

/// Executes authenticated calls against the IAM and catalogue services.
///
/// Cloning is cheap; clones share the HTTP connection pool and the credentials.
#[derive(Debug, Clone)]
pub struct RequestEngine {
    pub(crate) client: Client,
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) auth: AuthStore,
    pub(crate) retry: RetrySettings,
}

impl RequestEngine {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        let retry = RetrySettings::new(config.max_retries, config.retry_delay);
        Self { client, config: Arc::new(config), auth: AuthStore::new(), retry }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn iam_base_url(&self) -> &str {
        &self.config.iam_base_url
    }

    pub fn catalogue_base_url(&self) -> &str {
        &self.config.catalogue_base_url
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        url: &str,
        params: Payload,
    ) -> Result<Option<T>, ClientError> {
        self.execute(ctx, RequestSpec::new(Method::GET, url).with_payload(params)).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        url: &str,
        params: Payload,
    ) -> Result<Option<T>, ClientError> {
        self.execute(ctx, RequestSpec::new(Method::DELETE, url).with_payload(params)).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        url: &str,
        body: Payload,
    ) -> Result<Option<T>, ClientError> {
        self.execute(ctx, RequestSpec::new(Method::POST, url).with_payload(body)).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        url: &str,
        body: Payload,
    ) -> Result<Option<T>, ClientError> {
        self.execute(ctx, RequestSpec::new(Method::PUT, url).with_payload(body)).await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        url: &str,
        body: Payload,
    ) -> Result<Option<T>, ClientError> {
        self.execute(ctx, RequestSpec::new(Method::PATCH, url).with_payload(body)).await
    }

    /// Runs one logical call and decodes the response into `T`.
    ///
    /// Returns `Ok(None)` for a 204 or an empty body. Nothing is decoded unless the
    /// exchange finished with a 2xx status.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        spec: RequestSpec,
    ) -> Result<Option<T>, ClientError> {
        let prepared = spec.prepare()?;
        if spec.requires_auth {
            self.ensure_authenticated(ctx).await?;
        }
        self.send_and_decode(ctx, &prepared, spec.requires_auth).await
    }

    /// Retry loop plus decoding, without the credential check.
    ///
    /// Token calls enter here so they can never loop back into `ensure_authenticated`.
    pub(crate) async fn send_and_decode<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        prepared: &PreparedRequest,
        authenticate: bool,
    ) -> Result<Option<T>, ClientError> {
        let metrics = get_metrics().await;
        let start = Instant::now();
        let result = self.execute_with_retry(ctx, prepared, authenticate).await;
        metrics
            .http_request_duration
            .with_label_values(&[prepared.method.as_str()])
            .observe(start.elapsed().as_secs_f64());

        let response = result?;
        if response.status == StatusCode::NO_CONTENT || response.body.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&response.body)
            .map(Some)
            .map_err(|source| ClientError::Decode { url: prepared.url.clone(), source })
    }

    async fn execute_with_retry(
        &self,
        ctx: &CallContext,
        prepared: &PreparedRequest,
        authenticate: bool,
    ) -> Result<SuccessfulResponse, ClientError> {
        let metrics = get_metrics().await;
        let method = prepared.method.as_str();

        self.retry
            .run_with_retry(ctx, &prepared.url, |attempt| async move {
                if attempt > 0 {
                    metrics.http_retries.with_label_values(&[method]).inc();
                }
                let outcome = self.attempt(ctx, prepared, authenticate, attempt).await;
                let label = match &outcome {
                    Ok(_) => OUTCOME_SUCCESS,
                    Err(e) => match &e.error {
                        ClientError::Cancelled { .. } => OUTCOME_CANCELLED,
                        ClientError::Transport { .. } => OUTCOME_TRANSPORT,
                        _ if e.retryable => OUTCOME_RETRY,
                        _ => OUTCOME_TERMINAL,
                    },
                };
                metrics.http_requests.with_label_values(&[method, label]).inc();
                outcome
            })
            .await
    }

    /// One HTTP exchange with a freshly built request.
    async fn attempt(
        &self,
        ctx: &CallContext,
        prepared: &PreparedRequest,
        authenticate: bool,
        attempt: u32,
    ) -> Result<SuccessfulResponse, AttemptError> {
        let url = prepared.url.as_str();
        let cancelled =
            |reason: CancelReason| AttemptError::terminal(ClientError::Cancelled { url: url.to_owned(), reason });

        let mut request = self
            .client
            .request(prepared.method.clone(), url)
            .header(USER_AGENT, self.config.user_agent.as_str());
        if let Some(body) = &prepared.body {
            request = request.header(CONTENT_TYPE, "application/json").body(body.clone());
        }
        if authenticate {
            if let Some(token) = self.auth.access_token().await {
                request = request.header(AUTHORIZATION, format!("Bearer {}", token));
            }
        }

        debug!(method = %prepared.method, url, attempt, "sending request");
        let transport_error =
            |source: reqwest::Error| AttemptError::retry(ClientError::Transport { url: url.to_owned(), source });

        let response = ctx.run(request.send()).await.map_err(cancelled)?.map_err(transport_error)?;
        let status = response.status();
        let body = ctx.run(response.bytes()).await.map_err(cancelled)?.map_err(transport_error)?;
        debug!(url, attempt, status = status.as_u16(), bytes = body.len(), "response received");

        let failure = || ClientError::HttpStatus {
            url: url.to_owned(),
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        };
        match classify_status(status) {
            StatusClass::Success => Ok(SuccessfulResponse { status, body: body.to_vec() }),
            StatusClass::Retry => Err(AttemptError::retry(failure())),
            StatusClass::Terminal => Err(AttemptError::terminal(failure())),
        }
    }
}

/// Joins a base URL and path segments, percent-encoding each segment.
pub fn build_url(base: &str, segments: &[&str]) -> Result<String, ClientError> {
    let mut url =
        Url::parse(base).map_err(|e| ClientError::invalid_request(base, format!("invalid URL: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::invalid_request(base, "URL cannot be a base"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.into())
}

/// Joins a base URL and a fixed path such as `/auth/login/key`.
pub fn join_path(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

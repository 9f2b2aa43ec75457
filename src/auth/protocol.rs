use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use crate::auth::state::{AuthAction, TokenPair};
use crate::error::{AuthStage, ClientError};
use crate::observability::metrics::{get_metrics, OUTCOME_SUCCESS, OUTCOME_TERMINAL};
use crate::request::context::CallContext;
use crate::request::engine::{join_path, RequestEngine};
use crate::request::spec::{Payload, RequestSpec};
use crate::utils::constants::{LOGIN_WITH_KEY_PATH, REFRESH_TOKEN_PATH};

impl RequestEngine {
    /// Makes sure a usable access token is installed before an authenticated call.
    ///
    /// A valid access token costs nothing. An expired one is refreshed while the refresh
    /// token lasts; when refreshing fails, or nothing is left to refresh, the API key is
    /// used to log in again. Concurrent callers may each fetch tokens.
    pub async fn ensure_authenticated(&self, ctx: &CallContext) -> Result<(), ClientError> {
        if !self.config.has_api_key() {
            return Err(ClientError::Configuration(
                "no API key provided for authentication".to_string(),
            ));
        }

        let margin = Duration::from_std(self.config.safety_margin).unwrap_or_else(|_| Duration::zero());
        let phase = self.auth.phase(Utc::now(), margin).await;
        let mut action = phase.action();
        debug!(?phase, ?action, "checked credentials");

        if action == AuthAction::Refresh {
            match self.refresh_tokens(ctx).await {
                Ok(pair) => {
                    self.install(pair).await;
                    return Ok(());
                }
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    warn!(error = %e, "token refresh failed, logging in again");
                    action = action.after_refresh_failure();
                }
            }
        }

        match action {
            AuthAction::Proceed => Ok(()),
            AuthAction::Refresh | AuthAction::Login => {
                let pair = self.login_with_api_key(ctx).await?;
                self.install(pair).await;
                Ok(())
            }
        }
    }

    /// `POST {iam}/auth/login/key` with the configured API key.
    pub async fn login_with_api_key(&self, ctx: &CallContext) -> Result<TokenPair, ClientError> {
        let url = join_path(self.iam_base_url(), LOGIN_WITH_KEY_PATH);
        let payload = Payload::params([("key", self.config.api_key.as_str())]);
        self.fetch_token_pair(ctx, AuthStage::Login, url, payload).await
    }

    /// `POST {iam}/auth/token/refresh` with the currently installed refresh token.
    pub async fn refresh_tokens(&self, ctx: &CallContext) -> Result<TokenPair, ClientError> {
        let url = join_path(self.iam_base_url(), REFRESH_TOKEN_PATH);
        let refresh_token = self.auth.refresh_token().await;
        let payload = Payload::params([("refreshToken", refresh_token)]);
        self.fetch_token_pair(ctx, AuthStage::Refresh, url, payload).await
    }

    // Token calls bypass ensure_authenticated and the Authorization header.
    async fn fetch_token_pair(
        &self,
        ctx: &CallContext,
        stage: AuthStage,
        url: String,
        payload: Payload,
    ) -> Result<TokenPair, ClientError> {
        let metrics = get_metrics().await;
        let prepared = RequestSpec::post(url.as_str())
            .with_payload(payload)
            .unauthenticated()
            .prepare()?;

        let result = match self.send_and_decode::<TokenPair>(ctx, &prepared, false).await {
            Ok(Some(pair)) => Ok(pair),
            Ok(None) => Err(ClientError::Authentication {
                stage,
                source: Box::new(ClientError::EmptyResponse { url }),
            }),
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => Err(ClientError::Authentication { stage, source: Box::new(e) }),
        };

        let outcome = if result.is_ok() { OUTCOME_SUCCESS } else { OUTCOME_TERMINAL };
        metrics.token_fetches.with_label_values(&[stage.as_str(), outcome]).inc();
        result
    }

    async fn install(&self, pair: TokenPair) {
        let state = self.auth.install(pair, Utc::now()).await;
        info!(
            access_expiry = ?state.access_expiry,
            refresh_expiry = ?state.refresh_expiry,
            "installed new token pair"
        );
    }
}

use std::collections::BTreeMap;

use http::Method;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

use crate::error::ClientError;

/// Data attached to a request. Where it lands depends on the method:
/// GET and DELETE carry it in the query string, everything else as a JSON body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    #[default]
    Empty,
    Params(BTreeMap<String, String>),
    Json(Value),
}

impl Payload {
    pub fn params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Params(params.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Struct-derived query parameters. The value must serialize to a flat object.
    pub fn query<Q: Serialize>(query: &Q) -> Result<Self, ClientError> {
        Self::json(query)
    }

    pub fn json<B: Serialize>(body: &B) -> Result<Self, ClientError> {
        serde_json::to_value(body)
            .map(Self::Json)
            .map_err(|e| ClientError::invalid_request("", format!("failed to encode payload: {e}")))
    }
}

/// One logical call: what to send and whether it needs a bearer token.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub payload: Payload,
    pub requires_auth: bool,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), payload: Payload::Empty, requires_auth: true }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Skips the bearer token and the authentication check. Token calls use this.
    pub fn unauthenticated(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    /// Resolves the payload into the final URL and an optional JSON body.
    pub fn prepare(&self) -> Result<PreparedRequest, ClientError> {
        Url::parse(&self.url)
            .map_err(|e| ClientError::invalid_request(&self.url, format!("invalid URL: {e}")))?;
        let carries_query = self.method == Method::GET || self.method == Method::DELETE;
        if carries_query {
            let url = match encode_query(&self.url, &self.payload)? {
                Some(query) => merge_query(&self.url, &query)?,
                None => self.url.clone(),
            };
            return Ok(PreparedRequest { method: self.method.clone(), url, body: None });
        }

        let body = match &self.payload {
            Payload::Empty => None,
            Payload::Json(Value::Null) => None,
            Payload::Params(params) => Some(serde_json::to_vec(params)),
            Payload::Json(value) => Some(serde_json::to_vec(value)),
        }
        .transpose()
        .map_err(|e| {
            ClientError::invalid_request(&self.url, format!("failed to marshal request body: {e}"))
        })?;

        Ok(PreparedRequest { method: self.method.clone(), url: self.url.clone(), body })
    }
}

/// Request ready to be sent, possibly several times.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Vec<u8>>,
}

fn encode_query(url: &str, payload: &Payload) -> Result<Option<String>, ClientError> {
    let encoded = match payload {
        Payload::Empty | Payload::Json(Value::Null) => return Ok(None),
        Payload::Params(params) => serde_urlencoded::to_string(params),
        Payload::Json(Value::Object(map)) => {
            let flat: BTreeMap<&str, String> = map
                .iter()
                .filter_map(|(k, v)| query_value(v).map(|v| (k.as_str(), v)))
                .collect();
            serde_urlencoded::to_string(flat)
        }
        Payload::Json(other) => {
            return Err(ClientError::invalid_request(
                url,
                format!("query payload must be an object, got {other}"),
            ))
        }
    }
    .map_err(|e| ClientError::invalid_request(url, format!("failed to encode query: {e}")))?;

    Ok(Some(encoded).filter(|q| !q.is_empty()))
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            Some(items.iter().filter_map(query_value).collect::<Vec<_>>().join(","))
        }
        other => Some(other.to_string()),
    }
}

/// Appends `query` to the URL, keeping any parameters already present.
pub fn merge_query(url: &str, query: &str) -> Result<String, ClientError> {
    let mut parsed =
        Url::parse(url).map_err(|e| ClientError::invalid_request(url, format!("invalid URL: {e}")))?;
    let merged = match parsed.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{query}"),
        _ => query.to_owned(),
    };
    parsed.set_query(Some(&merged));
    Ok(parsed.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Search {
        title: String,
        page: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        genre: Option<String>,
    }

    #[test]
    fn get_params_become_sorted_query() {
        let spec = RequestSpec::get("https://catalogue.test/works/batch")
            .with_payload(Payload::params([("identifiers", "a,b"), ("expand", "cast")]));
        let prepared = spec.prepare().unwrap();
        assert_eq!(
            prepared.url,
            "https://catalogue.test/works/batch?expand=cast&identifiers=a%2Cb"
        );
        assert!(prepared.body.is_none());
    }

    #[test]
    fn existing_query_is_preserved() {
        let spec = RequestSpec::new(Method::DELETE, "https://catalogue.test/works?force=true")
            .with_payload(Payload::params([("reason", "dup")]));
        assert_eq!(
            spec.prepare().unwrap().url,
            "https://catalogue.test/works?force=true&reason=dup"
        );
    }

    #[test]
    fn struct_query_is_flattened() {
        let payload = Payload::query(&Search { title: "Lionheart".into(), page: 2, genre: None })
            .unwrap();
        let prepared = RequestSpec::get("https://catalogue.test/works")
            .with_payload(payload)
            .prepare()
            .unwrap();
        assert_eq!(prepared.url, "https://catalogue.test/works?page=2&title=Lionheart");
    }

    #[test]
    fn empty_payload_leaves_url_alone() {
        let prepared = RequestSpec::get("https://catalogue.test/works/w1").prepare().unwrap();
        assert_eq!(prepared.url, "https://catalogue.test/works/w1");
    }

    #[test]
    fn post_payload_becomes_json_body() {
        let prepared = RequestSpec::post("https://iam.test/auth/login/key")
            .with_payload(Payload::json(&json!({"key": "secret"})).unwrap())
            .prepare()
            .unwrap();
        assert_eq!(prepared.url, "https://iam.test/auth/login/key");
        let body: Value = serde_json::from_slice(&prepared.body.unwrap()).unwrap();
        assert_eq!(body, json!({"key": "secret"}));

        let prepared = RequestSpec::post("https://iam.test/auth/token/refresh")
            .with_payload(Payload::params([("refreshToken", "r1")]))
            .prepare()
            .unwrap();
        let body: Value = serde_json::from_slice(&prepared.body.unwrap()).unwrap();
        assert_eq!(body, json!({"refreshToken": "r1"}));
    }

    #[test]
    fn post_without_payload_has_no_body() {
        let prepared = RequestSpec::post("https://iam.test/x").prepare().unwrap();
        assert!(prepared.body.is_none());
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = RequestSpec::get("not a url")
            .with_payload(Payload::params([("a", "b")]))
            .prepare()
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest { .. }));

        let err = RequestSpec::post("/auth/login/key").prepare().unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest { .. }));
    }
}

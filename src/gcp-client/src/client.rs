use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use common::SourceError;
use common::config::{Configuration, HttpConfig};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::credentials::{Credentials, TokenProvider};

/// Authenticated client for one Google Cloud project.
///
/// Implements [`common::source::SeriesSource`], [`common::source::LogSource`]
/// and [`common::source::TraceSource`].
pub struct GcpClient {
    project_id: String,
    http: reqwest::Client,
    monitoring_endpoint: String,
    logging_endpoint: String,
    trace_endpoint: String,
    tokens: TokenProvider,
}

impl GcpClient {
    /// Build the client and obtain a first access token, so bad credentials
    /// surface here rather than on the first query.
    pub async fn connect(
        project_id: impl Into<String>,
        config: &HttpConfig,
        credentials: Credentials,
    ) -> Result<Self, SourceError> {
        let project_id = project_id.into();
        if project_id.is_empty() {
            return Err(SourceError::Connection("project ID is empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("cloudpeek/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::Connection(format!("failed to create HTTP client: {e}")))?;

        let client = Self {
            project_id,
            http,
            monitoring_endpoint: endpoint(&config.monitoring_endpoint)?,
            logging_endpoint: endpoint(&config.logging_endpoint)?,
            trace_endpoint: endpoint(&config.trace_endpoint)?,
            tokens: TokenProvider::new(credentials),
        };

        client.tokens.token(&client.http).await?;
        log::debug!(
            "Connected to Google Cloud project {} ({})",
            client.project_id,
            client.monitoring_endpoint
        );

        Ok(client)
    }

    /// Resolve credentials from the configuration and connect.
    pub async fn from_config(config: &Configuration) -> Result<Self, SourceError> {
        let credentials = Credentials::from_project_config(&config.project)?;
        Self::connect(config.project.id.clone(), &config.http, credentials).await
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub(crate) fn project_resource(&self) -> String {
        format!("projects/{}", self.project_id)
    }

    pub(crate) fn monitoring_url(&self, path: &str) -> String {
        format!("{}/v3/{}/{path}", self.monitoring_endpoint, self.project_resource())
    }

    pub(crate) fn logging_url(&self, path: &str) -> String {
        format!("{}/v2/{path}", self.logging_endpoint)
    }

    pub(crate) fn trace_url(&self, path: &str) -> String {
        format!("{}/v1/{}/{path}", self.trace_endpoint, self.project_resource())
    }

    /// Send a GET request with query parameters and deserialize the response
    pub(crate) async fn get<Q: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        query: &Q,
    ) -> Result<T, SourceError> {
        let token = self.tokens.token(&self.http).await?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;
        handle_response(resp).await
    }

    /// Send a POST request with a JSON body and deserialize the response
    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, SourceError> {
        let token = self.tokens.token(&self.http).await?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        handle_response(resp).await
    }
}

fn endpoint(url: &str) -> Result<String, SourceError> {
    reqwest::Url::parse(url)
        .map_err(|e| SourceError::Connection(format!("invalid endpoint '{url}': {e}")))?;
    Ok(url.trim_end_matches('/').to_string())
}

pub(crate) fn transport_error(e: reqwest::Error) -> SourceError {
    if e.is_decode() {
        SourceError::Decode(e.to_string())
    } else if e.is_builder() {
        SourceError::Connection(e.to_string())
    } else {
        SourceError::TransientNetwork(e.to_string())
    }
}

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, SourceError> {
    let status = resp.status();
    let body = resp.text().await.map_err(transport_error)?;

    if status.is_success() {
        serde_json::from_str(&body).map_err(|e| SourceError::Decode(e.to_string()))
    } else {
        let message = gcp_api::ErrorBody::parse(&body)
            .map(|e| e.error.message)
            .filter(|m| !m.is_empty())
            .unwrap_or(body);
        Err(SourceError::from_status(status.as_u16(), message))
    }
}

/// Double-quote a value for use in a Monitoring or Logging filter.
pub(crate) fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Start of a lookback window ending at `now`, clamped to the earliest
/// representable instant.
pub(crate) fn since(now: DateTime<Utc>, lookback: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(lookback)
        .ok()
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub(crate) fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    Client, Response, StatusCode, Url,
    header::{HeaderMap, HeaderValue},
};
use thiserror::Error;
use tracing::{debug, info, warn};
use vinscan_model::{
    AddVinRequest, AddVinResponse, ApiErrorBody, CheckVinResponse, FatalError,
    HealthResponse, LookupOutcome, VerificationRecord,
};

use super::LookupClient;
use crate::error::ApiError;

/// Header carrying the shared credential.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Default per-call deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for [`HttpLookupClient`].
#[derive(Clone)]
pub struct HttpLookupConfig {
    /// Store root. A missing scheme defaults to `http://`.
    pub base_url: String,
    /// Sent as [`API_KEY_HEADER`] on every request.
    pub api_key: String,
    /// Deadline for a whole request, connect to last byte.
    pub timeout: Duration,
}

impl std::fmt::Debug for HttpLookupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpLookupConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Why an [`HttpLookupClient`] could not be built.
#[derive(Error, Debug)]
pub enum ClientBuildError {
    #[error("invalid base URL {url:?}: {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("API key contains characters that cannot be sent in a header")]
    InvalidApiKey,

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Record-store client speaking the `check_vin` / `add_vin` JSON API.
///
/// Owns one connection pool for its lifetime; clone it instead of building
/// a second one.
#[derive(Debug, Clone)]
pub struct HttpLookupClient {
    client: Client,
    base_url: Url,
}

impl HttpLookupClient {
    pub fn new(config: HttpLookupConfig) -> Result<Self, ClientBuildError> {
        let base_url = normalize_base_url(&config.base_url)?;

        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| ClientBuildError::InvalidApiKey)?;
        api_key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        info!(base_url = %base_url, timeout_ms = config.timeout.as_millis() as u64, "record store client ready");

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Url {
        // `base_url` always ends with '/', and `path` never starts with one.
        self.base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone())
    }

    /// Enroll or refresh a VIN. Repeating the call overwrites description and
    /// timestamp.
    pub async fn upsert(
        &self,
        code: &str,
        description: &str,
    ) -> Result<AddVinResponse, ApiError> {
        let body = AddVinRequest {
            vin_value: code.to_string(),
            description: description.to_string(),
        };
        let response = self
            .client
            .post(self.endpoint("api/add_vin"))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
        {
            return Err(ApiError::Unauthorized);
        }
        Err(ApiError::Api {
            status: status.as_u16(),
            message: error_detail(response).await,
        })
    }

    /// Call the store's health route.
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let response = self.client.get(self.endpoint("")).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        Err(ApiError::Api {
            status: status.as_u16(),
            message: error_detail(response).await,
        })
    }
}

#[async_trait]
impl LookupClient for HttpLookupClient {
    async fn lookup(&self, code: &str) -> LookupOutcome {
        let request = self
            .client
            .get(self.endpoint("api/check_vin"))
            .query(&[("vin", code)]);

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return classify_transport_error(err),
        };

        let status = response.status();
        if !status.is_success() {
            return classify_status(status, response).await;
        }

        match response.json::<CheckVinResponse>().await {
            Ok(body) => outcome_from_body(code, body),
            Err(err) if err.is_timeout() => {
                LookupOutcome::TransientError(format!("timed out reading response: {err}"))
            }
            Err(err) => LookupOutcome::FatalError(FatalError::Protocol(
                format!("invalid check_vin body: {err}"),
            )),
        }
    }
}

fn normalize_base_url(raw: &str) -> Result<Url, ClientBuildError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ClientBuildError::BaseUrl {
            url: raw.to_string(),
            reason: "empty".to_string(),
        });
    }

    let with_scheme =
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };
    if with_scheme != raw {
        debug!(from = raw, to = %with_scheme, "normalized record store URL");
    }

    Url::parse(&format!("{with_scheme}/")).map_err(|err| {
        ClientBuildError::BaseUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        }
    })
}

fn classify_transport_error(err: reqwest::Error) -> LookupOutcome {
    if err.is_builder() {
        return LookupOutcome::FatalError(FatalError::Protocol(format!(
            "could not build request: {err}"
        )));
    }
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connect"
    } else {
        "transport"
    };
    debug!(kind, error = %err, "record store unreachable");
    LookupOutcome::TransientError(format!("{kind} error: {err}"))
}

async fn classify_status(status: StatusCode, response: Response) -> LookupOutcome {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            warn!(status = status.as_u16(), "record store rejected the API key");
            LookupOutcome::FatalError(FatalError::Unauthorized)
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            LookupOutcome::TransientError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_detail(response).await
            ))
        }
        s if s.is_server_error() => LookupOutcome::TransientError(format!(
            "HTTP {}: {}",
            s.as_u16(),
            error_detail(response).await
        )),
        s => LookupOutcome::FatalError(FatalError::Rejected {
            status: s.as_u16(),
            detail: error_detail(response).await,
        }),
    }
}

fn outcome_from_body(code: &str, body: CheckVinResponse) -> LookupOutcome {
    if !body.found {
        return LookupOutcome::NotFound;
    }

    let recorded_at = body.parsed_scan_date().unwrap_or_else(|| {
        warn!(code, scan_date = ?body.scan_date, "record has no usable scan_date; using lookup time");
        Utc::now()
    });

    LookupOutcome::Found(VerificationRecord::new(
        code,
        body.description.unwrap_or_default(),
        recorded_at,
    ))
}

async fn error_detail(response: Response) -> String {
    let status = response.status();
    let text = match response.text().await {
        Ok(text) => text,
        Err(_) => return status.to_string(),
    };

    match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(ApiErrorBody {
            error,
            message: Some(message),
        }) => format!("{error}: {message}"),
        Ok(ApiErrorBody { error, .. }) => error,
        Err(_) if text.trim().is_empty() => status.to_string(),
        Err(_) => text.trim().chars().take(200).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_scheme_and_trailing_slash() {
        let url = normalize_base_url("localhost:5000/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/");
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let url = normalize_base_url("https://example.com/vins").unwrap();
        assert_eq!(
            url.join("api/check_vin").unwrap().as_str(),
            "https://example.com/vins/api/check_vin"
        );
    }

    #[test]
    fn empty_base_url_is_rejected() {
        assert!(matches!(
            normalize_base_url("  "),
            Err(ClientBuildError::BaseUrl { .. })
        ));
    }

    #[test]
    fn api_key_with_newline_is_rejected() {
        let err = HttpLookupClient::new(HttpLookupConfig {
            base_url: "http://localhost:5000".into(),
            api_key: "abc\n".into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        })
        .unwrap_err();
        assert!(matches!(err, ClientBuildError::InvalidApiKey));
    }

    #[test]
    fn found_body_without_date_still_resolves() {
        let outcome = outcome_from_body(
            "1HGCM82633A004352",
            CheckVinResponse {
                found: true,
                description: Some("Silver Accord".into()),
                scan_date: None,
            },
        );
        match outcome {
            LookupOutcome::Found(record) => {
                assert_eq!(record.code, "1HGCM82633A004352");
                assert_eq!(record.description, "Silver Accord");
            }
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn miss_body_is_not_found() {
        assert_eq!(
            outcome_from_body("1HGCM82633A004352", CheckVinResponse::missing()),
            LookupOutcome::NotFound
        );
    }
}

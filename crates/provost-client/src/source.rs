//! Async HTTP client wrapping the appointment backend's JSON API.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;

use crate::error::FetchError;

/// Connection settings for the appointment backend.
#[derive(Debug, Clone)]
pub struct SourceConfig {
  pub base_url: String,
  /// Backend token, sent as `Authorization: Token <token>`. Empty means
  /// anonymous.
  pub token:    String,
  /// Per-request timeout. Defaults to 30 seconds.
  pub timeout:  Duration,
}

impl SourceConfig {
  pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
      token:    token.into(),
      timeout:  Duration::from_secs(30),
    }
  }
}

/// Async HTTP client for one backend.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based. Every
/// failure mode maps to a [`FetchError`]; nothing panics and no raw
/// transport error crosses this boundary.
#[derive(Clone)]
pub struct SourceClient {
  client: Client,
  config: SourceConfig,
}

impl SourceClient {
  pub fn new(config: SourceConfig) -> Result<Self, FetchError> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| FetchError::Transport(e.to_string()))?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.config.token.is_empty() {
      req
    } else {
      req.header("Authorization", format!("Token {}", self.config.token))
    }
  }

  /// Issue one request and decode the JSON body. An empty body decodes
  /// to `null`, which some write endpoints answer with.
  pub async fn request(
    &self,
    method: Method,
    path: &str,
    body: Option<&Value>,
  ) -> Result<Value, FetchError> {
    let mut req = self.auth(self.client.request(method, self.url(path)));
    if let Some(body) = body {
      req = req.json(body);
    }
    let resp = req.send().await?;

    let status = resp.status();
    match status {
      StatusCode::UNAUTHORIZED => return Err(FetchError::Unauthorized),
      StatusCode::FORBIDDEN => return Err(FetchError::Forbidden),
      StatusCode::NOT_FOUND => return Err(FetchError::NotFound),
      s if !s.is_success() => {
        let message = resp.text().await.unwrap_or_default();
        return Err(FetchError::ServerError {
          status: s.as_u16(),
          message,
        });
      }
      _ => {}
    }

    let text = resp.text().await?;
    if text.trim().is_empty() {
      return Ok(Value::Null);
    }
    serde_json::from_str(&text)
      .map_err(|e| FetchError::Malformed(e.to_string()))
  }

  /// `GET` a collection endpoint and pull out its row array, whichever
  /// of the backend's two response shapes it uses.
  pub async fn get_rows(&self, path: &str) -> Result<Vec<Value>, FetchError> {
    let body = self.request(Method::GET, path, None).await?;
    Ok(provost_wire::extract_rows(&body))
  }
}

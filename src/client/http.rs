//! reqwest transport

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::{ApiRequest, Method, Transport};
use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};

/// Error body returned by the backend
#[derive(serde::Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Network transport carrying the session's bearer token
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn error_message(text: &str) -> String {
        serde_json::from_str::<ApiErrorResponse>(text)
            .ok()
            .and_then(|e| e.message.or(e.error))
            .unwrap_or_else(|| text.to_string())
    }

    async fn handle_response(response: reqwest::Response) -> AppResult<serde_json::Value> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = Self::error_message(&text);
            return Err(match status {
                StatusCode::UNAUTHORIZED => AppError::Unauthorized,
                StatusCode::FORBIDDEN => AppError::Forbidden(message),
                StatusCode::NOT_FOUND => AppError::NotFound(message),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    AppError::BadRequest(message)
                }
                _ => AppError::Server {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| AppError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> AppResult<serde_json::Value> {
        let url = self.url(&request.path);
        tracing::debug!("{} {}", request.method, url);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Request {} {} failed: {}", request.method, url, e);
            AppError::Network(e)
        })?;
        Self::handle_response(response).await
    }
}

//! HTTP Client
//!
//! Sends a single JSON request and returns the parsed JSON body. There is no
//! retry: any status other than 200 is reported with the raw response body,
//! and a body that cannot be read is a request error.

use crate::api::RequestPayload;
use crate::error::{IndraError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// HTTP transport with a fixed set of headers
pub struct HttpClient {
    /// Inner reqwest client
    client: Client,

    /// Headers sent with every request
    headers: HeaderMap,
}

impl HttpClient {
    /// Create a new HTTP client sending `headers` with every request
    pub fn new(headers: &[(&str, &str)]) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| IndraError::Request(format!("Failed to create HTTP client: {}", e)))?;

        let mut header_map = HeaderMap::new();
        for (key, value) in headers {
            let name = HeaderName::try_from(*key)
                .map_err(|e| IndraError::Config(format!("Invalid header name '{}': {}", key, e)))?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                IndraError::Config(format!("Invalid value for header '{}': {}", key, e))
            })?;
            header_map.insert(name, value);
        }

        Ok(Self {
            client,
            headers: header_map,
        })
    }

    /// Send `payload` (if any) as a JSON body with the given method
    pub async fn submit(
        &self,
        method: Method,
        url: &str,
        payload: Option<&RequestPayload>,
    ) -> Result<Value> {
        let mut request = self
            .client
            .request(method.clone(), url)
            .headers(self.headers.clone());

        match payload {
            None => tracing::debug!(url, %method, "indra request"),
            Some(payload) => {
                let body = serde_json::to_string(payload)?;
                tracing::debug!(url, %method, bytes = body.len(), "indra request");
                request = request.body(body);
            }
        }

        let response = request.send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            let body = response.text().await?;
            tracing::warn!(url, %status, bytes = body.len(), "indra request failed");
            return Err(IndraError::Service(body));
        }

        tracing::debug!(url, %status, "indra request succeeded");
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            IndraError::Response(format!(
                "Failed to parse response: {}. Body: {}",
                e,
                truncate(&body, 500)
            ))
        })
    }
}

/// Cut `s` to at most `max` bytes on a char boundary
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

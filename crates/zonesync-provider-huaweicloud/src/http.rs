//! Signed HTTP requests against the DNS endpoint
//!
//! Every call is sent exactly once. Non-2xx responses and transport errors
//! become `Error::ProviderRequest`.

use chrono::Utc;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use zonesync_core::{Error, Result};

use super::types::ErrorResponse;
use super::{HuaweiCloudProvider, PROVIDER_NAME};
use crate::sign::TIMESTAMP_FORMAT;

impl HuaweiCloudProvider {
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, query: &str) -> Result<T> {
        let body = self.execute(Method::GET, path, query, None).await?;
        parse_body(&body)
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let payload = serde_json::to_string(body)?;
        let body = self.execute(Method::POST, path, "", Some(payload)).await?;
        parse_body(&body)
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let payload = serde_json::to_string(body)?;
        let body = self.execute(Method::PUT, path, "", Some(payload)).await?;
        parse_body(&body)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::DELETE, path, "", None).await?;
        Ok(())
    }

    /// Sign and send one request, returning the response body of a 2xx
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &str,
        payload: Option<String>,
    ) -> Result<String> {
        let timestamp = Utc::now().format(TIMESTAMP_FORMAT).to_string();

        let mut headers = vec![("Host", self.host.as_str()), ("X-Sdk-Date", timestamp.as_str())];
        if payload.is_some() {
            headers.push(("Content-Type", "application/json"));
        }

        let authorization = self.sign(
            method.as_str(),
            path,
            query,
            &headers,
            payload.as_deref().unwrap_or_default(),
            &timestamp,
        )?;

        let url = if query.is_empty() {
            format!("{}{}", self.endpoint, path)
        } else {
            format!("{}{}?{}", self.endpoint, path, query)
        };
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), &url);
        for (name, value) in &headers {
            request = request.header(*name, *value);
        }
        request = request.header("Authorization", authorization);
        if let Some(payload) = payload {
            tracing::trace!("Request body: {}", payload);
            request = request.body(payload);
        }

        let response = request.send().await.map_err(|e| {
            Error::provider_request(
                PROVIDER_NAME,
                e.status().map(|s| s.as_u16()),
                format!("HTTP request failed: {}", e),
            )
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::provider_request(
                PROVIDER_NAME,
                Some(status.as_u16()),
                format!("Failed to read response body: {}", e),
            )
        })?;

        if !status.is_success() {
            tracing::debug!("{} {} failed with status {}: {}", method, url, status, body);
            return Err(error_from_body(status.as_u16(), &body));
        }

        Ok(body)
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        Error::provider_request(PROVIDER_NAME, None, format!("Failed to parse response: {}", e))
    })
}

/// Map a non-2xx response to a provider request error
pub(crate) fn error_from_body(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.describe())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                format!("HTTP {}: {}", status, body.trim())
            }
        });

    Error::provider_request(PROVIDER_NAME, Some(status), message)
}

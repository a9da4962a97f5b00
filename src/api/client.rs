// debook-core - DRM e-book container unpacking and viewing
// Copyright (C) 2025 debook contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! HTTP client for the key-issuing service
//!
//! # Endpoint
//! **POST** `<configured endpoint>`, e.g.
//! `https://keys.example.com/debook/api/v1/GetKey`
//!
//! One request per [`KeyExchange::fetch_key`] call, no retries. The core
//! applies no timeout of its own; operators impose one at this transport
//! boundary via [`KeyServiceConfig::with_timeout`].

use crate::api::key_exchange::{
    KeyExchange, KeyMaterial, KeyRequest, KeyServiceErrorReply, KeyServiceReply,
};
use crate::error::{DebookError, Result};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Configuration for [`KeyServiceClient`]
#[derive(Debug, Clone)]
pub struct KeyServiceConfig {
    /// Fully qualified URL of the key-issuing endpoint
    pub endpoint: Url,

    /// Optional request timeout applied to the underlying HTTP client
    pub timeout: Option<Duration>,
}

impl KeyServiceConfig {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Production [`KeyExchange`] implementation over HTTP
pub struct KeyServiceClient {
    http: reqwest::Client,
    config: KeyServiceConfig,
}

impl KeyServiceClient {
    /// Create a client with a long-lived connection pool
    ///
    /// # Errors
    /// `KeyServiceUnreachable` if the underlying HTTP client cannot be
    /// built (bad TLS backend state).
    pub fn new(config: KeyServiceConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| DebookError::KeyServiceUnreachable(e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn endpoint(&self) -> &Url {
        &self.config.endpoint
    }
}

#[async_trait]
impl KeyExchange for KeyServiceClient {
    /// Request the decryption secret for one license
    ///
    /// # Errors
    /// - `KeyServiceUnreachable` - network unreachable or timed out
    /// - `KeyServiceError` - non-success HTTP status; carries the
    ///   service's error field if present, otherwise the raw body
    /// - `KeyServiceMalformedResponse` - success status but the body is
    ///   not the expected shape
    async fn fetch_key(&self, license_public_key: &str, account_id: &str) -> Result<KeyMaterial> {
        let request = KeyRequest {
            license_public_key: license_public_key.to_string(),
            wallet: account_id.to_string(),
        };

        tracing::debug!(endpoint = %self.config.endpoint, license = license_public_key, "requesting secret key");

        let response = self
            .http
            .post(self.config.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| DebookError::KeyServiceUnreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DebookError::KeyServiceUnreachable(e.to_string()))?;

        if !status.is_success() {
            // Prefer the service's own error field when the body is JSON.
            let body = serde_json::from_str::<KeyServiceErrorReply>(&body)
                .map(|reply| reply.error)
                .unwrap_or(body);
            return Err(DebookError::KeyServiceError {
                status: status.as_u16(),
                body,
            });
        }

        let reply: KeyServiceReply = serde_json::from_str(&body)
            .map_err(|e| DebookError::KeyServiceMalformedResponse(e.to_string()))?;

        reply.secret_key.ok_or_else(|| {
            DebookError::KeyServiceMalformedResponse("response has no secretKey field".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let endpoint = Url::parse("http://localhost:3000/debook/api/v1/GetKey").unwrap();
        let config = KeyServiceConfig::new(endpoint.clone()).with_timeout(Duration::from_secs(10));

        assert_eq!(config.endpoint, endpoint);
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));

        let client = KeyServiceClient::new(config).unwrap();
        assert_eq!(client.endpoint().path(), "/debook/api/v1/GetKey");
    }

    #[test]
    fn test_error_reply_field_extraction() {
        let reply: KeyServiceErrorReply =
            serde_json::from_str(r#"{"error": "license not found"}"#).unwrap();
        assert_eq!(reply.error, "license not found");

        // Raw-text bodies are not JSON and fall back verbatim.
        assert!(serde_json::from_str::<KeyServiceErrorReply>("license not found").is_err());
    }
}

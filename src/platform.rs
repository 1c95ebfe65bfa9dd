// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Push agent integration: re-subscribing through the platform.
//!
//! The local push agent owns the actual push endpoint registration. When a
//! subscription has been invalidated, this service asks the agent for a
//! replacement carrying the prior subscription's options. The seam is a
//! trait so renewal handling can be exercised without a live agent.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::models::{RenewedSubscription, SubscriptionOptions};

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("push agent request failed: {0}")]
    Request(String),

    #[error("push agent response was invalid: {0}")]
    InvalidResponse(String),
}

/// The platform's subscription issuer.
#[async_trait]
pub trait PushPlatform: Send + Sync {
    /// Request a replacement subscription using the prior subscription's
    /// options.
    async fn resubscribe(
        &self,
        options: &SubscriptionOptions,
    ) -> Result<RenewedSubscription, PlatformError>;
}

/// HTTP client for the push agent's local API.
pub struct AgentClient {
    base_url: Url,
    http: Client,
}

impl AgentClient {
    pub fn new(base_url: Url) -> Result<Self, PlatformError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| PlatformError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { base_url, http })
    }
}

#[async_trait]
impl PushPlatform for AgentClient {
    async fn resubscribe(
        &self,
        options: &SubscriptionOptions,
    ) -> Result<RenewedSubscription, PlatformError> {
        let url = format!("{}/subscribe", self.base_url.as_str().trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .json(options)
            .send()
            .await
            .map_err(|e| PlatformError::Request(format!("POST /subscribe failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Request(format!(
                "POST /subscribe returned {status}: {body}"
            )));
        }

        response.json().await.map_err(|e| {
            PlatformError::InvalidResponse(format!("invalid subscription payload: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_options() -> SubscriptionOptions {
        SubscriptionOptions {
            user_visible_only: true,
            application_server_key: Some("BPk1".to_string()),
        }
    }

    fn agent_for(server: &MockServer) -> AgentClient {
        AgentClient::new(server.uri().parse().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn resubscribe_posts_options_and_parses_key_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/subscribe"))
            .and(body_json(serde_json::json!({
                "userVisibleOnly": true,
                "applicationServerKey": "BPk1",
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "endpoint": "https://push.example/ep1",
                "p256dh": [1, 2, 3],
                "auth": [4, 5],
            })))
            .mount(&server)
            .await;

        let agent = agent_for(&server);
        let renewed = agent.resubscribe(&sample_options()).await.unwrap();

        assert_eq!(renewed.endpoint, "https://push.example/ep1");
        assert_eq!(renewed.p256dh.as_deref(), Some(&[1u8, 2, 3][..]));
        assert_eq!(renewed.auth.as_deref(), Some(&[4u8, 5][..]));
    }

    #[tokio::test]
    async fn non_success_status_is_a_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/subscribe"))
            .respond_with(ResponseTemplate::new(503).set_body_string("agent offline"))
            .mount(&server)
            .await;

        let agent = agent_for(&server);
        let err = agent.resubscribe(&sample_options()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("503"), "unexpected error: {message}");
        assert!(message.contains("agent offline"), "unexpected error: {message}");
    }

    #[tokio::test]
    async fn malformed_payload_is_an_invalid_response_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/subscribe"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let agent = agent_for(&server);
        let err = agent.resubscribe(&sample_options()).await.unwrap_err();
        assert!(matches!(err, PlatformError::InvalidResponse(_)));
    }
}

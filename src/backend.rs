// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Supabase backend updater for renewed push subscriptions.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{error, info};

use crate::credentials::CredentialCache;
use crate::models::EncodedSubscription;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Request(String),

    #[error("backend rejected subscription: {0}")]
    Rejected(String),
}

/// Client for the backend's push subscription collection.
///
/// Authentication material is read from the platform credential cache on
/// every call; if either entry is absent the renewed subscription is
/// dropped without a network call.
pub struct BackendClient {
    cache: Arc<CredentialCache>,
    http: Client,
}

impl BackendClient {
    pub fn new(cache: Arc<CredentialCache>) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| BackendError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { cache, http })
    }

    /// Forward a renewed subscription to the backend.
    ///
    /// Issues exactly one POST; the `Prefer: resolution=merge-duplicates`
    /// header lets the backend upsert the row, so overlapping renewals
    /// resolve to last-write-wins. A non-2xx response surfaces as
    /// [`BackendError::Rejected`] carrying the status and body text.
    pub async fn push_renewed(
        &self,
        subscription: &EncodedSubscription,
    ) -> Result<(), BackendError> {
        let push_api_key = self.cache.api_key();
        let config = self.cache.backend_config();

        let (Some(push_api_key), Some(config)) = (push_api_key, config) else {
            error!("missing push API key or backend config, dropping renewed subscription");
            return Ok(());
        };

        let url = format!(
            "{}/rest/v1/push_subscriptions",
            config.supabase_url.trim_end_matches('/')
        );

        let response = self
            .http
            .post(&url)
            .header("apikey", &config.supabase_key)
            .header("x-push-api-key", &push_api_key)
            .header("Prefer", "resolution=merge-duplicates")
            .json(subscription)
            .send()
            .await
            .map_err(|e| BackendError::Request(format!("POST {url} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Rejected(format!("{status}: {body}")));
        }

        info!(endpoint = %subscription.endpoint, "subscription updated in backend");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{API_KEY_ENTRY, CACHE_FILE, SUPABASE_CONFIG_ENTRY};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_subscription() -> EncodedSubscription {
        EncodedSubscription {
            endpoint: "https://push.example/ep1".to_string(),
            p256dh: "AQID".to_string(),
            auth: "BAU=".to_string(),
        }
    }

    fn empty_cache(dir: &tempfile::TempDir) -> Arc<CredentialCache> {
        Arc::new(CredentialCache::open(&dir.path().join(CACHE_FILE)).unwrap())
    }

    fn seeded_cache(dir: &tempfile::TempDir, backend_url: &str) -> Arc<CredentialCache> {
        let cache = empty_cache(dir);
        cache
            .put_entry(API_KEY_ENTRY, r#"{"key":"abc123"}"#)
            .unwrap();
        cache
            .put_entry(
                SUPABASE_CONFIG_ENTRY,
                &format!(r#"{{"supabaseUrl":"{backend_url}","supabaseKey":"k"}}"#),
            )
            .unwrap();
        cache
    }

    #[tokio::test]
    async fn missing_credentials_make_no_network_call() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let client = BackendClient::new(empty_cache(&dir)).unwrap();

        client.push_renewed(&sample_subscription()).await.unwrap();

        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_api_key_alone_makes_no_network_call() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let cache = empty_cache(&dir);
        cache
            .put_entry(
                SUPABASE_CONFIG_ENTRY,
                &format!(r#"{{"supabaseUrl":"{}","supabaseKey":"k"}}"#, server.uri()),
            )
            .unwrap();
        let client = BackendClient::new(cache).unwrap();

        client.push_renewed(&sample_subscription()).await.unwrap();

        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn posts_subscription_with_auth_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/push_subscriptions"))
            .and(header("apikey", "k"))
            .and(header("x-push-api-key", "abc123"))
            .and(header("Prefer", "resolution=merge-duplicates"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(serde_json::json!({
                "endpoint": "https://push.example/ep1",
                "p256dh": "AQID",
                "auth": "BAU=",
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = BackendClient::new(seeded_cache(&dir, &server.uri())).unwrap();

        client.push_renewed(&sample_subscription()).await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_an_error_with_body_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/push_subscriptions"))
            .respond_with(ResponseTemplate::new(409).set_body_string("duplicate endpoint"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = BackendClient::new(seeded_cache(&dir, &server.uri())).unwrap();

        let err = client
            .push_renewed(&sample_subscription())
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("409"), "unexpected error: {message}");
        assert!(
            message.contains("duplicate endpoint"),
            "unexpected error: {message}"
        );
    }
}

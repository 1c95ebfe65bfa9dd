// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Subscription Renewal Handling
//!
//! Reacts to subscription-change notifications: re-subscribes through the
//! push agent, encodes the renewed key material, and forwards the result to
//! the backend.
//!
//! ## Strategy
//!
//! Renewal is best-effort. A renewed subscription without usable key
//! material is dropped with a log line, and any error out of the platform
//! or the backend is logged at the listener and swallowed; the platform
//! will re-deliver a change event if the subscription is still invalid.
//! There are no retries.
//!
//! ## Shutdown
//!
//! Each event is handled in its own task. On cancellation the listener
//! stops accepting events and waits for in-flight renewals to settle, so a
//! renewal caught mid-flight is never torn down halfway.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::backend::{BackendClient, BackendError};
use crate::encoding::encode_key;
use crate::models::{EncodedSubscription, SubscriptionChange};
use crate::platform::{PlatformError, PushPlatform};

#[derive(Debug, thiserror::Error)]
pub enum RenewalError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Handles one subscription-change notification end to end.
pub struct RenewalHandler {
    platform: Arc<dyn PushPlatform>,
    backend: Arc<BackendClient>,
}

impl RenewalHandler {
    pub fn new(platform: Arc<dyn PushPlatform>, backend: Arc<BackendClient>) -> Self {
        Self { platform, backend }
    }

    /// Re-subscribe and forward the renewed credentials to the backend.
    ///
    /// Missing key material aborts the renewal silently; platform and
    /// backend errors propagate to the caller.
    pub async fn handle_change(&self, change: SubscriptionChange) -> Result<(), RenewalError> {
        info!("push subscription changed");

        let renewed = self.platform.resubscribe(&change.options).await?;

        let (Some(p256dh), Some(auth)) = (renewed.p256dh.as_deref(), renewed.auth.as_deref())
        else {
            error!(endpoint = %renewed.endpoint, "renewed subscription is missing key material");
            return Ok(());
        };

        let encoded = EncodedSubscription {
            p256dh: encode_key(p256dh),
            auth: encode_key(auth),
            endpoint: renewed.endpoint.clone(),
        };

        self.backend.push_renewed(&encoded).await?;

        info!(endpoint = %encoded.endpoint, "push subscription renewed");
        Ok(())
    }
}

/// Drains the gateway channel, spawning one handling task per event.
pub struct RenewalListener {
    handler: Arc<RenewalHandler>,
}

impl RenewalListener {
    pub fn new(handler: RenewalHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Run until the cancellation token is triggered or the channel closes.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(listener.run(events_rx, shutdown.clone()));
    /// ```
    pub async fn run(
        self,
        mut events: mpsc::Receiver<SubscriptionChange>,
        shutdown: CancellationToken,
    ) {
        info!("subscription renewal listener starting");

        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                change = events.recv() => {
                    let Some(change) = change else {
                        info!("platform event channel closed");
                        break;
                    };
                    let handler = Arc::clone(&self.handler);
                    in_flight.spawn(async move {
                        if let Err(e) = handler.handle_change(change).await {
                            error!(error = %e, "error handling subscription change");
                        }
                    });
                }
                _ = shutdown.cancelled() => {
                    info!("subscription renewal listener shutting down");
                    break;
                }
            }
        }

        // Let in-flight renewals settle before teardown.
        while in_flight.join_next().await.is_some() {}
    }
}

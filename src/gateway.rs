// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Platform Event Gateway
//!
//! Intake for platform lifecycle events. The push agent connects to a Unix
//! socket owned by this service and writes one JSON event document per
//! line. Subscription-change events are forwarded to the renewal listener
//! over a channel; everything else is skipped.
//!
//! Malformed lines are logged and skipped rather than tearing the
//! connection down, so a single bad document cannot wedge the agent.

use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::models::{PlatformEvent, SubscriptionChange};

/// Unix-socket gateway for platform event delivery.
pub struct EventGateway {
    socket_path: PathBuf,
    listener: UnixListener,
}

impl EventGateway {
    /// Bind the event socket, replacing any stale socket file.
    ///
    /// The socket is owner-only: nothing but the push agent running under
    /// the same account should be able to inject events.
    pub fn bind(socket_path: PathBuf) -> std::io::Result<Self> {
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if socket_path.exists() {
            std::fs::remove_file(&socket_path)?;
        }

        let listener = UnixListener::bind(&socket_path)?;

        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&socket_path, perms)?;
        }

        Ok(Self {
            socket_path,
            listener,
        })
    }

    /// Accept agent connections until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(gateway.run(events_tx, shutdown.clone()));
    /// ```
    pub async fn run(self, events: mpsc::Sender<SubscriptionChange>, shutdown: CancellationToken) {
        info!(
            socket = %self.socket_path.display(),
            "platform event gateway listening"
        );

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, _addr)) => {
                            let events = events.clone();
                            tokio::spawn(read_events(stream, events));
                        }
                        Err(e) => {
                            warn!(error = %e, "failed to accept platform connection");
                        }
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("platform event gateway shutting down");
                    return;
                }
            }
        }
    }
}

/// Read newline-delimited event documents from one agent connection.
async fn read_events(stream: UnixStream, events: mpsc::Sender<SubscriptionChange>) {
    let mut lines = BufReader::new(stream).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<PlatformEvent>(line) {
            Ok(PlatformEvent::SubscriptionChange { old_subscription }) => {
                let change = SubscriptionChange {
                    options: old_subscription.options,
                };
                if events.send(change).await.is_err() {
                    // Listener is gone; nothing left to deliver to.
                    return;
                }
            }
            Ok(PlatformEvent::Unknown) => {
                debug!("ignoring unrelated platform event");
            }
            Err(e) => {
                warn!(error = %e, "skipping malformed platform event");
            }
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, path::PathBuf, sync::Arc};

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url::Url;

use push_relay::backend::BackendClient;
use push_relay::config::{
    CACHE_FILE, DATA_DIR_ENV, DEFAULT_DATA_DIR, DEFAULT_PLATFORM_SOCKET, DEFAULT_PLATFORM_URL,
    EVENT_CHANNEL_CAPACITY, LOG_FORMAT_ENV, PLATFORM_SOCKET_ENV, PLATFORM_URL_ENV,
};
use push_relay::credentials::CredentialCache;
use push_relay::gateway::EventGateway;
use push_relay::handler::{RenewalHandler, RenewalListener};
use push_relay::platform::AgentClient;

#[tokio::main]
async fn main() {
    init_tracing();

    let data_dir = env_or_default(DATA_DIR_ENV, DEFAULT_DATA_DIR);
    let cache_path = PathBuf::from(&data_dir).join(CACHE_FILE);
    let cache =
        CredentialCache::open(&cache_path).expect("Failed to open platform credential cache");

    let platform_url: Url = env_or_default(PLATFORM_URL_ENV, DEFAULT_PLATFORM_URL)
        .parse()
        .expect("PLATFORM_URL must be a valid URL");
    let agent = AgentClient::new(platform_url).expect("Failed to build push agent client");
    let backend = BackendClient::new(Arc::new(cache)).expect("Failed to build backend client");

    let listener = RenewalListener::new(RenewalHandler::new(Arc::new(agent), Arc::new(backend)));

    let socket_path = PathBuf::from(env_or_default(PLATFORM_SOCKET_ENV, DEFAULT_PLATFORM_SOCKET));
    let gateway = EventGateway::bind(socket_path).expect("Failed to bind platform event socket");

    let shutdown = CancellationToken::new();
    let (events_tx, events_rx) = tokio::sync::mpsc::channel(EVENT_CHANNEL_CAPACITY);

    let gateway_task = tokio::spawn(gateway.run(events_tx, shutdown.clone()));
    let listener_task = tokio::spawn(listener.run(events_rx, shutdown.clone()));

    wait_for_shutdown_signal().await;
    tracing::info!("shutdown signal received");
    shutdown.cancel();

    gateway_task.await.expect("gateway task panicked");
    listener_task.await.expect("listener task panicked");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if env_or_default(LOG_FORMAT_ENV, "pretty").eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn wait_for_shutdown_signal() {
    let mut sigterm =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

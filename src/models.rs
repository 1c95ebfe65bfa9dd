// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Data Models
//!
//! Serde types for the three wire surfaces this service touches:
//!
//! - **Platform events**: newline-delimited JSON written by the push agent
//!   on the event socket.
//! - **Subscriptions**: the agent's renewed-subscription payload and its
//!   transport encoding for the backend POST.
//! - **Cached credentials**: the two JSON documents the installer writes
//!   into the platform credential cache.

use serde::{Deserialize, Serialize};

// =============================================================================
// Platform Events
// =============================================================================

/// A single event document from the push agent, tagged by event name.
///
/// Only `pushsubscriptionchange` is acted on; anything else deserializes to
/// [`PlatformEvent::Unknown`] and is skipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event")]
pub enum PlatformEvent {
    #[serde(rename = "pushsubscriptionchange", rename_all = "camelCase")]
    SubscriptionChange { old_subscription: PriorSubscription },

    #[serde(other)]
    Unknown,
}

/// The invalidated subscription as reported by the platform. Only its
/// subscribe options are needed for renewal.
#[derive(Debug, Clone, Deserialize)]
pub struct PriorSubscription {
    pub options: SubscriptionOptions,
}

/// One subscription-change notification, as handed from the gateway to the
/// renewal listener.
#[derive(Debug, Clone)]
pub struct SubscriptionChange {
    pub options: SubscriptionOptions,
}

// =============================================================================
// Subscriptions
// =============================================================================

/// Subscribe parameters carried over from the invalidated subscription:
/// push enablement plus the original application server key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionOptions {
    pub user_visible_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_server_key: Option<String>,
}

/// A renewed subscription as returned by the push agent.
///
/// The key material is raw bytes (p256dh: uncompressed EC point, auth:
/// shared secret); either may be absent, in which case the renewal aborts.
#[derive(Debug, Clone, Deserialize)]
pub struct RenewedSubscription {
    pub endpoint: String,
    #[serde(default)]
    pub p256dh: Option<Vec<u8>>,
    #[serde(default)]
    pub auth: Option<Vec<u8>>,
}

/// Transport form of a renewed subscription: key material base64-encoded,
/// ready to POST to the backend. Exists only for the duration of the call.
#[derive(Debug, Clone, Serialize)]
pub struct EncodedSubscription {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

// =============================================================================
// Cached Credentials
// =============================================================================

/// The push API key record stored at the `/push-api-key` cache entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyRecord {
    pub key: String,
}

/// The backend connection descriptor stored at the `/supabase-config` cache
/// entry. Field names are camelCase on the wire, exactly as the installer
/// writes them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    pub supabase_url: String,
    pub supabase_key: String,
}

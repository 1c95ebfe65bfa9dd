// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the platform credential cache | `/data` |
//! | `PLATFORM_SOCKET` | Unix socket where the push agent delivers events | `/run/push-relay/events.sock` |
//! | `PLATFORM_URL` | Base URL of the push agent's local HTTP API | `http://127.0.0.1:42017` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

/// Environment variable name for the data directory holding the credential
/// cache file.
///
/// The cache is populated by the installer; this service only reads it.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Default data directory.
pub const DEFAULT_DATA_DIR: &str = "/data";

/// Environment variable name for the platform event socket path.
pub const PLATFORM_SOCKET_ENV: &str = "PLATFORM_SOCKET";

/// Default platform event socket path.
pub const DEFAULT_PLATFORM_SOCKET: &str = "/run/push-relay/events.sock";

/// Environment variable name for the push agent's HTTP API base URL.
pub const PLATFORM_URL_ENV: &str = "PLATFORM_URL";

/// Default push agent base URL.
pub const DEFAULT_PLATFORM_URL: &str = "http://127.0.0.1:42017";

/// Environment variable name for the logging format selector.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// File name of the credential cache inside the data directory.
pub const CACHE_FILE: &str = "push-data.redb";

/// Cache entry key holding the push API key record (`{"key": "..."}`).
pub const API_KEY_ENTRY: &str = "/push-api-key";

/// Cache entry key holding the backend connection descriptor
/// (`{"supabaseUrl": "...", "supabaseKey": "..."}`).
pub const SUPABASE_CONFIG_ENTRY: &str = "/supabase-config";

/// Buffered capacity of the gateway-to-listener event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 16;

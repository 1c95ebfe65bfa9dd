// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Base64 encoding of subscription key material for transport.

use base64ct::{Base64, Encoding};

/// Encode raw key bytes as standard padded base64.
pub fn encode_key(bytes: &[u8]) -> String {
    Base64::encode_string(bytes)
}

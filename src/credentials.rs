// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only access to the platform credential cache backed by redb.
//!
//! ## Table Layout
//!
//! - `cache_entries`: entry path → JSON body
//!
//! Two fixed entries matter here: `/push-api-key` holding the push API key
//! record and `/supabase-config` holding the backend connection descriptor.
//! The installer populates both; this service never writes outside of tests.
//! A lookup that misses, fails to parse, or hits a store error logs the
//! problem and yields `None` so the caller can drop the renewal silently.

use std::path::Path;

use redb::{Database, ReadableDatabase, TableDefinition};
use serde::de::DeserializeOwned;
use tracing::error;

use crate::config::{API_KEY_ENTRY, SUPABASE_CONFIG_ENTRY};
use crate::models::{ApiKeyRecord, BackendConfig};

/// Cache entries: entry path → JSON body.
const CACHE_ENTRIES: TableDefinition<&str, &str> = TableDefinition::new("cache_entries");

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redb database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Handle to the platform credential cache file.
pub struct CredentialCache {
    db: Database,
}

impl CredentialCache {
    /// Open (or create empty) the cache at the given path.
    ///
    /// Creation mirrors the platform cache contract: opening a cache that
    /// was never populated succeeds and every lookup simply misses.
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create the table so read transactions don't fail on a fresh file
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CACHE_ENTRIES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Read the push API key, or `None` if it is missing or unreadable.
    pub fn api_key(&self) -> Option<String> {
        match self.read_json::<ApiKeyRecord>(API_KEY_ENTRY) {
            Ok(Some(record)) => Some(record.key),
            Ok(None) => {
                error!(entry = API_KEY_ENTRY, "no push API key found in cache");
                None
            }
            Err(e) => {
                error!(entry = API_KEY_ENTRY, error = %e, "failed to read push API key");
                None
            }
        }
    }

    /// Read the backend connection descriptor, or `None` if it is missing
    /// or unreadable.
    pub fn backend_config(&self) -> Option<BackendConfig> {
        match self.read_json::<BackendConfig>(SUPABASE_CONFIG_ENTRY) {
            Ok(Some(config)) => Some(config),
            Ok(None) => {
                error!(entry = SUPABASE_CONFIG_ENTRY, "no backend config found in cache");
                None
            }
            Err(e) => {
                error!(entry = SUPABASE_CONFIG_ENTRY, error = %e, "failed to read backend config");
                None
            }
        }
    }

    /// Look up an entry and parse its JSON body.
    fn read_json<T: DeserializeOwned>(&self, entry: &str) -> Result<Option<T>, CacheError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CACHE_ENTRIES)?;
        match table.get(entry)? {
            Some(value) => Ok(Some(serde_json::from_str(value.value())?)),
            None => Ok(None),
        }
    }

    /// Insert an entry body. The write path exists only so tests can stand
    /// in for the installer.
    #[cfg(test)]
    pub(crate) fn put_entry(&self, entry: &str, body: &str) -> Result<(), CacheError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CACHE_ENTRIES)?;
            table.insert(entry, body)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

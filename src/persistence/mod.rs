//! Save/load persistence for small JSON documents
//!
//! Features:
//! - Pretty JSON documents keyed by name (`leaderboard`, `settings`, `tuning`)
//! - Files in a data directory on native, LocalStorage on web
//! - Atomic replace on native (tmp → save)
//! - Missing or corrupt documents load as defaults

pub mod store;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use thiserror::Error;

pub use store::Store;

/// Failure reading or writing a persisted document
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON")]
    Json(#[from] serde_json::Error),
    #[error("browser storage unavailable: {0}")]
    Storage(String),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Load a document, or its default when it is missing or unreadable
pub fn load_or_default<T>(store: &Store, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match load(store, key) {
        Ok(Some(value)) => {
            log::info!("Loaded {}", key);
            value
        }
        Ok(None) => {
            log::info!("No saved {} found, starting fresh", key);
            T::default()
        }
        Err(e) => {
            log::warn!("Discarding saved {}: {}", key, e);
            T::default()
        }
    }
}

/// Load a document; `Ok(None)` when nothing has been saved under `key`
pub fn load<T: DeserializeOwned>(store: &Store, key: &str) -> Result<Option<T>, PersistError> {
    match store.read(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Serialize and write a document, replacing any previous version
pub fn save<T: Serialize>(store: &Store, key: &str, value: &T) -> Result<(), PersistError> {
    let json = serde_json::to_string_pretty(value)?;
    store.write(key, &json)?;
    log::debug!("Saved {} ({} bytes)", key, json.len());
    Ok(())
}

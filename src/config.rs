//! Configuration for the blog directory.
//!
//! Configuration can be set via environment variables:
//! - `BLOGROLL_DATA_PATH` - Optional. Path to the blog data file. Defaults to `db/data.json`.
//! - `BLOGROLL_SECRETS_PATH` - Optional. Path to the secrets file. Defaults to `db/setting.json`.
//! - `BLOGROLL_STORE` - Optional. Store backend, `file` or `memory`. Defaults to `file`.

use crate::store::BlogStoreType;
use std::path::PathBuf;

/// Data-access layer configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backing file for the blog collection.
    pub data_path: PathBuf,

    /// Secrets file holding the static token and the admin-ID allowlist.
    pub secrets_path: PathBuf,

    /// Which store backend to create.
    pub store_type: BlogStoreType,
}

impl Config {
    /// Load configuration from environment variables. Every value has a
    /// default, so this cannot fail.
    pub fn from_env() -> Self {
        let data_path = std::env::var("BLOGROLL_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("db/data.json"));

        let secrets_path = std::env::var("BLOGROLL_SECRETS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("db/setting.json"));

        let store_type = std::env::var("BLOGROLL_STORE")
            .map(|s| BlogStoreType::from_str(&s))
            .unwrap_or_default();

        Self {
            data_path,
            secrets_path,
            store_type,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("db/data.json"),
            secrets_path: PathBuf::from("db/setting.json"),
            store_type: BlogStoreType::File,
        }
    }
}

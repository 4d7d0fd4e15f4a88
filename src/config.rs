//! Server configuration.
//!
//! Read from the environment:
//! - `BLOCK_NOTE_STORAGE_PATH`: directory for the SQLite file
//! - `BLOCK_NOTE_DATABASE_URL`: explicit database URL, or `memory`
//! - `BLOCK_NOTE_ADDR`: listen address

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use sea_orm::DbErr;
use thiserror::Error;

use crate::db;
use crate::store::{DbStore, MemoryStore, NoteStore};

const STORAGE_PATH_VAR: &str = "BLOCK_NOTE_STORAGE_PATH";
const DATABASE_URL_VAR: &str = "BLOCK_NOTE_DATABASE_URL";
const ADDR_VAR: &str = "BLOCK_NOTE_ADDR";

const DB_FILE_NAME: &str = "block-note.db";
const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Store backend type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreType {
    /// SQLite file inside a storage directory
    Local { path: PathBuf },
    /// Any database URL SeaORM understands
    Url(String),
    /// Process memory, lost on exit
    Memory,
}

impl Default for StoreType {
    fn default() -> Self {
        StoreType::Local {
            path: std::env::temp_dir().join("block-note-storage"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub store_type: StoreType,
    pub addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store_type = match (get(DATABASE_URL_VAR), get(STORAGE_PATH_VAR)) {
            (Some(url), _) if url.eq_ignore_ascii_case("memory") => StoreType::Memory,
            (Some(url), _) => StoreType::Url(url),
            (None, Some(path)) => StoreType::Local {
                path: PathBuf::from(path),
            },
            (None, None) => StoreType::default(),
        };

        let raw_addr = get(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr.parse().map_err(|_| ConfigError::InvalidValue {
            key: ADDR_VAR,
            value: raw_addr.clone(),
        })?;

        Ok(Self { store_type, addr })
    }

    /// Open the configured store, creating tables when backed by a database
    pub async fn build_store(&self) -> Result<Arc<dyn NoteStore>, DbErr> {
        match &self.store_type {
            StoreType::Local { path } => {
                let db_path = path.join(DB_FILE_NAME);
                let conn = db::init_database(&db_path).await?;
                tracing::info!("Database initialized at {:?}", db_path);
                Ok(Arc::new(DbStore::new(Arc::new(conn))))
            }
            StoreType::Url(url) => {
                let conn = db::connect(url).await?;
                Ok(Arc::new(DbStore::new(Arc::new(conn))))
            }
            StoreType::Memory => {
                tracing::warn!("Using in-memory store; notes are lost on exit");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.store_type, StoreType::default());
        assert_eq!(cfg.addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_database_url_overrides_storage_path() {
        let cfg = config(&[
            (DATABASE_URL_VAR, "sqlite://notes.db?mode=rwc"),
            (STORAGE_PATH_VAR, "/var/lib/notes"),
        ])
        .unwrap();
        assert_eq!(cfg.store_type, StoreType::Url("sqlite://notes.db?mode=rwc".to_string()));
    }

    #[test]
    fn test_storage_path_and_memory() {
        let cfg = config(&[(STORAGE_PATH_VAR, "/var/lib/notes")]).unwrap();
        assert_eq!(
            cfg.store_type,
            StoreType::Local {
                path: PathBuf::from("/var/lib/notes")
            }
        );

        let cfg = config(&[(DATABASE_URL_VAR, "memory")]).unwrap();
        assert_eq!(cfg.store_type, StoreType::Memory);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let cfg = config(&[(DATABASE_URL_VAR, "  "), (ADDR_VAR, "")]).unwrap();
        assert_eq!(cfg.store_type, StoreType::default());
        assert_eq!(cfg.addr.port(), 8080);
    }

    #[test]
    fn test_invalid_addr() {
        let err = config(&[(ADDR_VAR, "localhost:eighty")]).unwrap_err();
        assert!(err.to_string().contains(ADDR_VAR));
    }

    #[tokio::test]
    async fn test_build_local_store() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&[(STORAGE_PATH_VAR, dir.path().to_str().unwrap())]).unwrap();

        let store = cfg.build_store().await.unwrap();
        assert!(store.find_repository("/x").await.unwrap().is_none());
        assert!(dir.path().join(DB_FILE_NAME).exists());
    }
}

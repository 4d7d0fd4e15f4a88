//! Note storage abstraction.
//!
//! The ingestion path only needs four primitives: a point lookup of a
//! repository by directory, a repository insert, a lookup of the top-level
//! block holding the highest serial number, and a block insert. They are
//! collected in [`NoteStore`] so the services above can run against:
//! - SQLite through SeaORM (default)
//! - An in-process table set (tests and throwaway runs)
//!
//! Implementations must enforce directory uniqueness and report a duplicate
//! as [`StoreError::Conflict`].

mod database;
mod memory;

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

use crate::db::entities::{block, repository};

pub use database::DbStore;
pub use memory::MemoryStore;

/// Storage error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fields of a repository row about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRepository {
    pub name: Option<String>,
    pub description: Option<String>,
    pub directory: String,
    pub language: Option<String>,
}

/// Fields of a block row about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlock {
    pub repo_id: Option<i32>,
    pub file: String,
    pub line_nums: String,
    pub code: String,
    pub text: String,
    pub focus: Option<String>,
    pub parent_id: Option<i32>,
    pub serial_num: i32,
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Exact match on `directory`
    async fn find_repository(&self, directory: &str) -> StoreResult<Option<repository::Model>>;

    async fn insert_repository(&self, repo: NewRepository) -> StoreResult<repository::Model>;

    /// Parentless block with the highest serial number (highest id on ties)
    async fn last_top_level_block(&self) -> StoreResult<Option<block::Model>>;

    /// Single-row write; returns the stored row with id and timestamps
    async fn insert_block(&self, block: NewBlock) -> StoreResult<block::Model>;
}

pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

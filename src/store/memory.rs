//! In-process note store.
//!
//! Keeps rows in plain vectors behind a lock. Nothing survives a restart.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{unix_now, NewBlock, NewRepository, NoteStore, StoreError, StoreResult};
use crate::db::entities::{block, repository};

#[derive(Default)]
struct Tables {
    repositories: Vec<repository::Model>,
    blocks: Vec<block::Model>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_repository_inserts: AtomicBool,
    fail_block_inserts: AtomicBool,
    repository_lookups: AtomicUsize,
    serial_lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryStore {
    /// Insert a block row verbatim, keeping its id
    pub fn seed_block(&self, model: block::Model) {
        self.tables.write().blocks.push(model);
    }

    pub fn repositories(&self) -> Vec<repository::Model> {
        self.tables.read().repositories.clone()
    }

    pub fn blocks(&self) -> Vec<block::Model> {
        self.tables.read().blocks.clone()
    }

    pub fn fail_repository_inserts(&self, fail: bool) {
        self.fail_repository_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_block_inserts(&self, fail: bool) {
        self.fail_block_inserts.store(fail, Ordering::SeqCst);
    }

    /// Number of `find_repository` calls so far
    pub fn repository_lookups(&self) -> usize {
        self.repository_lookups.load(Ordering::SeqCst)
    }

    /// Number of `last_top_level_block` calls so far
    pub fn serial_lookups(&self) -> usize {
        self.serial_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn find_repository(&self, directory: &str) -> StoreResult<Option<repository::Model>> {
        self.repository_lookups.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.read();
        Ok(tables
            .repositories
            .iter()
            .find(|r| r.directory == directory)
            .cloned())
    }

    async fn insert_repository(&self, repo: NewRepository) -> StoreResult<repository::Model> {
        if self.fail_repository_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("repository inserts disabled".to_string()));
        }

        let mut tables = self.tables.write();
        if tables.repositories.iter().any(|r| r.directory == repo.directory) {
            return Err(StoreError::Conflict(format!(
                "repositories.directory: {}",
                repo.directory
            )));
        }

        let now = unix_now();
        let id = tables.repositories.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let model = repository::Model {
            id,
            name: repo.name,
            url: None,
            description: repo.description,
            directory: repo.directory,
            language: repo.language,
            created_at: now,
            updated_at: now,
        };
        tables.repositories.push(model.clone());
        Ok(model)
    }

    async fn last_top_level_block(&self) -> StoreResult<Option<block::Model>> {
        self.serial_lookups.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.read();
        Ok(tables
            .blocks
            .iter()
            .filter(|b| b.parent_id.is_none())
            .max_by_key(|b| (b.serial_num, b.id))
            .cloned())
    }

    async fn insert_block(&self, new_block: NewBlock) -> StoreResult<block::Model> {
        if self.fail_block_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("block inserts disabled".to_string()));
        }

        let mut tables = self.tables.write();
        let now = unix_now();
        let id = tables.blocks.iter().map(|b| b.id).max().unwrap_or(0) + 1;
        let model = block::Model {
            id,
            repo_id: new_block.repo_id,
            file: new_block.file,
            line_nums: new_block.line_nums,
            code: new_block.code,
            text: new_block.text,
            focus: new_block.focus,
            parent_id: new_block.parent_id,
            serial_num: new_block.serial_num,
            created_at: now,
            updated_at: now,
        };
        tables.blocks.push(model.clone());
        Ok(model)
    }
}

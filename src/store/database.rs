//! SeaORM-backed note store.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};

use super::{unix_now, NewBlock, NewRepository, NoteStore, StoreError, StoreResult};
use crate::db::entities::{block, repository, Block, Repository};

pub struct DbStore {
    db: Arc<DatabaseConnection>,
}

impl DbStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn map_db_err(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => StoreError::Conflict(msg),
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl NoteStore for DbStore {
    async fn find_repository(&self, directory: &str) -> StoreResult<Option<repository::Model>> {
        Repository::find()
            .filter(repository::Column::Directory.eq(directory))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    async fn insert_repository(&self, repo: NewRepository) -> StoreResult<repository::Model> {
        let now = unix_now();
        repository::ActiveModel {
            name: Set(repo.name),
            description: Set(repo.description),
            directory: Set(repo.directory),
            language: Set(repo.language),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn last_top_level_block(&self) -> StoreResult<Option<block::Model>> {
        Block::find()
            .filter(block::Column::ParentId.is_null())
            .order_by_desc(block::Column::SerialNum)
            .order_by_desc(block::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    async fn insert_block(&self, new_block: NewBlock) -> StoreResult<block::Model> {
        let now = unix_now();
        block::ActiveModel {
            repo_id: Set(new_block.repo_id),
            file: Set(new_block.file),
            line_nums: Set(new_block.line_nums),
            code: Set(new_block.code),
            text: Set(new_block.text),
            focus: Set(new_block.focus),
            parent_id: Set(new_block.parent_id),
            serial_num: Set(new_block.serial_num),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .map_err(map_db_err)
    }
}

use std::sync::Arc;

use crate::store::{NoteStore, StoreResult};

/// Serial numbers for top-level blocks.
///
/// The next serial is the *id* of the top-level block currently holding the
/// highest serial, plus one. With no top-level block yet the serial stays 0,
/// so serials are neither consecutive nor guaranteed to start at 1. Read and
/// insert are not atomic: two concurrent top-level submissions may receive
/// the same serial.
pub struct BlockSequencer {
    store: Arc<dyn NoteStore>,
}

impl BlockSequencer {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    pub async fn next_serial(&self) -> StoreResult<i32> {
        let serial = match self.store.last_top_level_block().await? {
            Some(last) if last.id > 0 => last.id.checked_add(1).unwrap_or_else(|| {
                tracing::warn!("Block id {} leaves no room for a next serial, using 0", last.id);
                0
            }),
            _ => 0,
        };
        Ok(serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::block;
    use crate::store::MemoryStore;

    fn top_level(id: i32, serial_num: i32) -> block::Model {
        block::Model {
            id,
            repo_id: None,
            file: "main.go".to_string(),
            line_nums: "1-1".to_string(),
            code: "package main".to_string(),
            text: "entry".to_string(),
            focus: None,
            parent_id: None,
            serial_num,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[tokio::test]
    async fn test_no_blocks_leaves_serial_unset() {
        let store = Arc::new(MemoryStore::new());
        assert_eq!(BlockSequencer::new(store).next_serial().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_serial_follows_previous_identity() {
        let store = Arc::new(MemoryStore::new());
        store.seed_block(top_level(7, 3));

        assert_eq!(BlockSequencer::new(store).next_serial().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_highest_serial_wins_over_highest_id() {
        let store = Arc::new(MemoryStore::new());
        store.seed_block(top_level(4, 10));
        store.seed_block(top_level(9, 2));

        assert_eq!(BlockSequencer::new(store).next_serial().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_id_at_limit_falls_back_to_zero() {
        let store = Arc::new(MemoryStore::new());
        store.seed_block(top_level(i32::MAX, 1));

        assert_eq!(BlockSequencer::new(store).next_serial().await.unwrap(), 0);
    }
}

use std::sync::Arc;

use serde::Deserialize;

use super::{BlockSequencer, RepositoryResolver};
use crate::db::entities::block;
use crate::error::{Result, ServerError};
use crate::manifest::ManifestReader;
use crate::store::{NewBlock, NoteStore};

/// A raw annotation as submitted by the editor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSubmission {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub line_nums: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub focus: Option<String>,
    #[serde(default, alias = "ParentID")]
    pub parent_id: Option<i32>,
    /// Directory of the project the code comes from
    #[serde(default)]
    pub project: String,
}

impl BlockSubmission {
    fn validate(&self) -> Result<()> {
        let required = [
            ("file", &self.file),
            ("lineNums", &self.line_nums),
            ("code", &self.code),
            ("text", &self.text),
            ("project", &self.project),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(field, _)| *field)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ServerError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// 0 (and anything below) means "no parent"
    fn parent(&self) -> Option<i32> {
        self.parent_id.filter(|id| *id > 0)
    }
}

/// Entry point for new blocks.
///
/// Only the final block insert can fail a submission; every problem with the
/// repository link is logged and the block is stored unlinked.
pub struct BlockIngestService {
    store: Arc<dyn NoteStore>,
    resolver: RepositoryResolver,
    sequencer: BlockSequencer,
}

impl BlockIngestService {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self::with_manifest_reader(store, ManifestReader::new())
    }

    pub fn with_manifest_reader(store: Arc<dyn NoteStore>, manifests: ManifestReader) -> Self {
        Self {
            resolver: RepositoryResolver::new(store.clone(), manifests),
            sequencer: BlockSequencer::new(store.clone()),
            store,
        }
    }

    pub async fn ingest(&self, submission: BlockSubmission) -> Result<block::Model> {
        submission.validate()?;

        let repo_id = match self.resolver.resolve(&submission.project).await {
            Ok(repo) => Some(repo.id),
            Err(e) => {
                tracing::warn!("Storing block without repository link: {}", e);
                None
            }
        };

        let parent_id = submission.parent();
        let serial_num = match parent_id {
            Some(_) => 0,
            None => self.sequencer.next_serial().await.unwrap_or_else(|e| {
                tracing::warn!("Serial lookup failed, leaving serial unset: {}", e);
                0
            }),
        };

        let stored = self
            .store
            .insert_block(NewBlock {
                repo_id,
                file: submission.file,
                line_nums: submission.line_nums,
                code: submission.code,
                text: submission.text,
                focus: submission.focus,
                parent_id,
                serial_num,
            })
            .await
            .map_err(|e| {
                tracing::error!("create block failed {}", e);
                ServerError::Storage(e)
            })?;

        tracing::debug!(
            "Stored block {} (repo {:?}, parent {:?}, serial {})",
            stored.id,
            stored.repo_id,
            stored.parent_id,
            stored.serial_num
        );
        Ok(stored)
    }
}

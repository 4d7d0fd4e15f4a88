use std::path::Path;
use std::sync::Arc;

use crate::db::entities::repository;
use crate::error::{Result, ServerError};
use crate::manifest::{Detection, ManifestReader};
use crate::store::{NewRepository, NoteStore};

/// Maps a project directory to its repository row, creating it on first use.
///
/// Rows are never refreshed: once a directory is known, later manifest
/// changes are ignored.
pub struct RepositoryResolver {
    store: Arc<dyn NoteStore>,
    manifests: ManifestReader,
}

impl RepositoryResolver {
    pub fn new(store: Arc<dyn NoteStore>, manifests: ManifestReader) -> Self {
        Self { store, manifests }
    }

    pub async fn resolve(&self, directory: &str) -> Result<repository::Model> {
        if let Some(repo) = self.store.find_repository(directory).await? {
            tracing::debug!("Repository {} already known for {}", repo.id, directory);
            return Ok(repo);
        }

        let manifest = match self.manifests.detect(Path::new(directory)).await? {
            Detection::Recognized(manifest) => manifest,
            Detection::NotRecognized => {
                return Err(ServerError::Unsupported(directory.to_string()));
            }
        };

        // A concurrent first submission for the same directory surfaces here
        // as StoreError::Conflict from the uniqueness constraint.
        let repo = self
            .store
            .insert_repository(NewRepository {
                name: manifest.name,
                description: manifest.description,
                directory: directory.to_string(),
                language: Some(manifest.language.as_str().to_string()),
            })
            .await?;

        tracing::info!(
            "Created repository {} ({}) for {}",
            repo.id,
            manifest.language,
            directory
        );
        Ok(repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::block;
    use crate::store::{MemoryStore, NewBlock, StoreError, StoreResult};
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Lookups always miss, as if another request created the row in between
    struct StaleLookupStore(Arc<MemoryStore>);

    #[async_trait]
    impl NoteStore for StaleLookupStore {
        async fn find_repository(&self, _directory: &str) -> StoreResult<Option<repository::Model>> {
            Ok(None)
        }

        async fn insert_repository(&self, repo: NewRepository) -> StoreResult<repository::Model> {
            self.0.insert_repository(repo).await
        }

        async fn last_top_level_block(&self) -> StoreResult<Option<block::Model>> {
            self.0.last_top_level_block().await
        }

        async fn insert_block(&self, block: NewBlock) -> StoreResult<block::Model> {
            self.0.insert_block(block).await
        }
    }

    fn resolver(store: &Arc<MemoryStore>) -> RepositoryResolver {
        RepositoryResolver::new(store.clone(), ManifestReader::new())
    }

    fn dir_str(dir: &TempDir) -> String {
        dir.path().to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("go.mod"), "module example.com/notes\n").unwrap();
        let store = Arc::new(MemoryStore::new());
        let resolver = resolver(&store);

        let first = resolver.resolve(&dir_str(&dir)).await.unwrap();
        let second = resolver.resolve(&dir_str(&dir)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.repositories().len(), 1);
        assert_eq!(first.name.as_deref(), Some("example.com/notes"));
        assert_eq!(first.language.as_deref(), Some("go"));
        assert!(first.description.is_none());
    }

    #[tokio::test]
    async fn test_known_directory_is_not_redetected() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("package.json");
        std::fs::write(&manifest, r#"{"name": "before"}"#).unwrap();
        let store = Arc::new(MemoryStore::new());
        let resolver = resolver(&store);

        let first = resolver.resolve(&dir_str(&dir)).await.unwrap();

        // Even a broken manifest is ignored once the row exists
        std::fs::write(&manifest, "{").unwrap();
        let second = resolver.resolve(&dir_str(&dir)).await.unwrap();

        assert_eq!(second.name.as_deref(), Some("before"));
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_package_json_takes_precedence() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"name": "ui", "description": "web client"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("go.mod"), "module example.com/ui\n").unwrap();
        let store = Arc::new(MemoryStore::new());

        let repo = resolver(&store).resolve(&dir_str(&dir)).await.unwrap();
        assert_eq!(repo.name.as_deref(), Some("ui"));
        assert_eq!(repo.description.as_deref(), Some("web client"));
        assert_eq!(repo.language.as_deref(), Some("js"));
        assert_eq!(repo.directory, dir_str(&dir));
    }

    #[tokio::test]
    async fn test_unrecognized_directory_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());

        let err = resolver(&store).resolve(&dir_str(&dir)).await.unwrap_err();
        match err {
            ServerError::Unsupported(directory) => assert_eq!(directory, dir_str(&dir)),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(store.repositories().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_manifest_creates_nothing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("package.json"), "not json").unwrap();
        let store = Arc::new(MemoryStore::new());

        let err = resolver(&store).resolve(&dir_str(&dir)).await.unwrap_err();
        assert!(matches!(err, ServerError::ManifestMalformed(_)));
        assert!(store.repositories().is_empty());
    }

    #[tokio::test]
    async fn test_insert_failure_is_storage_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("go.mod"), "module example.com/x\n").unwrap();
        let store = Arc::new(MemoryStore::new());
        store.fail_repository_inserts(true);

        let err = resolver(&store).resolve(&dir_str(&dir)).await.unwrap_err();
        assert!(matches!(err, ServerError::Storage(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_concurrent_create_is_conflict() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("go.mod"), "module example.com/race\n").unwrap();
        let inner = Arc::new(MemoryStore::new());
        inner
            .insert_repository(NewRepository {
                name: Some("winner".to_string()),
                description: None,
                directory: dir_str(&dir),
                language: Some("go".to_string()),
            })
            .await
            .unwrap();

        let store: Arc<dyn NoteStore> = Arc::new(StaleLookupStore(inner.clone()));
        let err = RepositoryResolver::new(store, ManifestReader::new())
            .resolve(&dir_str(&dir))
            .await
            .unwrap_err();

        assert!(matches!(err, ServerError::Storage(StoreError::Conflict(_))), "got {:?}", err);
        assert_eq!(inner.repositories().len(), 1);
        assert_eq!(inner.repositories()[0].name.as_deref(), Some("winner"));
    }
}

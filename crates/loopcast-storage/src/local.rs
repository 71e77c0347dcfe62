//! Local-filesystem storage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Flat object store keyed by bare file names.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store bytes under `name`, returning the resulting location.
    async fn put(&self, name: &str, bytes: &[u8]) -> StorageResult<PathBuf>;

    /// Read back a stored object.
    async fn get(&self, name: &str) -> StorageResult<Vec<u8>>;

    /// Remove a stored object.
    async fn delete(&self, name: &str) -> StorageResult<()>;

    /// Location an object with `name` would occupy.
    fn path_for(&self, name: &str) -> PathBuf;
}

/// [`Storage`] rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Open a store at `root`, creating the directory if needed.
    pub async fn create(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names are bare file names: no separators, no parent traversal.
    fn validate_name(name: &str) -> StorageResult<()> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
        {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(&self, name: &str, bytes: &[u8]) -> StorageResult<PathBuf> {
        Self::validate_name(name)?;
        let path = self.root.join(name);
        fs::write(&path, bytes).await?;
        debug!("stored {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    async fn get(&self, name: &str) -> StorageResult<Vec<u8>> {
        Self::validate_name(name)?;
        let path = self.root.join(name);
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, name: &str) -> StorageResult<()> {
        Self::validate_name(name)?;
        let path = self.root.join(name);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

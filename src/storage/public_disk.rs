use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use crate::storage::{FileStorage, ImageUpload, StorageError, StorageResult};

/// Local directory exposed to clients under `/storage`.
#[derive(Debug, Clone)]
pub struct PublicDisk {
    root: PathBuf,
}

impl PublicDisk {
    /// Create a disk rooted at `root`. The directory is created lazily on the
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Make sure the root directory exists.
    pub fn ensure_root(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    fn resolve(&self, relative: &str) -> StorageResult<PathBuf> {
        let path = Path::new(relative);
        let is_plain = path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

        if relative.is_empty() || !is_plain {
            return Err(StorageError::InvalidPath(relative.to_string()));
        }

        Ok(self.root.join(path))
    }
}

impl FileStorage for PublicDisk {
    fn put(&self, directory: &str, image: &ImageUpload) -> StorageResult<String> {
        let target_dir = self.resolve(directory)?;
        fs::create_dir_all(&target_dir)?;

        let file_name = format!("{}.{}", Uuid::new_v4().simple(), image.kind.extension());
        fs::write(target_dir.join(&file_name), &image.bytes)?;

        let relative = format!("{}/{file_name}", directory.trim_end_matches('/'));
        log::debug!("Stored {} bytes at {relative}", image.bytes.len());

        Ok(relative)
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        let target = self.resolve(path)?;

        match fs::remove_file(target) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

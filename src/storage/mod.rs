//! File storage for uploaded product images.
//!
//! Files are written to a "public disk": a directory whose contents are
//! served back over HTTP without access control. Stored files are addressed
//! by a path relative to the disk root, e.g. `products/3f2c...9a.png`.

use thiserror::Error;

pub mod public_disk;

#[cfg(test)]
pub mod mock;

pub use public_disk::PublicDisk;

/// Result type returned by storage backends.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised while writing or removing stored files.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The relative path escapes the disk root or is otherwise unusable.
    #[error("invalid storage path `{0}`")]
    InvalidPath(String),
}

/// Image formats accepted for product pictures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: [u8; 3] = [0xFF, 0xD8, 0xFF];

impl ImageKind {
    /// Detect the image format from the leading signature bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&PNG_SIGNATURE) {
            Some(Self::Png)
        } else if bytes.starts_with(&JPEG_SIGNATURE) {
            Some(Self::Jpeg)
        } else {
            None
        }
    }

    /// File extension used for stored files of this kind.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// Validated image contents waiting to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub kind: ImageKind,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Wrap `bytes` when they carry a supported image signature.
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        let kind = ImageKind::sniff(&bytes)?;
        Some(Self { kind, bytes })
    }
}

/// Backend capable of persisting uploaded files.
pub trait FileStorage {
    /// Store `image` under `directory` with a generated file name and return
    /// the path relative to the storage root.
    fn put(&self, directory: &str, image: &ImageUpload) -> StorageResult<String>;
    /// Remove a previously stored file. Missing files are not an error.
    fn delete(&self, path: &str) -> StorageResult<()>;
}

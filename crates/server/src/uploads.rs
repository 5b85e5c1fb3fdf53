//! Upload receiver.
//!
//! Stores uploaded binaries under the public asset root and hands back stable
//! relative paths for later retrieval. Serving the files is the static file
//! layer's job.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Subdirectory of the public root where uploads land.
const UPLOADS_SUBDIR: &str = "uploads";

/// Longest file extension carried over from the client-supplied filename.
const MAX_EXTENSION_LEN: usize = 8;

/// Errors from the upload store.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Filesystem failure while persisting an upload.
    #[error("upload i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// A persisted upload.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// Path relative to the public root, e.g. `uploads/<name>.jpg`. Stable
    /// for the lifetime of the file.
    pub path: String,
}

/// Stores uploaded files on the local filesystem.
#[derive(Debug, Clone)]
pub struct UploadStore {
    public_root: PathBuf,
}

impl UploadStore {
    /// Create a store rooted at `public_root`.
    #[must_use]
    pub fn new(public_root: impl Into<PathBuf>) -> Self {
        Self {
            public_root: public_root.into(),
        }
    }

    /// Create the uploads directory if missing. Called once at startup.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` if the directory cannot be created.
    pub async fn ensure_dirs(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(self.public_root.join(UPLOADS_SUBDIR)).await?;
        Ok(())
    }

    /// Persist one uploaded file under a freshly generated name.
    ///
    /// The client-supplied filename contributes at most a short alphanumeric
    /// extension; the rest of the stored name is random.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` if the file cannot be written.
    pub async fn save(
        &self,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredUpload, UploadError> {
        let file_name = generate_file_name(original_name);
        let relative = format!("{UPLOADS_SUBDIR}/{file_name}");
        tokio::fs::write(self.public_root.join(&relative), bytes).await?;

        Ok(StoredUpload { path: relative })
    }
}

/// Random storage name, keeping a short extension when the original has one.
fn generate_file_name(original_name: Option<&str>) -> String {
    let stem = Uuid::new_v4().simple().to_string();
    match original_name.and_then(extension_of) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

/// Lower-cased extension of `name`, or `None` when it is missing, overlong,
/// or contains anything but ASCII alphanumerics.
fn extension_of(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > MAX_EXTENSION_LEN {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn keeps_simple_extensions() {
        let name = generate_file_name(Some("photo.JPG"));
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn drops_suspicious_extensions() {
        assert!(!generate_file_name(Some("photo.j pg")).contains('.'));
        assert!(!generate_file_name(Some("archive.tar.gz.backup123")).contains('.'));
        assert!(!generate_file_name(Some("noext")).contains('.'));
        assert!(!generate_file_name(None).contains('.'));
    }

    #[test]
    fn generated_names_are_unique() {
        assert_ne!(generate_file_name(None), generate_file_name(None));
    }

    #[tokio::test]
    async fn save_writes_under_uploads() {
        let root = std::env::temp_dir().join(format!("gavel-test-{}", Uuid::new_v4().simple()));
        let store = UploadStore::new(&root);
        store.ensure_dirs().await.unwrap();

        let stored = store.save(Some("photo.png"), b"not-really-a-png").await.unwrap();

        assert!(stored.path.starts_with("uploads/"));
        let on_disk = tokio::fs::read(root.join(&stored.path)).await.unwrap();
        assert_eq!(on_disk, b"not-really-a-png");

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}

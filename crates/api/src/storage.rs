//! Stored-media access.
//!
//! Uploaded selfies, custom style references, catalog images, and
//! generation results all live under one media root as date-partitioned
//! relative paths (`<kind>/YYYY/MM/DD/<uuid>.<ext>`). The database only
//! ever stores the relative path; URLs and absolute paths derive from
//! it.

use std::path::{Path, PathBuf};

use chrono::Utc;

/// URL prefix the static file service mounts the media root under.
pub const MEDIA_URL_PREFIX: &str = "/media";

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist bytes under `<kind>/YYYY/MM/DD/<uuid>.<ext>`, returning
    /// the relative path.
    pub async fn save(
        &self,
        kind: &str,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String, std::io::Error> {
        let date_dir = Utc::now().format("%Y/%m/%d");
        let filename = format!("{}.{extension}", uuid::Uuid::new_v4());
        let relative = format!("{kind}/{date_dir}/{filename}");

        let absolute = self.absolute(&relative);
        if let Some(parent) = absolute.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&absolute, bytes).await?;
        Ok(relative)
    }

    /// Absolute filesystem path for a stored relative path.
    pub fn absolute(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Public URL for a stored relative path.
    pub fn url(relative: &str) -> String {
        format!("{MEDIA_URL_PREFIX}/{relative}")
    }

    /// Delete a stored file. Missing files and IO failures are logged
    /// and swallowed: a dangling file must never fail a request.
    pub async fn delete(&self, relative: &str) {
        if relative.is_empty() {
            return;
        }
        let absolute = self.absolute(relative);
        if let Err(err) = tokio::fs::remove_file(&absolute).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %absolute.display(), error = %err, "Failed to delete media file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_partitions_by_date_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path().to_path_buf());

        let relative = store.save("selfies", "jpg", b"selfie bytes").await.unwrap();
        assert!(relative.starts_with("selfies/"));
        assert!(relative.ends_with(".jpg"));
        // kind/YYYY/MM/DD/file
        assert_eq!(relative.split('/').count(), 5);

        let stored = tokio::fs::read(store.absolute(&relative)).await.unwrap();
        assert_eq!(stored, b"selfie bytes");
        assert_eq!(MediaStore::url(&relative), format!("/media/{relative}"));
    }

    #[tokio::test]
    async fn delete_is_quiet_about_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path().to_path_buf());

        let relative = store.save("results", "png", b"img").await.unwrap();
        store.delete(&relative).await;
        assert!(!store.absolute(&relative).exists());
        // Second delete and empty path are no-ops.
        store.delete(&relative).await;
        store.delete("").await;
    }
}

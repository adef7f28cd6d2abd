//! Photo storage on the local filesystem
//!
//! Uploaded photos are written under a single directory and referenced by
//! the public path they are served from (`/uploads/<file>`).

use axum::body::Bytes;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::validation::FieldError;

/// Public prefix under which stored photos are served
pub const UPLOADS_PREFIX: &str = "/uploads";

/// A photo received in a multipart body
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Directory-backed photo store
#[derive(Debug, Clone)]
pub struct PhotoStorage {
    root: PathBuf,
    max_bytes: usize,
}

impl PhotoStorage {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Create the storage directory if it does not exist
    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Check the upload is a non-empty image within the size limit
    pub fn validate(&self, upload: &PhotoUpload) -> Result<(), FieldError> {
        if upload.bytes.is_empty() {
            return Err(FieldError::new("photo", "Photo must not be empty"));
        }

        if upload.bytes.len() > self.max_bytes {
            return Err(FieldError::new(
                "photo",
                format!("Photo must be at most {} bytes", self.max_bytes),
            ));
        }

        let is_image = upload
            .content_type
            .as_deref()
            .is_some_and(|content_type| content_type.starts_with("image/"));
        if !is_image {
            return Err(FieldError::new("photo", "Photo must be an image"));
        }

        Ok(())
    }

    /// Write the photo under a fresh name and return its public reference
    pub async fn save(&self, upload: &PhotoUpload) -> std::io::Result<String> {
        let file_name = format!("{}.{}", Uuid::new_v4(), extension_for(upload));
        tokio::fs::write(self.root.join(&file_name), &upload.bytes).await?;

        info!("Stored photo {} ({} bytes)", file_name, upload.bytes.len());
        Ok(format!("{}/{}", UPLOADS_PREFIX, file_name))
    }

    /// Delete a photo previously returned by [`PhotoStorage::save`].
    ///
    /// References that do not point into this storage are ignored.
    pub async fn remove(&self, reference: &str) {
        let Some(file_name) = reference
            .strip_prefix(UPLOADS_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains('/') && !name.contains(".."))
        else {
            return;
        };

        if let Err(e) = tokio::fs::remove_file(self.root.join(file_name)).await {
            warn!("Failed to remove photo {}: {}", reference, e);
        }
    }
}

fn extension_for(upload: &PhotoUpload) -> String {
    let from_name = upload
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(str::to_ascii_lowercase);

    from_name.unwrap_or_else(|| {
        match upload.content_type.as_deref() {
            Some("image/png") => "png",
            Some("image/gif") => "gif",
            Some("image/webp") => "webp",
            _ => "jpg",
        }
        .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(bytes: &'static [u8]) -> PhotoUpload {
        PhotoUpload {
            file_name: Some("avatar.PNG".to_string()),
            content_type: Some("image/png".to_string()),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn test_validate_rejects_non_images_and_oversized() {
        let storage = PhotoStorage::new("/tmp/unused", 4);

        assert!(storage.validate(&png(b"abcd")).is_ok());
        assert!(storage.validate(&png(b"abcde")).is_err());
        assert!(storage.validate(&png(b"")).is_err());

        let text = PhotoUpload {
            content_type: Some("text/plain".to_string()),
            ..png(b"ab")
        };
        assert_eq!(storage.validate(&text).unwrap_err().field, "photo");
    }

    #[test]
    fn test_extension_falls_back_to_content_type() {
        assert_eq!(extension_for(&png(b"x")), "png");

        let unnamed = PhotoUpload {
            file_name: None,
            content_type: Some("image/webp".to_string()),
            bytes: Bytes::from_static(b"x"),
        };
        assert_eq!(extension_for(&unnamed), "webp");
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = PhotoStorage::new(dir.path(), 1024);

        let reference = storage.save(&png(b"fake png")).await.unwrap();
        assert!(reference.starts_with("/uploads/"));
        assert!(reference.ends_with(".png"));

        let file_name = reference.trim_start_matches("/uploads/");
        let path = dir.path().join(file_name);
        assert_eq!(std::fs::read(&path).unwrap(), b"fake png");

        storage.remove(&reference).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_remove_ignores_foreign_references() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("keep.png");
        std::fs::write(&outside, b"keep").unwrap();

        let storage = PhotoStorage::new(dir.path().join("uploads"), 1024);
        storage.ensure_root().await.unwrap();
        storage.remove("/uploads/../keep.png").await;
        storage.remove("https://cdn.example.com/keep.png").await;

        assert!(outside.exists());
    }
}

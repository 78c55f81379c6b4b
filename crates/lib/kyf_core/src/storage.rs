//! On-disk storage for uploaded avatars and documents.
//!
//! Files live under `<public_dir>/uploads/<kind>/` and are addressed by the
//! public URL path `/uploads/<kind>/<file>`, which mirrors the disk layout.

use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use rand::{Rng, rng};
use thiserror::Error;
use tracing::debug;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not an upload path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extensions accepted for profile photos.
const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg"];
/// Extensions accepted for identity documents.
const DOCUMENT_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".pdf"];

/// Which upload area a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Avatar,
    Document,
}

impl UploadKind {
    /// Directory name under `uploads/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            UploadKind::Avatar => "avatars",
            UploadKind::Document => "documents",
        }
    }

    /// Lowercase extensions (with the dot) accepted for this kind.
    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            UploadKind::Avatar => IMAGE_EXTENSIONS,
            UploadKind::Document => DOCUMENT_EXTENSIONS,
        }
    }

    pub fn accepts(self, extension: &str) -> bool {
        self.allowed_extensions().contains(&extension)
    }
}

/// Lowercased extension of a client-supplied filename, including the dot.
///
/// Only the final path segment is considered, and dotfiles such as `.png`
/// have no extension.
pub fn extension_of(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let dot = base.rfind('.')?;
    if dot == 0 || dot == base.len() - 1 {
        return None;
    }
    Some(base[dot..].to_ascii_lowercase())
}

/// Whether a stored URL points at an image the vision check can read.
pub fn is_image_url(url: &str) -> bool {
    extension_of(url).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// `<unix-millis>-<6 lowercase alphanumerics><ext>`.
pub fn generate_file_name(extension: &str) -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rng();
    let suffix: String = (0..6)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}-{suffix}{extension}", Utc::now().timestamp_millis())
}

/// Upload storage rooted at the public static directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    public_dir: PathBuf,
}

impl FileStore {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
        }
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    /// Directory that holds uploads of `kind`.
    pub fn dir_for(&self, kind: UploadKind) -> PathBuf {
        self.public_dir.join("uploads").join(kind.dir_name())
    }

    /// Write `bytes` as a new file of `kind`, returning its public URL path.
    ///
    /// The directory is created if needed. Bytes go to a hidden temporary
    /// file first and are renamed into place, so a reader never sees a
    /// partially written upload.
    pub async fn save(
        &self,
        kind: UploadKind,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        let dir = self.dir_for(kind);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = generate_file_name(extension);
        let tmp_path = dir.join(format!(".{file_name}.part"));
        let final_path = dir.join(&file_name);

        if let Err(e) = tokio::fs::write(&tmp_path, bytes).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        tokio::fs::rename(&tmp_path, &final_path).await?;

        debug!(path = %final_path.display(), size = bytes.len(), "upload stored");
        Ok(format!("/uploads/{}/{file_name}", kind.dir_name()))
    }

    /// Disk path for a public upload URL.
    ///
    /// Rejects anything outside `/uploads/` and any `..` component.
    pub fn path_for_url(&self, url: &str) -> Result<PathBuf, StorageError> {
        let relative = url
            .strip_prefix("/uploads/")
            .ok_or_else(|| StorageError::InvalidPath(url.to_string()))?;
        let relative = Path::new(relative);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidPath(url.to_string()));
        }
        Ok(self.public_dir.join("uploads").join(relative))
    }

    /// Read the bytes behind a public upload URL.
    pub async fn read(&self, url: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for_url(url)?;
        Ok(tokio::fs::read(path).await?)
    }

    /// Best-effort removal. Missing files and invalid paths are ignored.
    pub async fn remove(&self, url: &str) {
        let path = match self.path_for_url(url) {
            Ok(p) => p,
            Err(e) => {
                debug!(url, "skipping removal: {e}");
                return;
            }
        };
        if let Err(e) = tokio::fs::remove_file(&path).await {
            debug!(path = %path.display(), "upload removal ignored: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased_with_dot() {
        assert_eq!(extension_of("ID.JPG").as_deref(), Some(".jpg"));
        assert_eq!(extension_of("scan.final.pdf").as_deref(), Some(".pdf"));
        assert_eq!(extension_of("dir/photo.png").as_deref(), Some(".png"));
        assert_eq!(extension_of("C:\\fotos\\eu.jpeg").as_deref(), Some(".jpeg"));
    }

    #[test]
    fn no_extension_cases() {
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of(".png"), None);
        assert_eq!(extension_of("trailing."), None);
        assert_eq!(extension_of(""), None);
    }

    #[test]
    fn allow_lists_per_kind() {
        assert!(UploadKind::Avatar.accepts(".png"));
        assert!(!UploadKind::Avatar.accepts(".pdf"));
        assert!(UploadKind::Document.accepts(".pdf"));
        assert!(!UploadKind::Document.accepts(".exe"));
        assert!(!UploadKind::Document.accepts(".txt"));
    }

    #[test]
    fn image_urls() {
        assert!(is_image_url("/uploads/documents/1-abc.jpeg"));
        assert!(!is_image_url("/uploads/documents/1-abc.pdf"));
    }

    #[test]
    fn generated_names_keep_extension_and_differ() {
        let a = generate_file_name(".png");
        let b = generate_file_name(".png");
        assert!(a.ends_with(".png"));
        assert_ne!(a, b);
        let (millis, rest) = a.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(rest.len(), 6 + ".png".len());
    }

    #[test]
    fn url_paths_stay_inside_uploads() {
        let store = FileStore::new("/srv/public");
        assert_eq!(
            store.path_for_url("/uploads/avatars/a.png").unwrap(),
            PathBuf::from("/srv/public/uploads/avatars/a.png")
        );
        assert!(store.path_for_url("/uploads/../secret").is_err());
        assert!(store.path_for_url("/etc/passwd").is_err());
    }

    #[tokio::test]
    async fn save_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let url = store
            .save(UploadKind::Document, ".pdf", b"%PDF-1.4")
            .await
            .unwrap();
        assert!(url.starts_with("/uploads/documents/"));
        assert_eq!(store.read(&url).await.unwrap(), b"%PDF-1.4");

        // Only the final file remains; no temp leftovers.
        let entries: Vec<_> = std::fs::read_dir(store.dir_for(UploadKind::Document))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);

        store.remove(&url).await;
        assert!(!store.path_for_url(&url).unwrap().exists());
        // Second removal is a no-op.
        store.remove(&url).await;
    }
}

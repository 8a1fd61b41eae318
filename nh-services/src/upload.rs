//! Image uploads.
//!
//! Uploaded bytes arrive base64 encoded, are stored under a timestamped
//! name in the configured folder, then shared. Domain-scoped sharing is
//! tried first; if the store refuses it, anyone-with-link is used.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{info, warn};

use nh_core::error::{NhError, NhResult};

/// A folder in the file store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRef {
    pub id: String,
    pub name: String,
}

/// A stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
}

/// Who may open a shared file's link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharingScope {
    DomainWithLink,
    AnyoneWithLink,
}

/// File storage collaborator.
pub trait FileStore: Send + Sync {
    fn find_or_create_folder(&self, name: &str) -> NhResult<FolderRef>;

    fn create_file(
        &self,
        folder: &FolderRef,
        name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> NhResult<StoredFile>;

    fn set_sharing(&self, file: &StoredFile, scope: SharingScope) -> NhResult<()>;

    /// URL under which a shared file can be fetched.
    fn public_url(&self, file: &StoredFile) -> String;
}

/// Outcome of an upload, shaped for the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResult {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            file_id: None,
            file_name: None,
            file_path: None,
            file_url: None,
            error: Some(message.into()),
        }
    }
}

/// `<yyyyMMdd_HHmmss>_<base><.ext>`. The extension is whatever follows the
/// last dot; an empty base becomes `image`.
pub fn build_upload_name(original: &str, at: DateTime<Local>) -> String {
    let stamp = at.format("%Y%m%d_%H%M%S");
    let (base, ext) = match original.rsplit_once('.') {
        Some((base, ext)) => (base, format!(".{ext}")),
        None => (original, String::new()),
    };
    let base = if base.is_empty() { "image" } else { base };
    format!("{stamp}_{base}{ext}")
}

/// Stores uploads in the configured images folder.
pub struct UploadService {
    files: Arc<dyn FileStore>,
    folder_name: String,
}

impl UploadService {
    pub fn new(files: Arc<dyn FileStore>, folder_name: &str) -> Self {
        let folder_name = if folder_name.is_empty() {
            "notehub-images".to_string()
        } else {
            folder_name.to_string()
        };
        Self { files, folder_name }
    }

    /// Upload an image. Failures are reported in the result, never raised.
    pub fn upload(&self, original_name: &str, mime_type: &str, base64_data: &str) -> UploadResult {
        match self.try_upload(original_name, mime_type, base64_data, Local::now()) {
            Ok(result) => result,
            Err(e) => {
                warn!("image upload failed: {e}");
                UploadResult::failure(format!("upload failed: {e}"))
            }
        }
    }

    fn try_upload(
        &self,
        original_name: &str,
        mime_type: &str,
        base64_data: &str,
        at: DateTime<Local>,
    ) -> NhResult<UploadResult> {
        let bytes = BASE64
            .decode(base64_data.trim())
            .map_err(|e| NhError::InvalidInput(format!("invalid base64 payload: {e}")))?;

        let folder = self.files.find_or_create_folder(&self.folder_name)?;
        let name = build_upload_name(original_name, at);
        let file = self.files.create_file(&folder, &name, mime_type, &bytes)?;

        if let Err(domain_err) = self.files.set_sharing(&file, SharingScope::DomainWithLink) {
            warn!("domain sharing refused, falling back to anyone-with-link: {domain_err}");
            if let Err(e) = self.files.set_sharing(&file, SharingScope::AnyoneWithLink) {
                warn!("anyone-with-link sharing failed too: {e}");
                return Ok(UploadResult::failure(format!("failed to share file: {e}")));
            }
        }

        info!(file = %name, bytes = bytes.len(), "image uploaded");
        Ok(UploadResult {
            success: true,
            file_id: Some(file.id.clone()),
            file_name: Some(name.clone()),
            file_path: Some(format!("{}/{name}", folder.name)),
            file_url: Some(self.files.public_url(&file)),
            error: None,
        })
    }
}

/// Directory-backed [`FileStore`]. Folders are subdirectories of `root`;
/// file ids are paths relative to it.
///
/// A local directory has no notion of a sharing domain, so only
/// anyone-with-link sharing is accepted.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, file: &StoredFile) -> PathBuf {
        self.root.join(&file.id)
    }
}

fn check_component(name: &str) -> NhResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(NhError::InvalidInput(format!("invalid file name: {name:?}")));
    }
    Ok(())
}

impl FileStore for LocalFileStore {
    fn find_or_create_folder(&self, name: &str) -> NhResult<FolderRef> {
        check_component(name)?;
        let dir = self.root.join(name);
        std::fs::create_dir_all(&dir)
            .map_err(|e| NhError::FileStore(format!("create {}: {e}", dir.display())))?;
        Ok(FolderRef {
            id: name.to_string(),
            name: name.to_string(),
        })
    }

    fn create_file(
        &self,
        folder: &FolderRef,
        name: &str,
        _mime_type: &str,
        bytes: &[u8],
    ) -> NhResult<StoredFile> {
        check_component(name)?;
        let id = format!("{}/{name}", folder.id);
        let path = self.root.join(&id);
        std::fs::write(&path, bytes)
            .map_err(|e| NhError::FileStore(format!("write {}: {e}", path.display())))?;
        Ok(StoredFile {
            id,
            name: name.to_string(),
        })
    }

    fn set_sharing(&self, file: &StoredFile, scope: SharingScope) -> NhResult<()> {
        match scope {
            SharingScope::DomainWithLink => Err(NhError::FileStore(
                "domain sharing is not available for local files".into(),
            )),
            SharingScope::AnyoneWithLink => {
                if self.path_of(file).is_file() {
                    Ok(())
                } else {
                    Err(NhError::FileStore(format!("no such file: {}", file.id)))
                }
            }
        }
    }

    fn public_url(&self, file: &StoredFile) -> String {
        let path = self.path_of(file);
        url::Url::from_file_path(&path)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| path.display().to_string())
    }
}

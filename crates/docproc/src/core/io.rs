//! File I/O utilities.
//!
//! Loading a [`Document`] from disk, sync or async. I/O errors always bubble
//! up unchanged as `DocprocError::Io`.

use crate::core::document_type::{DocumentType, extension_of};
use crate::types::Document;
use crate::{DocprocError, Result};
use std::path::Path;

/// Read a file synchronously.
pub fn read_file_sync(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    std::fs::read(path.as_ref()).map_err(DocprocError::Io)
}

/// Read a file asynchronously.
#[cfg(feature = "tokio-runtime")]
pub async fn read_file_async(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    tokio::fs::read(path.as_ref()).await.map_err(DocprocError::Io)
}

/// Validate that a file exists.
///
/// # Errors
///
/// Returns `DocprocError::Validation` if the file doesn't exist.
pub fn validate_file_exists(path: impl AsRef<Path>) -> Result<()> {
    if !path.as_ref().exists() {
        return Err(DocprocError::validation(format!(
            "File does not exist: {}",
            path.as_ref().display()
        )));
    }
    Ok(())
}

impl Document {
    /// Load a document from disk, naming it after the file.
    ///
    /// The MIME type is guessed from the extension when it is a supported one.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        validate_file_exists(path)?;
        let content = read_file_sync(path)?;
        Ok(build_document(path, content))
    }

    /// Async counterpart of [`from_path`](Self::from_path).
    #[cfg(feature = "tokio-runtime")]
    pub async fn from_path_async(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        validate_file_exists(path)?;
        let content = read_file_async(path).await?;
        Ok(build_document(path, content))
    }
}

fn build_document(path: &Path, content: Vec<u8>) -> Document {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut document = Document::new(name, content);
    document.mime_type = DocumentType::from_extension(&extension_of(&document.name))
        .ok()
        .map(|t| t.mime_type().to_string());
    document
}

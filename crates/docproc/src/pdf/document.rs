use super::error::{PdfError, Result};
use lopdf::Document;

/// A parsed PDF, decrypted if it was encrypted with the empty password.
#[derive(Debug)]
pub struct LoadedPdf {
    pub document: Document,
    /// The trailer carries an `Encrypt` dictionary.
    pub was_encrypted: bool,
}

/// Load a PDF from memory, decrypting it with the empty password when the
/// trailer declares encryption.
///
/// # Errors
///
/// - `PdfError::PasswordRequired` when the document is encrypted and the
///   empty password does not open it
/// - `PdfError::IOError` / `PdfError::InvalidPdf` for anything else
pub fn load_pdf(bytes: &[u8]) -> Result<LoadedPdf> {
    let mut document = Document::load_mem(bytes).map_err(|err| {
        if is_password_error(&err) {
            tracing::debug!("Encrypted PDF failed to load: {}", err);
            PdfError::PasswordRequired
        } else {
            err.into()
        }
    })?;

    let was_encrypted = document.is_encrypted();
    // lopdf decrypts on load when the empty password authenticates
    if was_encrypted
        && document.encryption_state.is_none()
        && let Err(err) = document.decrypt("")
    {
        tracing::debug!("Empty-password decryption failed: {}", err);
        return Err(PdfError::PasswordRequired);
    }

    Ok(LoadedPdf {
        document,
        was_encrypted,
    })
}

fn is_password_error(err: &lopdf::Error) -> bool {
    matches!(err, lopdf::Error::Decryption(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::{build_encrypted_pdf, build_pdf};

    #[test]
    fn test_load_plain_pdf() {
        let loaded = load_pdf(&build_pdf(&["Hello"], None)).unwrap();
        assert_eq!(loaded.document.get_pages().len(), 1);
        assert!(!loaded.was_encrypted);
    }

    #[test]
    fn test_load_password_protected() {
        let err = load_pdf(&build_encrypted_pdf()).unwrap_err();
        assert!(matches!(err, PdfError::PasswordRequired));
    }

    #[test]
    fn test_load_garbage() {
        let err = load_pdf(b"definitely not a pdf").unwrap_err();
        assert!(!matches!(err, PdfError::PasswordRequired));
    }

    #[test]
    fn test_encrypt_token_in_content_is_not_encryption() {
        let loaded = load_pdf(&build_pdf(&["see the /Encrypt key"], None)).unwrap();
        assert!(!loaded.was_encrypted);
        assert!(!loaded.document.is_encrypted());
    }

    #[test]
    fn test_unreadable_file_mentioning_encrypt_is_invalid() {
        let err = load_pdf(b"garbage mentioning /Encrypt").unwrap_err();
        assert!(!matches!(err, PdfError::PasswordRequired));
    }

    #[test]
    fn test_password_error_classification() {
        let decryption = lopdf::Error::Decryption(lopdf::encryption::DecryptionError::IncorrectPassword);
        assert!(is_password_error(&decryption));
        assert!(!is_password_error(&lopdf::Error::NotEncrypted));
    }
}

//! Resume text extraction.
//!
//! PDFs go through `pdf-extract`; anything else is read as UTF-8 text.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from reading a document.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract text from PDF {path}: {message}")]
    Pdf { path: PathBuf, message: String },

    #[error("No text found in {path}")]
    Empty { path: PathBuf },
}

/// Document formats we know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => Self::Pdf,
            _ => Self::PlainText,
        }
    }
}

/// Extract plain text from a document.
///
/// Text that is empty after trimming is an error: there is nothing to screen.
pub fn extract_text(path: impl AsRef<Path>) -> Result<String, SourceError> {
    let path = path.as_ref();

    let text = match DocumentKind::from_path(path) {
        DocumentKind::Pdf => {
            let bytes = fs::read(path).map_err(|source| SourceError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| SourceError::Pdf {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        }
        DocumentKind::PlainText => fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?,
    };

    if text.trim().is_empty() {
        return Err(SourceError::Empty {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!(path = %path.display(), chars = text.chars().count(), "extracted document text");

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_path(Path::new("cv.pdf")), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_path(Path::new("CV.PDF")), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_path(Path::new("cv.txt")), DocumentKind::PlainText);
        assert_eq!(DocumentKind::from_path(Path::new("cv")), DocumentKind::PlainText);
    }

    #[test]
    fn test_extract_plain_text() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "Jane Doe\nPython, SQL").unwrap();

        let text = extract_text(file.path()).unwrap();
        assert_eq!(text, "Jane Doe\nPython, SQL");
    }

    #[test]
    fn test_missing_file() {
        let result = extract_text("/definitely/not/here/resume.txt");
        assert!(matches!(result, Err(SourceError::Io { .. })));
    }

    #[test]
    fn test_empty_file() {
        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        write!(file, "  \n\t").unwrap();

        let result = extract_text(file.path());
        assert!(matches!(result, Err(SourceError::Empty { .. })));
    }

    #[test]
    fn test_invalid_pdf() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        write!(file, "this is not a pdf").unwrap();

        let result = extract_text(file.path());
        assert!(matches!(result, Err(SourceError::Pdf { .. })));
    }
}

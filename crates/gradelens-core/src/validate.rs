//! Client-side input checks run before any request is issued.

use std::path::Path;

use thiserror::Error;

/// Largest answer sheet the store accepts.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unsupported file type {0:?}; expected pdf, png, jpg or jpeg")]
    UnsupportedFileType(String),

    #[error("file is empty")]
    EmptyFile,

    #[error("file too large: {size} bytes (max {max})")]
    FileTooLarge { size: usize, max: usize },

    #[error("file content does not look like a {0}")]
    BadSignature(&'static str),

    #[error("{0} must not be empty")]
    MissingField(&'static str),
}

/// Accepted answer-sheet formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Pdf,
    Png,
    Jpeg,
}

impl UploadKind {
    /// Detect the kind from a file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Result<Self, ValidationError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            _ => Err(ValidationError::UnsupportedFileType(ext)),
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Png => "PNG image",
            Self::Jpeg => "JPEG image",
        }
    }

    fn magic(self) -> &'static [u8] {
        match self {
            Self::Pdf => b"%PDF",
            Self::Png => b"\x89PNG\r\n\x1a\n",
            Self::Jpeg => &[0xFF, 0xD8, 0xFF],
        }
    }
}

/// Check an answer sheet before upload: extension, size and leading bytes.
pub fn upload(path: &Path, data: &[u8]) -> Result<UploadKind, ValidationError> {
    let kind = UploadKind::from_path(path)?;
    if data.is_empty() {
        return Err(ValidationError::EmptyFile);
    }
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(ValidationError::FileTooLarge {
            size: data.len(),
            max: MAX_UPLOAD_BYTES,
        });
    }
    if !data.starts_with(kind.magic()) {
        return Err(ValidationError::BadSignature(kind.name()));
    }
    Ok(kind)
}

/// Both title and text are required for a model answer.
pub fn model_answer(title: &str, text: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::MissingField("title"));
    }
    if text.trim().is_empty() {
        return Err(ValidationError::MissingField("model answer text"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn kind_from_extension() {
        assert_eq!(UploadKind::from_path(Path::new("a.pdf")), Ok(UploadKind::Pdf));
        assert_eq!(UploadKind::from_path(Path::new("scan.PNG")), Ok(UploadKind::Png));
        assert_eq!(UploadKind::from_path(Path::new("x.jpeg")), Ok(UploadKind::Jpeg));
        assert_eq!(UploadKind::from_path(Path::new("x.JPG")), Ok(UploadKind::Jpeg));
        assert_eq!(
            UploadKind::from_path(Path::new("notes.docx")),
            Err(ValidationError::UnsupportedFileType("docx".into()))
        );
        assert_eq!(
            UploadKind::from_path(Path::new("README")),
            Err(ValidationError::UnsupportedFileType(String::new()))
        );
    }

    #[test]
    fn mime_types() {
        assert_eq!(UploadKind::Pdf.mime(), "application/pdf");
        assert_eq!(UploadKind::Png.mime(), "image/png");
        assert_eq!(UploadKind::Jpeg.mime(), "image/jpeg");
    }

    #[test]
    fn accepts_valid_png() {
        assert_eq!(upload(Path::new("sheet.png"), PNG), Ok(UploadKind::Png));
    }

    #[test]
    fn accepts_valid_pdf() {
        assert_eq!(
            upload(Path::new("sheet.pdf"), b"%PDF-1.7\n..."),
            Ok(UploadKind::Pdf)
        );
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert_eq!(upload(Path::new("a.png"), b""), Err(ValidationError::EmptyFile));
        let big = vec![0u8; MAX_UPLOAD_BYTES + 1];
        assert!(matches!(
            upload(Path::new("a.pdf"), &big),
            Err(ValidationError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn rejects_mismatched_content() {
        assert_eq!(
            upload(Path::new("fake.pdf"), PNG),
            Err(ValidationError::BadSignature("PDF"))
        );
        assert_eq!(
            upload(Path::new("fake.jpg"), b"%PDF-1.4"),
            Err(ValidationError::BadSignature("JPEG image"))
        );
    }

    #[test]
    fn model_answer_requires_both_fields() {
        assert!(model_answer("Q1", "Answer").is_ok());
        assert_eq!(
            model_answer(" ", "Answer"),
            Err(ValidationError::MissingField("title"))
        );
        assert_eq!(
            model_answer("Q1", ""),
            Err(ValidationError::MissingField("model answer text"))
        );
    }
}

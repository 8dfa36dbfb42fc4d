use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extensions the data-entry form accepts for bills and invoices.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["pdf", "jpg", "png"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("path has no file name: {0}")]
    MissingFileName(String),
    #[error("unsupported evidence file type for {name} (expected PDF, JPG or PNG)")]
    UnsupportedType { name: String },
}

/// Uploaded evidence. Only the display name is kept; the content is never read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceFile {
    name: String,
}

impl EvidenceFile {
    pub fn from_path(path: &Path) -> Result<Self, IntakeError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| IntakeError::MissingFileName(path.display().to_string()))?;
        Self::from_name(name)
    }

    pub fn from_name(name: impl Into<String>) -> Result<Self, IntakeError> {
        let name = name.into();
        let accepted = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                ACCEPTED_EXTENSIONS
                    .iter()
                    .any(|a| a.eq_ignore_ascii_case(e))
            })
            .unwrap_or(false);
        if !accepted {
            return Err(IntakeError::UnsupportedType { name });
        }
        Ok(Self { name })
    }

    pub fn display_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_from_path() {
        let f = EvidenceFile::from_path(Path::new("/tmp/bills/march-energy.PDF")).unwrap();
        assert_eq!(f.display_name(), "march-energy.PDF");
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let err = EvidenceFile::from_name("invoice.docx").unwrap_err();
        assert!(matches!(err, IntakeError::UnsupportedType { .. }));
        assert!(EvidenceFile::from_name("noext").is_err());
    }

    #[test]
    fn test_rejects_path_without_name() {
        let err = EvidenceFile::from_path(Path::new("/")).unwrap_err();
        assert!(matches!(err, IntakeError::MissingFileName(_)));
    }
}

//! Export error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for export operations.
pub type XlsxExportResult<T> = std::result::Result<T, XlsxExportError>;

/// Coarse failure class, for deciding who has to fix what.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumExportErrorKind {
    /// Caller input is malformed.
    Input,
    /// Destination cannot be used.
    Environment,
    /// Data could not be serialized by the codec.
    Serialization,
}

/// Errors surfaced by [`crate::export::export_tables`].
#[derive(Debug, Error)]
pub enum XlsxExportError {
    /// Batch has no tables.
    #[error("No sheets provided")]
    EmptyBatch,

    /// At least one sheet name repeats within the batch.
    #[error("Duplicate sheet names found: {}", names.join(", "))]
    DuplicateName {
        /// Repeated names, sorted.
        names: Vec<String>,
    },

    /// Formatting configuration is unusable.
    #[error("Invalid export config: {0}")]
    InvalidConfig(String),

    /// Destination could not be opened or committed.
    #[error("Cannot write to {}: {message}", path.display())]
    Resource {
        /// Destination path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },

    /// Codec rejected a sheet or a write.
    #[error("Failed to write sheet {sheet_name:?}: {message}")]
    Write {
        /// Sheet being written (empty when the failure is workbook-wide).
        sheet_name: String,
        /// Underlying error text.
        message: String,
    },
}

impl XlsxExportError {
    /// Classify the error.
    pub fn kind(&self) -> EnumExportErrorKind {
        match self {
            Self::EmptyBatch | Self::DuplicateName { .. } | Self::InvalidConfig(_) => {
                EnumExportErrorKind::Input
            }
            Self::Resource { .. } => EnumExportErrorKind::Environment,
            Self::Write { .. } => EnumExportErrorKind::Serialization,
        }
    }

    pub(crate) fn write(sheet_name: &str, message: impl Into<String>) -> Self {
        Self::Write {
            sheet_name: sheet_name.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn resource(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Resource {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_separates_input_environment_and_serialization() {
        assert_eq!(XlsxExportError::EmptyBatch.kind(), EnumExportErrorKind::Input);
        assert_eq!(
            XlsxExportError::DuplicateName {
                names: vec!["S".to_string()]
            }
            .kind(),
            EnumExportErrorKind::Input
        );
        assert_eq!(
            XlsxExportError::resource("/nope/out.xlsx", "missing").kind(),
            EnumExportErrorKind::Environment
        );
        assert_eq!(
            XlsxExportError::write("S", "bad name").kind(),
            EnumExportErrorKind::Serialization
        );
    }

    #[test]
    fn test_display_names_the_duplicates() {
        let err = XlsxExportError::DuplicateName {
            names: vec!["A".to_string(), "B".to_string()],
        };
        assert_eq!(err.to_string(), "Duplicate sheet names found: A, B");
    }
}

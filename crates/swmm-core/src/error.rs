//! Unified error type for the conversion engine
//!
//! Every fatal condition of an import or export run is a [`SwmmError`]. A run
//! that returns an error produced no valid output; there is no partial file.
//!
//! # Example
//!
//! ```ignore
//! use swmm_core::{SwmmError, SwmmResult};
//!
//! fn convert(path: &str) -> SwmmResult<()> {
//!     let text = std::fs::read_to_string(path)?;
//!     let model = import_inp(&text)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Error type for all conversion operations.
#[derive(Error, Debug)]
pub enum SwmmError {
    /// Required columns are missing from a supplied layer or sheet
    #[error("Missing columns in {source_name}: {}", missing.join(", "))]
    SchemaViolation {
        source_name: String,
        missing: Vec<String>,
    },

    /// A foreign key that geometry construction depends on has no target
    #[error("Unresolved reference in [{section}]: object '{object}' refers to unknown '{reference}'")]
    UnresolvedJoinReference {
        section: String,
        object: String,
        reference: String,
    },

    /// Malformed section content
    #[error("Parse error in [{section}]: {message}")]
    Parse { section: String, message: String },

    /// Section dependencies form a cycle
    #[error("Dependency cycle involving section [{0}]")]
    DependencyCycle(String),

    /// Output folder or file cannot be written
    #[error("Output target unavailable: {path}: {reason}")]
    OutputTargetUnavailable { path: String, reason: String },

    /// The host asked the run to stop
    #[error("Conversion canceled")]
    Canceled,

    /// I/O errors while reading input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using SwmmError.
pub type SwmmResult<T> = Result<T, SwmmError>;

impl SwmmError {
    pub fn parse(section: &str, message: impl Into<String>) -> Self {
        SwmmError::Parse {
            section: section.to_string(),
            message: message.into(),
        }
    }

    pub fn schema(source_name: &str, missing: Vec<String>) -> Self {
        SwmmError::SchemaViolation {
            source_name: source_name.to_string(),
            missing,
        }
    }
}

impl From<anyhow::Error> for SwmmError {
    fn from(err: anyhow::Error) -> Self {
        SwmmError::Other(err.to_string())
    }
}

impl From<String> for SwmmError {
    fn from(s: String) -> Self {
        SwmmError::Other(s)
    }
}

impl From<&str> for SwmmError {
    fn from(s: &str) -> Self {
        SwmmError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_violation_lists_columns() {
        let err = SwmmError::schema(
            "Junctions Layer",
            vec!["MaxDepth".into(), "Aponded".into()],
        );
        let text = err.to_string();
        assert!(text.contains("Junctions Layer"));
        assert!(text.contains("MaxDepth, Aponded"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SwmmError = io_err.into();
        assert!(matches!(err, SwmmError::Io(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> SwmmResult<()> {
            Err(SwmmError::parse("CONDUITS", "bad length"))
        }

        fn outer() -> SwmmResult<()> {
            inner()?;
            Ok(())
        }

        let err = outer().unwrap_err();
        assert!(err.to_string().contains("[CONDUITS]"));
    }
}

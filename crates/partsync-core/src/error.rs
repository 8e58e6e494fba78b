//! Error types for the partition model

use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Partition tuple does not match the key schema
    E001ArityMismatch,
    /// E002: Partition component is not a valid time value
    E002InvalidComponent,
    /// E003: Dataset location is not a usable object-store URI
    E003InvalidLocation,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E001ArityMismatch => "E001",
            Self::E002InvalidComponent => "E002",
            Self::E003InvalidLocation => "E003",
        }
    }

    pub fn docs_url(&self) -> String {
        format!(
            "https://partsync.dev/troubleshooting.html#{}",
            self.as_str().to_lowercase()
        )
    }
}

/// Errors raised while building or interpreting partition values
#[derive(Debug, Error)]
pub enum PartitionError {
    /// Tuple length disagrees with the key schema. This is a caller bug and is never retried.
    #[error("[{code}] Partition tuple has {actual} values but the key schema has {expected} keys\n\nSee: {docs_url}")]
    ArityMismatch {
        code: &'static str,
        expected: usize,
        actual: usize,
        docs_url: String,
    },

    /// A component could not be interpreted as part of a timestamp
    #[error("[{code}] Invalid partition component '{value}' for key '{key}'\n\nSee: {docs_url}")]
    InvalidComponent {
        code: &'static str,
        key: String,
        value: String,
        docs_url: String,
    },

    /// Location URI could not be parsed
    #[error("[{code}] Invalid dataset location '{location}': {reason}\n\nSee: {docs_url}")]
    InvalidLocation {
        code: &'static str,
        location: String,
        reason: String,
        docs_url: String,
    },
}

impl PartitionError {
    /// Create an arity mismatch error with error code
    pub fn arity_mismatch(expected: usize, actual: usize) -> Self {
        let code_enum = ErrorCode::E001ArityMismatch;
        Self::ArityMismatch {
            code: code_enum.as_str(),
            expected,
            actual,
            docs_url: code_enum.docs_url(),
        }
    }

    /// Create an invalid component error with error code
    pub fn invalid_component(key: impl Into<String>, value: impl Into<String>) -> Self {
        let code_enum = ErrorCode::E002InvalidComponent;
        Self::InvalidComponent {
            code: code_enum.as_str(),
            key: key.into(),
            value: value.into(),
            docs_url: code_enum.docs_url(),
        }
    }

    /// Create an invalid location error with error code
    pub fn invalid_location(location: impl Into<String>, reason: impl Into<String>) -> Self {
        let code_enum = ErrorCode::E003InvalidLocation;
        Self::InvalidLocation {
            code: code_enum.as_str(),
            location: location.into(),
            reason: reason.into(),
            docs_url: code_enum.docs_url(),
        }
    }

    /// Error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::ArityMismatch { code, .. }
            | Self::InvalidComponent { code, .. }
            | Self::InvalidLocation { code, .. } => code,
        }
    }
}

/// Result type alias for PartitionError
pub type Result<T> = std::result::Result<T, PartitionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_in_messages() {
        let err = PartitionError::arity_mismatch(4, 3);
        assert_eq!(err.code(), "E001");
        let msg = err.to_string();
        assert!(msg.contains("[E001]"));
        assert!(msg.contains("3 values"));
        assert!(msg.contains("troubleshooting.html#e001"));
    }
}

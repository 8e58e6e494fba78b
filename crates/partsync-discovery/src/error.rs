//! Error types for partition discovery

use partsync_core::PartitionError;
use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E101: Dataset has no objects to anchor discovery to
    E101NoObjects,
    /// E102: Object key does not encode a partition
    E102UnparseableKey,
    /// E103: Object store unreachable or access denied
    E103ProbeFailure,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E101NoObjects => "E101",
            Self::E102UnparseableKey => "E102",
            Self::E103ProbeFailure => "E103",
        }
    }

    pub fn docs_url(&self) -> String {
        format!(
            "https://partsync.dev/troubleshooting.html#{}",
            self.as_str().to_lowercase()
        )
    }
}

/// Errors that can occur while discovering partitions
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Initial discovery found nothing to backfill from
    #[error("[{code}] No objects found under '{location}'; cannot determine the first partition\n\nTroubleshooting:\n  • Verify the dataset location and layout\n  • Check that log delivery has written at least one object\n\nSee: {docs_url}")]
    NoObjects {
        code: &'static str,
        location: String,
        docs_url: String,
    },

    /// First object key could not be mapped to a partition tuple
    #[error("[{code}] Object key '{key}' does not match the {layout} partition layout\n\nSee: {docs_url}")]
    UnparseableKey {
        code: &'static str,
        key: String,
        layout: String,
        docs_url: String,
    },

    /// Listing failed (network, permissions, throttling)
    #[error("[{code}] Object store probe failed for prefix '{prefix}': {reason}\n\nSee: {docs_url}")]
    Probe {
        code: &'static str,
        prefix: String,
        reason: String,
        retryable: bool,
        docs_url: String,
    },

    #[error(transparent)]
    Partition(#[from] PartitionError),
}

impl DiscoveryError {
    /// Create a no-objects error with error code
    pub fn no_objects(location: String) -> Self {
        let code_enum = ErrorCode::E101NoObjects;
        Self::NoObjects {
            code: code_enum.as_str(),
            location,
            docs_url: code_enum.docs_url(),
        }
    }

    /// Create an unparseable key error with error code
    pub fn unparseable_key(key: String, layout: String) -> Self {
        let code_enum = ErrorCode::E102UnparseableKey;
        Self::UnparseableKey {
            code: code_enum.as_str(),
            key,
            layout,
            docs_url: code_enum.docs_url(),
        }
    }

    /// Create a probe failure error with error code
    pub fn probe(prefix: String, reason: String, retryable: bool) -> Self {
        let code_enum = ErrorCode::E103ProbeFailure;
        Self::Probe {
            code: code_enum.as_str(),
            prefix,
            reason,
            retryable,
            docs_url: code_enum.docs_url(),
        }
    }

    /// Whether re-running the whole discovery may succeed
    ///
    /// Missing data and contract violations never heal on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Probe { retryable, .. } => *retryable,
            Self::NoObjects { .. } | Self::UnparseableKey { .. } | Self::Partition(_) => false,
        }
    }
}

/// Result type alias for DiscoveryError
pub type Result<T> = std::result::Result<T, DiscoveryError>;

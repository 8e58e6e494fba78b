//! Error types for catalog operations

use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E201: Catalog unreachable or connection failed
    E201CatalogUnreachable,
    /// E202: Catalog rejected the request
    E202RequestFailed,
    /// E203: Catalog response could not be decoded
    E203InvalidResponse,
    /// E204: Table does not exist
    E204TableNotFound,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E201CatalogUnreachable => "E201",
            Self::E202RequestFailed => "E202",
            Self::E203InvalidResponse => "E203",
            Self::E204TableNotFound => "E204",
        }
    }

    pub fn docs_url(&self) -> String {
        format!(
            "https://partsync.dev/troubleshooting.html#{}",
            self.as_str().to_lowercase()
        )
    }
}

/// Errors that can occur while talking to the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport-level failure
    #[error("[{code}] Catalog unreachable at '{endpoint}': {reason}\n\nTroubleshooting:\n  • Verify the catalog endpoint is reachable\n  • Check network access from this host\n\nSee: {docs_url}")]
    Unreachable {
        code: &'static str,
        endpoint: String,
        reason: String,
        docs_url: String,
    },

    /// Non-success response from the catalog
    #[error("[{code}] Catalog {operation} failed (HTTP {status}, {error_type}): {message}\n\nSee: {docs_url}")]
    Request {
        code: &'static str,
        operation: String,
        status: u16,
        error_type: String,
        message: String,
        docs_url: String,
    },

    /// Response body did not match the expected shape
    #[error("[{code}] Invalid catalog response for {operation}: {reason}\n\nSee: {docs_url}")]
    Decode {
        code: &'static str,
        operation: String,
        reason: String,
        docs_url: String,
    },

    /// Table missing from the catalog
    #[error("[{code}] Table '{database}.{table}' not found in catalog\n\nSee: {docs_url}")]
    TableNotFound {
        code: &'static str,
        database: String,
        table: String,
        docs_url: String,
    },
}

impl CatalogError {
    /// Create an unreachable error with error code
    pub fn unreachable(endpoint: String, reason: String) -> Self {
        let code_enum = ErrorCode::E201CatalogUnreachable;
        Self::Unreachable {
            code: code_enum.as_str(),
            endpoint,
            reason,
            docs_url: code_enum.docs_url(),
        }
    }

    /// Create a request failure error with error code
    pub fn request(operation: &str, status: u16, error_type: String, message: String) -> Self {
        let code_enum = ErrorCode::E202RequestFailed;
        Self::Request {
            code: code_enum.as_str(),
            operation: operation.to_string(),
            status,
            error_type,
            message,
            docs_url: code_enum.docs_url(),
        }
    }

    /// Create a decode error with error code
    pub fn decode(operation: &str, reason: String) -> Self {
        let code_enum = ErrorCode::E203InvalidResponse;
        Self::Decode {
            code: code_enum.as_str(),
            operation: operation.to_string(),
            reason,
            docs_url: code_enum.docs_url(),
        }
    }

    /// Create a table-not-found error with error code
    pub fn table_not_found(database: String, table: String) -> Self {
        let code_enum = ErrorCode::E204TableNotFound;
        Self::TableNotFound {
            code: code_enum.as_str(),
            database,
            table,
            docs_url: code_enum.docs_url(),
        }
    }

    /// Whether the same call may succeed if retried
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable { .. } => true,
            Self::Request {
                status, error_type, ..
            } => *status >= 500 || error_type.contains("Throttling"),
            Self::Decode { .. } | Self::TableNotFound { .. } => false,
        }
    }
}

/// Result type alias for CatalogError
pub type Result<T> = std::result::Result<T, CatalogError>;

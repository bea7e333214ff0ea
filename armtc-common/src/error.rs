use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ToolchainError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("HTTP Request Error: {0}")]
    Http(#[from] Arc<reqwest::Error>),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] Arc<serde_json::Error>),

    #[error("Directory Walk Error: {0}")]
    Walk(#[from] Arc<walkdir::Error>),

    #[error("The {tool} utility is required but missing! {hint}")]
    Environment { tool: String, hint: String },

    #[error("No link matching '{pattern}' found on {listing_url}")]
    Resolution { pattern: String, listing_url: String },

    #[error("TransferError: Failed to download '{0}' from '{1}': {2}")]
    Transfer(String, String, String),

    #[error("{step} exited with status {code}")]
    ExternalBuild { step: String, code: i32 },

    #[error("Unexpected layout: {0}")]
    DataShape(String),

    #[error("Checksum Mismatch: {0}")]
    ChecksumMismatch(String),

    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Extraction Error: {0}")]
    Extraction(String),

    #[error("Generic Error: {0}")]
    Generic(String),
}

impl ToolchainError {
    /// Process exit status for this error. A failed native build keeps its own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            ToolchainError::ExternalBuild { code, .. } if *code != 0 => *code,
            _ => 1,
        }
    }
}

impl From<std::io::Error> for ToolchainError {
    fn from(err: std::io::Error) -> Self {
        ToolchainError::Io(Arc::new(err))
    }
}

impl From<reqwest::Error> for ToolchainError {
    fn from(err: reqwest::Error) -> Self {
        ToolchainError::Http(Arc::new(err))
    }
}

impl From<serde_json::Error> for ToolchainError {
    fn from(err: serde_json::Error) -> Self {
        ToolchainError::Json(Arc::new(err))
    }
}

impl From<walkdir::Error> for ToolchainError {
    fn from(err: walkdir::Error) -> Self {
        ToolchainError::Walk(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, ToolchainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_build_keeps_child_exit_code() {
        let err = ToolchainError::ExternalBuild {
            step: "make install".to_string(),
            code: 2,
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn other_errors_exit_with_one() {
        let err = ToolchainError::Resolution {
            pattern: "lld-".to_string(),
            listing_url: "https://releases.llvm.org/download.html".to_string(),
        };
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("lld-"));
        assert!(err.to_string().contains("download.html"));
    }
}

//! Layered error definitions
//!
//! Categorized by source: config / sink protocol / io

use thiserror::Error;

use crate::Category;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sink Protocol Errors =====
    /// `accept` was called with no active frame context
    #[error("accept({category}) called with no active frame context")]
    PrecallViolation { category: Category },

    /// `accept` for a category the sink does not support
    #[error("sink '{sink_name}' does not support category '{category}'")]
    UnsupportedCategory {
        sink_name: String,
        category: Category,
    },

    /// `feed_frame` while staging records from the previous frame are pending
    #[error("feed_frame called with {staged} staged categories pending flush")]
    StagingNotFlushed { staged: usize },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create unsupported-category error
    pub fn unsupported_category(sink_name: impl Into<String>, category: Category) -> Self {
        Self::UnsupportedCategory {
            sink_name: sink_name.into(),
            category,
        }
    }
}

//! Error metadata shared by every pipeline error type.
//!
//! DESIGN
//! ======
//! Each module owns its own `thiserror` enum. This module only defines the
//! cross-cutting pieces: a grepable error code per variant, and the
//! operator-facing notice that the admin console renders.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code and retryable flag for structured error reporting.
///
/// `retryable` is advisory only. Nothing in the pipeline retries on its own;
/// the operator decides.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// OPERATOR NOTICE
// =============================================================================

/// Human-readable failure shown to the operator, with optional remediation
/// detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorNotice {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub code: String,
}

impl OperatorNotice {
    pub fn new(message: impl Into<String>, code: &'static str) -> Self {
        Self { message: message.into(), detail: None, code: code.to_string() }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

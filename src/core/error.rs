// This module defines the error types for codegen-strategy using the thiserror crate for
// idiomatic Rust error handling. RewriteError is what a payload IR reports when the rewrite
// behind a stage fails on one operation; StrategyError wraps it with the failing stage's
// index and kind so a run can abort on the first failure while keeping the original error
// intact as its source. BitcodeError covers device bitcode selection: NotFound when no
// catalog module matches the target descriptor (a non-fatal value, the caller decides
// whether to abort) and Parse when LLVM rejects the catalog bytes, carrying LLVM's message
// unchanged. StrategyResult<T> and BitcodeResult<T> are the matching Result aliases.

//! Error types for strategy execution and device bitcode loading.

use thiserror::Error;

use crate::llvm::target::TargetDescriptor;

/// Failure reported by a payload rewrite for a single operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RewriteError {
    pub message: String,
}

impl RewriteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors surfaced while running an emitted stage list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("stage {index} ({kind}) failed: {source}")]
    StageFailed {
        index: usize,
        kind: &'static str,
        #[source]
        source: RewriteError,
    },
}

impl StrategyError {
    /// The rewrite failure exactly as the payload reported it.
    pub fn rewrite_error(&self) -> &RewriteError {
        match self {
            StrategyError::StageFailed { source, .. } => source,
        }
    }
}

/// Errors from device bitcode selection and loading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitcodeError {
    #[error("no matching architecture bitcode file for {target}")]
    NotFound { target: TargetDescriptor },

    #[error("failed to parse device bitcode '{name}': {message}")]
    Parse { name: String, message: String },
}

/// Result type alias for strategy runs.
pub type StrategyResult<T> = Result<T, StrategyError>;

/// Result type alias for bitcode loading.
pub type BitcodeResult<T> = Result<T, BitcodeError>;

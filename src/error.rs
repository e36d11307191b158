use thiserror::Error;

/// Error taxonomy for the settlement engine.
///
/// `NotFound` and `Degenerate` are recoverable at the caller's discretion
/// (missing price quotes, zero-share pools). `InsufficientFunds` and
/// `Arithmetic` are fatal to the settlement transition that raised them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("degenerate: {0}")]
    Degenerate(String),
    #[error("insufficient funds in {account}: need {needed}, have {available}")]
    InsufficientFunds {
        account: String,
        needed: String,
        available: String,
    },
    #[error("arithmetic overflow: {0}")]
    Arithmetic(String),
}

impl EngineError {
    /// True for error kinds that must abort the whole settlement transition.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::InsufficientFunds { .. } | EngineError::Arithmetic(_)
        )
    }
}

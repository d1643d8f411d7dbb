use thiserror::Error;

/// Ledger validation failures.
///
/// Every operation is fail-closed: when one of these is returned, the
/// registry is untouched and nothing was published.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PulseError {
    #[error("Not verified")]
    NotVerified,

    #[error("Message must be 1-120 characters")]
    InvalidMessage,

    #[error("Pulse not found")]
    PulseNotFound,

    #[error("Can't resonate with your own pulse")]
    SelfResonance,

    #[error("Resonance amount must be 1-3")]
    InvalidAmount,

    #[error("Insufficient balance")]
    InsufficientBalance,
}

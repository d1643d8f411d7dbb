//! Trait seams for the external collaborators the core consumes.
//!
//! The core never calls these itself: the service layer drives identity
//! verification and payment authorization first and hands only their
//! boolean-success results to the ledger operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of an external identity verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityResult {
    pub success: bool,
    pub alien_id: String,
    pub display_name: String,
    pub proof_of_human: bool,
}

/// Outcome of an external payment authorization. The transaction id is an
/// opaque reference attached to a resonance, never validated by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResult {
    pub success: bool,
    pub transaction_id: String,
}

/// External identity collaborator.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self) -> IdentityResult;
}

/// External payment collaborator. Owns its own timeout policy; the core
/// only ever sees the returned result.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn send_payment(&self, recipient_id: &str, amount: u32, memo: &str) -> PaymentResult;
}

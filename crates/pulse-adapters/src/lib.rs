//! Mocked external collaborators for PULSE.
//!
//! The real deployment fronts an identity/payment host app; these adapters
//! reproduce its contract deterministically for local runs and tests.

#![deny(unsafe_code)]

pub mod insight;

use async_trait::async_trait;
use pulse_core::{IdentityProvider, IdentityResult, PaymentProvider, PaymentResult};
use rand::seq::SliceRandom;
use uuid::Uuid;

pub use insight::{
    EmotionalIntelligence, InsightAgent, InsightKind, MoodInsight, MoodShift, PulseSample,
};

const MOCK_NAMES: [&str; 10] = [
    "Starlight", "Moonbeam", "Sunflower", "Raindrop", "Snowflake", "Firefly", "Breeze", "Coral",
    "Willow", "Clover",
];

/// Mock identity bridge with a stable per-instance identity, standing in
/// for the host app's verification flow.
#[derive(Debug, Clone)]
pub struct MockIdentityBridge {
    alien_id: String,
    display_name: String,
}

impl MockIdentityBridge {
    /// A fresh random identity, kept for the lifetime of the bridge.
    pub fn new() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        let name = MOCK_NAMES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("Starlight");
        Self {
            alien_id: format!("alien_{}", &suffix[..8]),
            display_name: name.to_string(),
        }
    }

    /// A fixed identity, for tests.
    pub fn with_identity(alien_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            alien_id: alien_id.into(),
            display_name: display_name.into(),
        }
    }
}

impl Default for MockIdentityBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityBridge {
    async fn verify(&self) -> IdentityResult {
        IdentityResult {
            success: true,
            alien_id: self.alien_id.clone(),
            display_name: self.display_name.clone(),
            proof_of_human: true,
        }
    }
}

/// Mock payment bridge: every authorization succeeds with a fresh opaque
/// transaction reference.
#[derive(Debug, Clone, Default)]
pub struct MockPaymentBridge;

#[async_trait]
impl PaymentProvider for MockPaymentBridge {
    async fn send_payment(&self, _recipient_id: &str, _amount: u32, _memo: &str) -> PaymentResult {
        PaymentResult {
            success: true,
            transaction_id: format!("tx_{}", Uuid::new_v4().simple()),
        }
    }
}

/// Deterministic declining bridge useful for failure-path tests.
#[derive(Debug, Clone, Default)]
pub struct DecliningPaymentBridge;

#[async_trait]
impl PaymentProvider for DecliningPaymentBridge {
    async fn send_payment(&self, _recipient_id: &str, _amount: u32, _memo: &str) -> PaymentResult {
        PaymentResult {
            success: false,
            transaction_id: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identity_bridge_is_stable_per_instance() {
        let bridge = MockIdentityBridge::new();
        let first = bridge.verify().await;
        let second = bridge.verify().await;

        assert!(first.success);
        assert!(first.proof_of_human);
        assert!(first.alien_id.starts_with("alien_"));
        assert_eq!(first.alien_id, second.alien_id);
        assert_eq!(first.display_name, second.display_name);
    }

    #[tokio::test]
    async fn fixed_identity_is_returned_verbatim() {
        let bridge = MockIdentityBridge::with_identity("alien_t1", "Aria");
        let result = bridge.verify().await;
        assert_eq!(result.alien_id, "alien_t1");
        assert_eq!(result.display_name, "Aria");
    }

    #[tokio::test]
    async fn payment_bridge_issues_unique_references() {
        let bridge = MockPaymentBridge;
        let a = bridge.send_payment("alien_p01", 2, "resonate:p1").await;
        let b = bridge.send_payment("alien_p01", 2, "resonate:p1").await;

        assert!(a.success && b.success);
        assert!(a.transaction_id.starts_with("tx_"));
        assert_ne!(a.transaction_id, b.transaction_id);
    }

    #[tokio::test]
    async fn declining_bridge_never_authorizes() {
        let bridge = DecliningPaymentBridge;
        let result = bridge.send_payment("alien_p01", 1, "resonate:p1").await;
        assert!(!result.success);
    }
}

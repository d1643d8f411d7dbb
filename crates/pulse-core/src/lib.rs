//! PULSE core — the authoritative in-memory social ledger.
//!
//! Verified participants broadcast short emotion messages ("pulses"), spend
//! a scarce token balance to resonate with each other, and subscribe to a
//! synchronous event fan-out. This crate owns all entity storage and the
//! consistency rules around it: balance conservation, one active pulse per
//! user, and fail-closed validation on every mutating operation.

#![deny(unsafe_code)]

pub mod aggregation;
pub mod bus;
pub mod error;
pub mod ledger;
pub mod providers;
pub mod registry;
pub mod seed;
pub mod types;

pub use bus::{EventBus, EventSink, PulseEvent, SinkClosed, SubscriptionId};
pub use error::PulseError;
pub use ledger::{PulseEngine, PulseEngineConfig, INITIAL_BALANCE};
pub use providers::{IdentityProvider, IdentityResult, PaymentProvider, PaymentResult};
pub use registry::Registry;
pub use types::{
    ActivityItem, FeedResonance, Mood, Pulse, PulseStats, Resonance, User, UserState,
};

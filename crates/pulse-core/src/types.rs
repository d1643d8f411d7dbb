use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The eight fixed mood categories a pulse can carry.
///
/// Variant order is load-bearing: it is the first-seen enumeration order used
/// by `aggregation::stats` for tie-breaking and zero-filled distributions.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Joy,
    Gratitude,
    Hope,
    Calm,
    Energy,
    Love,
    Reflection,
    Determination,
}

impl Mood {
    /// All categories in canonical enumeration order.
    pub const ALL: [Mood; 8] = [
        Mood::Joy,
        Mood::Gratitude,
        Mood::Hope,
        Mood::Calm,
        Mood::Energy,
        Mood::Love,
        Mood::Reflection,
        Mood::Determination,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Joy => "joy",
            Mood::Gratitude => "gratitude",
            Mood::Hope => "hope",
            Mood::Calm => "calm",
            Mood::Energy => "energy",
            Mood::Love => "love",
            Mood::Reflection => "reflection",
            Mood::Determination => "determination",
        }
    }
}

/// A verified participant. Created on first registration, immutable after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// A short emotional broadcast owned by one user.
///
/// `user_name` is a snapshot captured at creation time, never live-joined
/// against the user table. Resonance counters only ever increase; the row
/// itself is never deleted, even after a newer pulse supersedes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pulse {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub emoji: String,
    pub message: String,
    pub mood: Mood,
    pub resonance_count: u64,
    pub resonance_total: u64,
    pub created_at: DateTime<Utc>,
    /// Galaxy placement in [0,1], presentation-only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// An append-only token transfer record from one user to a pulse's owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resonance {
    pub id: String,
    pub from_user_id: String,
    pub from_user_name: String,
    pub pulse_id: String,
    pub amount: u32,
    pub created_at: DateTime<Utc>,
    /// Opaque external transaction reference; never validated by the core.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_ref: Option<String>,
}

/// Per-user view assembled on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserState {
    pub balance: u32,
    pub active_pulse: Option<Pulse>,
    pub resonances_given: u64,
    pub resonances_received: u64,
}

/// Aggregate board statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseStats {
    pub total_pulses: u64,
    pub total_resonance: u64,
    pub top_mood: Mood,
    pub active_humans: u64,
    /// Count per category; every category is present, zero-filled.
    pub mood_distribution: BTreeMap<Mood, u64>,
}

/// A resonance as it appears in the activity feed, enriched with a snapshot
/// of the target pulse's emoji and owner name.
#[derive(Debug, Clone, Serialize)]
pub struct FeedResonance {
    #[serde(flatten)]
    pub resonance: Resonance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse_emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse_user_name: Option<String>,
}

/// One entry of the merged recent-activity feed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityItem {
    Pulse {
        data: Pulse,
        timestamp: DateTime<Utc>,
    },
    Resonance {
        data: FeedResonance,
        timestamp: DateTime<Utc>,
    },
}

impl ActivityItem {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ActivityItem::Pulse { timestamp, .. } => *timestamp,
            ActivityItem::Resonance { timestamp, .. } => *timestamp,
        }
    }
}

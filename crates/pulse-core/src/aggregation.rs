//! Read-only views derived from the registry on demand.
//!
//! Nothing here caches or mutates; each function reflects the latest
//! committed state at call time. Callers are expected to hold the engine's
//! exclusion while a view is assembled so it is a consistent snapshot.

use crate::registry::Registry;
use crate::types::{ActivityItem, FeedResonance, Mood, Pulse, PulseStats, UserState};
use std::collections::{BTreeMap, HashSet};

pub fn user_state(registry: &Registry, user_id: &str) -> UserState {
    let balance = registry.balance(user_id);
    let active_pulse = registry
        .active_pulse_id(user_id)
        .and_then(|pulse_id| registry.pulse(pulse_id))
        .cloned();
    let resonances_given = registry
        .resonances()
        .iter()
        .filter(|r| r.from_user_id == user_id)
        .count() as u64;
    let resonances_received = registry
        .resonances()
        .iter()
        .filter(|r| {
            registry
                .pulse(&r.pulse_id)
                .map(|p| p.user_id == user_id)
                .unwrap_or(false)
        })
        .count() as u64;

    UserState {
        balance,
        active_pulse,
        resonances_given,
        resonances_received,
    }
}

/// Every pulse currently in the active index, hottest first.
///
/// The sort is stable over insertion order, so pulses with equal totals keep
/// their original relative order.
pub fn active_pulses(registry: &Registry) -> Vec<Pulse> {
    let active: HashSet<&str> = registry.active_pulse_ids().collect();
    let mut pulses: Vec<Pulse> = registry
        .pulses()
        .iter()
        .filter(|p| active.contains(p.id.as_str()))
        .cloned()
        .collect();
    pulses.sort_by(|a, b| b.resonance_total.cmp(&a.resonance_total));
    pulses
}

/// Full pulse history, newest first.
pub fn all_pulses(registry: &Registry) -> Vec<Pulse> {
    let mut pulses = registry.pulses().to_vec();
    pulses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    pulses
}

pub fn stats(registry: &Registry) -> PulseStats {
    let mut mood_distribution: BTreeMap<Mood, u64> =
        Mood::ALL.iter().map(|mood| (*mood, 0)).collect();
    for pulse in registry.pulses() {
        if let Some(count) = mood_distribution.get_mut(&pulse.mood) {
            *count += 1;
        }
    }

    // Strictly-greater keeps the first-seen key on ties.
    let mut top_mood = Mood::ALL[0];
    for mood in Mood::ALL {
        if mood_distribution[&mood] > mood_distribution[&top_mood] {
            top_mood = mood;
        }
    }

    PulseStats {
        total_pulses: registry.pulses().len() as u64,
        total_resonance: registry
            .resonances()
            .iter()
            .map(|r| u64::from(r.amount))
            .sum(),
        top_mood,
        active_humans: registry.user_count() as u64,
        mood_distribution,
    }
}

/// Merge the last `limit` pulses and last `limit` resonances (by insertion
/// order) into one feed, newest first, truncated to `limit`.
pub fn recent_activity(registry: &Registry, limit: usize) -> Vec<ActivityItem> {
    let mut activity = Vec::with_capacity(limit * 2);

    let pulses = registry.pulses();
    for pulse in &pulses[pulses.len().saturating_sub(limit)..] {
        activity.push(ActivityItem::Pulse {
            timestamp: pulse.created_at,
            data: pulse.clone(),
        });
    }

    let resonances = registry.resonances();
    for resonance in &resonances[resonances.len().saturating_sub(limit)..] {
        let pulse = registry.pulse(&resonance.pulse_id);
        activity.push(ActivityItem::Resonance {
            timestamp: resonance.created_at,
            data: FeedResonance {
                resonance: resonance.clone(),
                pulse_emoji: pulse.map(|p| p.emoji.clone()),
                pulse_user_name: pulse.map(|p| p.user_name.clone()),
            },
        });
    }

    activity.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    activity.truncate(limit);
    activity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Resonance;
    use chrono::{Duration, Utc};

    fn pulse_at(id: &str, user_id: &str, mood: Mood, total: u64, offset_secs: i64) -> Pulse {
        Pulse {
            id: id.to_string(),
            user_id: user_id.to_string(),
            user_name: format!("user-{user_id}"),
            emoji: "✨".to_string(),
            message: "hello".to_string(),
            mood,
            resonance_count: total,
            resonance_total: total,
            created_at: Utc::now() + Duration::seconds(offset_secs),
            x: None,
            y: None,
        }
    }

    fn resonance_at(id: &str, from: &str, pulse_id: &str, amount: u32, offset_secs: i64) -> Resonance {
        Resonance {
            id: id.to_string(),
            from_user_id: from.to_string(),
            from_user_name: format!("user-{from}"),
            pulse_id: pulse_id.to_string(),
            amount,
            created_at: Utc::now() + Duration::seconds(offset_secs),
            tx_ref: None,
        }
    }

    #[test]
    fn active_pulses_sorts_by_total_with_stable_ties() {
        let mut registry = Registry::new();
        registry.put_pulse(pulse_at("p1", "u1", Mood::Joy, 2, 0));
        registry.put_pulse(pulse_at("p2", "u2", Mood::Joy, 5, 1));
        registry.put_pulse(pulse_at("p3", "u3", Mood::Joy, 2, 2));
        registry.put_pulse(pulse_at("p4", "u4", Mood::Joy, 0, 3));
        registry.set_active_pulse("u1", "p1");
        registry.set_active_pulse("u2", "p2");
        registry.set_active_pulse("u3", "p3");

        let active = active_pulses(&registry);
        let ids: Vec<&str> = active.iter().map(|p| p.id.as_str()).collect();
        // p4 is history-only; p1 and p3 tie and keep insertion order.
        assert_eq!(ids, ["p2", "p1", "p3"]);
    }

    #[test]
    fn stats_zero_fills_distribution_and_breaks_ties_first_seen() {
        let registry = Registry::new();
        let empty = stats(&registry);
        assert_eq!(empty.total_pulses, 0);
        assert_eq!(empty.top_mood, Mood::Joy);
        assert_eq!(empty.mood_distribution.len(), 8);
        assert!(empty.mood_distribution.values().all(|&count| count == 0));

        let mut registry = Registry::new();
        registry.put_pulse(pulse_at("p1", "u1", Mood::Calm, 0, 0));
        registry.put_pulse(pulse_at("p2", "u2", Mood::Hope, 0, 1));
        registry.put_pulse(pulse_at("p3", "u3", Mood::Calm, 0, 2));
        registry.put_pulse(pulse_at("p4", "u4", Mood::Hope, 0, 3));

        // Hope and Calm tie at 2; Hope is seen first in Mood::ALL.
        let result = stats(&registry);
        assert_eq!(result.top_mood, Mood::Hope);
        assert_eq!(result.mood_distribution[&Mood::Calm], 2);
        assert_eq!(result.mood_distribution[&Mood::Joy], 0);
        let total: u64 = result.mood_distribution.values().sum();
        assert_eq!(total, result.total_pulses);
    }

    #[test]
    fn stats_counts_every_pulse_and_resonance_ever_recorded() {
        let mut registry = Registry::new();
        registry.put_pulse(pulse_at("p1", "u1", Mood::Joy, 0, 0));
        registry.put_pulse(pulse_at("p2", "u1", Mood::Love, 0, 1));
        registry.set_active_pulse("u1", "p2");
        registry.push_resonance(resonance_at("r1", "u2", "p1", 2, 2));
        registry.push_resonance(resonance_at("r2", "u2", "p2", 3, 3));

        let result = stats(&registry);
        // Superseded pulses still count.
        assert_eq!(result.total_pulses, 2);
        assert_eq!(result.total_resonance, 5);
    }

    #[test]
    fn user_state_counts_given_and_received() {
        let mut registry = Registry::new();
        registry.put_pulse(pulse_at("p1", "u1", Mood::Joy, 0, 0));
        registry.put_pulse(pulse_at("p2", "u2", Mood::Calm, 0, 1));
        registry.set_active_pulse("u1", "p1");
        registry.set_balance("u1", 12);
        registry.push_resonance(resonance_at("r1", "u2", "p1", 2, 2));
        registry.push_resonance(resonance_at("r2", "u2", "p1", 1, 3));
        registry.push_resonance(resonance_at("r3", "u1", "p2", 3, 4));

        let state = user_state(&registry, "u1");
        assert_eq!(state.balance, 12);
        assert_eq!(state.active_pulse.as_ref().map(|p| p.id.as_str()), Some("p1"));
        assert_eq!(state.resonances_given, 1);
        assert_eq!(state.resonances_received, 2);

        let stranger = user_state(&registry, "nobody");
        assert_eq!(stranger.balance, 0);
        assert!(stranger.active_pulse.is_none());
    }

    #[test]
    fn recent_activity_merges_and_truncates_newest_first() {
        let mut registry = Registry::new();
        registry.put_pulse(pulse_at("p1", "u1", Mood::Joy, 0, 0));
        registry.put_pulse(pulse_at("p2", "u2", Mood::Calm, 0, 20));
        registry.push_resonance(resonance_at("r1", "u2", "p1", 2, 10));
        registry.push_resonance(resonance_at("r2", "u1", "p2", 1, 30));

        let feed = recent_activity(&registry, 3);
        assert_eq!(feed.len(), 3);
        let kinds: Vec<&str> = feed
            .iter()
            .map(|item| match item {
                ActivityItem::Pulse { .. } => "pulse",
                ActivityItem::Resonance { .. } => "resonance",
            })
            .collect();
        assert_eq!(kinds, ["resonance", "pulse", "resonance"]);

        // Resonance entries carry the target pulse snapshot.
        if let ActivityItem::Resonance { data, .. } = &feed[0] {
            assert_eq!(data.resonance.id, "r2");
            assert_eq!(data.pulse_user_name.as_deref(), Some("user-u2"));
            assert_eq!(data.pulse_emoji.as_deref(), Some("✨"));
        } else {
            panic!("expected resonance first");
        }
    }

    #[test]
    fn recent_activity_window_takes_last_n_of_each_kind() {
        let mut registry = Registry::new();
        for i in 0..5 {
            registry.put_pulse(pulse_at(&format!("p{i}"), "u1", Mood::Joy, 0, i));
        }

        let feed = recent_activity(&registry, 2);
        let ids: Vec<String> = feed
            .iter()
            .map(|item| match item {
                ActivityItem::Pulse { data, .. } => data.id.clone(),
                ActivityItem::Resonance { data, .. } => data.resonance.id.clone(),
            })
            .collect();
        assert_eq!(ids, ["p4", "p3"]);
    }

    #[test]
    fn all_pulses_returns_history_newest_first() {
        let mut registry = Registry::new();
        registry.put_pulse(pulse_at("p1", "u1", Mood::Joy, 0, 0));
        registry.put_pulse(pulse_at("p2", "u2", Mood::Calm, 0, 5));
        registry.put_pulse(pulse_at("p3", "u3", Mood::Hope, 0, 2));

        let history = all_pulses(&registry);
        let ids: Vec<&str> = history.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p2", "p3", "p1"]);
    }
}

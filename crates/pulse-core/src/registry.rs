use crate::types::{Pulse, Resonance, User};
use std::collections::HashMap;

/// Pure entity storage. No validation lives here; the ledger operations in
/// [`crate::ledger`] are the only writers and enforce every invariant before
/// touching it.
///
/// Pulses and resonances are kept in insertion order (Vec-backed, with a
/// HashMap id index for O(1) pulse lookup) because the aggregator's
/// tie-break rules are all defined in terms of insertion order.
#[derive(Debug, Default)]
pub struct Registry {
    users: HashMap<String, User>,
    pulses: Vec<Pulse>,
    pulse_index: HashMap<String, usize>,
    resonances: Vec<Resonance>,
    balances: HashMap<String, u32>,
    /// user id -> currently active pulse id (at most one per user).
    active_pulses: HashMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- users ----

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    pub fn put_user(&mut self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    // ---- pulses ----

    pub fn pulse(&self, id: &str) -> Option<&Pulse> {
        self.pulse_index.get(id).map(|&at| &self.pulses[at])
    }

    pub fn put_pulse(&mut self, pulse: Pulse) {
        self.pulse_index.insert(pulse.id.clone(), self.pulses.len());
        self.pulses.push(pulse);
    }

    /// All pulses in insertion order.
    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    /// Bump a pulse's resonance counters; returns the updated row.
    pub fn apply_resonance(&mut self, pulse_id: &str, amount: u32) -> Option<Pulse> {
        let at = *self.pulse_index.get(pulse_id)?;
        let pulse = &mut self.pulses[at];
        pulse.resonance_count += 1;
        pulse.resonance_total += u64::from(amount);
        Some(pulse.clone())
    }

    // ---- resonances ----

    /// All resonances in insertion order.
    pub fn resonances(&self) -> &[Resonance] {
        &self.resonances
    }

    pub fn push_resonance(&mut self, resonance: Resonance) {
        self.resonances.push(resonance);
    }

    // ---- balances ----

    /// A missing entry reads as zero, matching an unregistered user.
    pub fn balance(&self, user_id: &str) -> u32 {
        self.balances.get(user_id).copied().unwrap_or(0)
    }

    pub fn set_balance(&mut self, user_id: &str, amount: u32) {
        self.balances.insert(user_id.to_string(), amount);
    }

    pub fn balances(&self) -> impl Iterator<Item = (&str, u32)> {
        self.balances.iter().map(|(id, amount)| (id.as_str(), *amount))
    }

    // ---- active-pulse index ----

    pub fn active_pulse_id(&self, user_id: &str) -> Option<&str> {
        self.active_pulses.get(user_id).map(String::as_str)
    }

    pub fn set_active_pulse(&mut self, user_id: &str, pulse_id: &str) {
        self.active_pulses
            .insert(user_id.to_string(), pulse_id.to_string());
    }

    /// Retire a user's active pulse. The pulse row stays in history.
    pub fn clear_active_pulse(&mut self, user_id: &str) {
        self.active_pulses.remove(user_id);
    }

    pub fn active_pulse_ids(&self) -> impl Iterator<Item = &str> {
        self.active_pulses.values().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Mood;
    use chrono::Utc;

    fn pulse(id: &str, user_id: &str) -> Pulse {
        Pulse {
            id: id.to_string(),
            user_id: user_id.to_string(),
            user_name: "Aria".to_string(),
            emoji: "✨".to_string(),
            message: "hello".to_string(),
            mood: Mood::Joy,
            resonance_count: 0,
            resonance_total: 0,
            created_at: Utc::now(),
            x: None,
            y: None,
        }
    }

    #[test]
    fn pulses_keep_insertion_order() {
        let mut registry = Registry::new();
        registry.put_pulse(pulse("p1", "u1"));
        registry.put_pulse(pulse("p2", "u2"));
        registry.put_pulse(pulse("p3", "u1"));

        let ids: Vec<&str> = registry.pulses().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p1", "p2", "p3"]);
        assert_eq!(registry.pulse("p2").unwrap().user_id, "u2");
        assert!(registry.pulse("p9").is_none());
    }

    #[test]
    fn apply_resonance_bumps_counters() {
        let mut registry = Registry::new();
        registry.put_pulse(pulse("p1", "u1"));

        let updated = registry.apply_resonance("p1", 3).unwrap();
        assert_eq!(updated.resonance_count, 1);
        assert_eq!(updated.resonance_total, 3);

        let updated = registry.apply_resonance("p1", 1).unwrap();
        assert_eq!(updated.resonance_count, 2);
        assert_eq!(updated.resonance_total, 4);

        assert!(registry.apply_resonance("missing", 1).is_none());
    }

    #[test]
    fn missing_balance_reads_as_zero() {
        let mut registry = Registry::new();
        assert_eq!(registry.balance("u1"), 0);
        registry.set_balance("u1", 10);
        assert_eq!(registry.balance("u1"), 10);
    }

    #[test]
    fn active_index_holds_one_pulse_per_user() {
        let mut registry = Registry::new();
        registry.set_active_pulse("u1", "p1");
        registry.set_active_pulse("u1", "p2");
        assert_eq!(registry.active_pulse_id("u1"), Some("p2"));

        registry.clear_active_pulse("u1");
        assert_eq!(registry.active_pulse_id("u1"), None);
    }
}

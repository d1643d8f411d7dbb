use crate::aggregation;
use crate::bus::{EventBus, EventSink, PulseEvent, SubscriptionId};
use crate::error::PulseError;
use crate::registry::Registry;
use crate::types::{ActivityItem, Mood, Pulse, PulseStats, Resonance, User, UserState};
use chrono::Utc;
use rand::Rng;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Tokens granted once to every newly registered user.
pub const INITIAL_BALANCE: u32 = 10;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct PulseEngineConfig {
    /// One-time registration grant. The sum of all balances stays at
    /// `initial_balance * registered users` forever after (resonance is a
    /// transfer, never a mint).
    pub initial_balance: u32,
}

impl Default for PulseEngineConfig {
    fn default() -> Self {
        Self {
            initial_balance: INITIAL_BALANCE,
        }
    }
}

pub(crate) struct EngineState {
    pub(crate) registry: Registry,
    pub(crate) bus: EventBus,
}

/// The authoritative state store and resonance economy.
///
/// All ledger operations and aggregator reads go through one coarse lock:
/// debit+credit and the active-index swap are multi-field updates, so the
/// critical section spans the whole read-validate-mutate-publish sequence
/// and every read observes a consistent snapshot. Events are published
/// inside the section, so an operation's result is not returned to its
/// caller before fan-out has finished.
pub struct PulseEngine {
    state: Mutex<EngineState>,
    config: PulseEngineConfig,
}

impl Default for PulseEngine {
    fn default() -> Self {
        Self::new(PulseEngineConfig::default())
    }
}

impl PulseEngine {
    pub fn new(config: PulseEngineConfig) -> Self {
        Self {
            state: Mutex::new(EngineState {
                registry: Registry::new(),
                bus: EventBus::new(),
            }),
            config,
        }
    }

    /// Operations never panic while holding the lock, so a poisoned mutex
    /// still guards consistent state; recover the guard instead of
    /// surfacing a non-domain error.
    pub(crate) fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- event bus ----

    pub fn subscribe(&self, sink: Box<dyn EventSink>) -> SubscriptionId {
        self.state().bus.subscribe(sink)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state().bus.unsubscribe(id)
    }

    // ---- ledger operations ----

    /// Register a verified user. Idempotent: a repeat call returns the
    /// existing record unchanged and neither grants tokens nor publishes.
    pub fn register_user(&self, alien_id: &str, display_name: &str) -> User {
        let mut state = self.state();
        if let Some(existing) = state.registry.user(alien_id) {
            return existing.clone();
        }

        let user = User {
            id: alien_id.to_string(),
            display_name: display_name.to_string(),
            verified: true,
            created_at: Utc::now(),
        };
        state.registry.put_user(user.clone());
        state.registry.set_balance(alien_id, self.config.initial_balance);
        state.bus.publish(&PulseEvent::UserJoined {
            id: user.id.clone(),
            name: user.display_name.clone(),
        });
        user
    }

    /// Broadcast a new pulse, retiring the caller's previous active one.
    ///
    /// The retired pulse stays in history with its accumulated resonance;
    /// only the active index forgets it.
    pub fn create_pulse(
        &self,
        user_id: &str,
        emoji: &str,
        message: &str,
        mood: Mood,
    ) -> Result<Pulse, PulseError> {
        let mut state = self.state();

        let user_name = match state.registry.user(user_id) {
            Some(user) => user.display_name.clone(),
            None => return Err(PulseError::NotVerified),
        };
        let message = message.trim();
        if message.is_empty() || message.chars().count() > 120 {
            return Err(PulseError::InvalidMessage);
        }

        // Index swap happens before the new pulse is marked active; inside
        // the critical section there is no window where the user has two
        // active pulses.
        state.registry.clear_active_pulse(user_id);

        let (x, y) = galaxy_placement();
        let pulse = Pulse {
            id: format!("pulse_{}", Uuid::new_v4().simple()),
            user_id: user_id.to_string(),
            user_name,
            emoji: emoji.to_string(),
            message: message.to_string(),
            mood,
            resonance_count: 0,
            resonance_total: 0,
            created_at: Utc::now(),
            x: Some(x),
            y: Some(y),
        };
        state.registry.put_pulse(pulse.clone());
        state.registry.set_active_pulse(user_id, &pulse.id);
        state.bus.publish(&PulseEvent::NewPulse(pulse.clone()));
        Ok(pulse)
    }

    /// Transfer `amount` tokens from `from_user_id` to the owner of
    /// `pulse_id`, recording the resonance.
    ///
    /// All five validations run before any mutation; on failure nothing is
    /// debited, appended, or published.
    pub fn add_resonance(
        &self,
        from_user_id: &str,
        pulse_id: &str,
        amount: u32,
        tx_ref: Option<String>,
    ) -> Result<Resonance, PulseError> {
        let mut state = self.state();

        let from_user_name = match state.registry.user(from_user_id) {
            Some(user) => user.display_name.clone(),
            None => return Err(PulseError::NotVerified),
        };
        let owner_id = match state.registry.pulse(pulse_id) {
            Some(pulse) => pulse.user_id.clone(),
            None => return Err(PulseError::PulseNotFound),
        };
        if owner_id == from_user_id {
            return Err(PulseError::SelfResonance);
        }
        if !(1..=3).contains(&amount) {
            return Err(PulseError::InvalidAmount);
        }
        let sender_balance = state.registry.balance(from_user_id);
        if sender_balance < amount {
            return Err(PulseError::InsufficientBalance);
        }

        let resonance = Resonance {
            id: format!("res_{}", Uuid::new_v4().simple()),
            from_user_id: from_user_id.to_string(),
            from_user_name,
            pulse_id: pulse_id.to_string(),
            amount,
            created_at: Utc::now(),
            tx_ref,
        };

        state.registry.set_balance(from_user_id, sender_balance - amount);
        let owner_balance = state.registry.balance(&owner_id);
        state.registry.set_balance(&owner_id, owner_balance + amount);
        state.registry.push_resonance(resonance.clone());
        let pulse = state
            .registry
            .apply_resonance(pulse_id, amount)
            .ok_or(PulseError::PulseNotFound)?;

        state.bus.publish(&PulseEvent::Resonance {
            resonance: resonance.clone(),
            pulse,
        });
        Ok(resonance)
    }

    // ---- aggregator reads ----

    pub fn pulse(&self, pulse_id: &str) -> Option<Pulse> {
        self.state().registry.pulse(pulse_id).cloned()
    }

    pub fn user(&self, user_id: &str) -> Option<User> {
        self.state().registry.user(user_id).cloned()
    }

    pub fn user_state(&self, user_id: &str) -> UserState {
        aggregation::user_state(&self.state().registry, user_id)
    }

    pub fn active_pulses(&self) -> Vec<Pulse> {
        aggregation::active_pulses(&self.state().registry)
    }

    pub fn all_pulses(&self) -> Vec<Pulse> {
        aggregation::all_pulses(&self.state().registry)
    }

    pub fn stats(&self) -> PulseStats {
        aggregation::stats(&self.state().registry)
    }

    pub fn recent_activity(&self, limit: usize) -> Vec<ActivityItem> {
        aggregation::recent_activity(&self.state().registry, limit)
    }
}

/// Presentation-only galaxy coordinates, away from the edges.
fn galaxy_placement() -> (f64, f64) {
    let mut rng = rand::thread_rng();
    (rng.gen_range(0.15..0.85), rng.gen_range(0.15..0.85))
}

//! Demo fixture data for demonstrations and local development.

use crate::ledger::PulseEngine;
use crate::types::{Mood, Pulse, User};
use chrono::{Duration, Utc};
use rand::Rng;

struct DemoPulse {
    user_id: &'static str,
    emoji: &'static str,
    message: &'static str,
    mood: Mood,
    resonance: u64,
}

const DEMO_USERS: [(&str, &str); 12] = [
    ("alien_p01", "Aria"),
    ("alien_p02", "Zephyr"),
    ("alien_p03", "Luna"),
    ("alien_p04", "Kai"),
    ("alien_p05", "Ember"),
    ("alien_p06", "Nova"),
    ("alien_p07", "Sage"),
    ("alien_p08", "River"),
    ("alien_p09", "Phoenix"),
    ("alien_p10", "Wren"),
    ("alien_p11", "Indigo"),
    ("alien_p12", "Soleil"),
];

const DEMO_PULSES: [DemoPulse; 12] = [
    DemoPulse { user_id: "alien_p01", emoji: "✨", message: "Building something that matters today. This feeling is everything.", mood: Mood::Determination, resonance: 5 },
    DemoPulse { user_id: "alien_p02", emoji: "🌊", message: "Found stillness in the chaos of a hackathon. Breathing.", mood: Mood::Calm, resonance: 3 },
    DemoPulse { user_id: "alien_p03", emoji: "💛", message: "A stranger just helped me fix a bug. Humans are amazing.", mood: Mood::Gratitude, resonance: 8 },
    DemoPulse { user_id: "alien_p04", emoji: "🚀", message: "3 hours in and the code is FLOWING. Pure creative energy.", mood: Mood::Energy, resonance: 4 },
    DemoPulse { user_id: "alien_p05", emoji: "🌅", message: "We're building the future in this room right now.", mood: Mood::Hope, resonance: 6 },
    DemoPulse { user_id: "alien_p06", emoji: "😄", message: "Just had the best conversation of my life in the elevator.", mood: Mood::Joy, resonance: 7 },
    DemoPulse { user_id: "alien_p07", emoji: "💭", message: "What if identity is the foundation of everything good online?", mood: Mood::Reflection, resonance: 4 },
    DemoPulse { user_id: "alien_p08", emoji: "❤️", message: "To everyone here: you belong. You are enough.", mood: Mood::Love, resonance: 12 },
    DemoPulse { user_id: "alien_p09", emoji: "⚡", message: "Sleep is for after the demo. Let's SHIP.", mood: Mood::Energy, resonance: 6 },
    DemoPulse { user_id: "alien_p10", emoji: "🙏", message: "Thank you Frontier Tower for this space. Magic happens here.", mood: Mood::Gratitude, resonance: 5 },
    DemoPulse { user_id: "alien_p11", emoji: "🔮", message: "Somewhere in this building is the next big thing. I can feel it.", mood: Mood::Hope, resonance: 3 },
    DemoPulse { user_id: "alien_p12", emoji: "🥰", message: "My team just surprised me with coffee. It's the little things.", mood: Mood::Love, resonance: 9 },
];

impl PulseEngine {
    /// Seed the board with twelve demo users and their pulses. No-op when
    /// users already exist.
    ///
    /// Seeding writes through the registry directly: the demo pulses carry
    /// pre-accumulated resonance counters that the public operations could
    /// not produce without fabricating transfer records. No events are
    /// published.
    pub fn seed_demo(&self) {
        let mut state = self.state();
        if state.registry.user_count() > 0 {
            return;
        }

        let mut rng = rand::thread_rng();
        let now = Utc::now();

        for (id, name) in DEMO_USERS {
            state.registry.put_user(User {
                id: id.to_string(),
                display_name: name.to_string(),
                verified: true,
                created_at: now - Duration::seconds(rng.gen_range(0..3600)),
            });
            state.registry.set_balance(id, crate::ledger::INITIAL_BALANCE);
        }

        let count = DEMO_PULSES.len() as i64;
        for (i, demo) in DEMO_PULSES.iter().enumerate() {
            let user_name = state
                .registry
                .user(demo.user_id)
                .map(|user| user.display_name.clone())
                .unwrap_or_default();
            let pulse = Pulse {
                id: format!("pulse_demo_{i}"),
                user_id: demo.user_id.to_string(),
                user_name,
                emoji: demo.emoji.to_string(),
                message: demo.message.to_string(),
                mood: demo.mood,
                resonance_count: demo.resonance,
                resonance_total: demo.resonance,
                created_at: now - Duration::seconds((count - i as i64) * 240),
                x: Some(rng.gen_range(0.15..0.85)),
                y: Some(rng.gen_range(0.15..0.85)),
            };
            state.registry.set_active_pulse(demo.user_id, &pulse.id);
            state.registry.put_pulse(pulse);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_populates_board_once() {
        let engine = PulseEngine::default();
        engine.seed_demo();

        let stats = engine.stats();
        assert_eq!(stats.active_humans, 12);
        assert_eq!(stats.total_pulses, 12);
        assert_eq!(engine.active_pulses().len(), 12);
        assert_eq!(engine.user_state("alien_p01").balance, 10);

        // Idempotent: a second seed changes nothing.
        engine.seed_demo();
        assert_eq!(engine.stats().total_pulses, 12);
    }

    #[test]
    fn seeded_board_still_accepts_operations() {
        let engine = PulseEngine::default();
        engine.seed_demo();

        let user = engine.register_user("alien_new", "Clover");
        let target = engine.active_pulses().into_iter().next().unwrap();
        let resonance = engine.add_resonance(&user.id, &target.id, 1, None).unwrap();
        assert_eq!(resonance.amount, 1);
        assert_eq!(engine.user_state("alien_new").balance, 9);
    }

    #[test]
    fn seed_counters_are_not_backed_by_transfer_records() {
        let engine = PulseEngine::default();
        engine.seed_demo();

        // Demo resonance counters are display-only history.
        assert_eq!(engine.stats().total_resonance, 0);
    }
}

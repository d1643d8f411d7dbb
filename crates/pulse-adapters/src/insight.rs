//! Insight collaborator: derives short mood narratives from read-only pulse
//! snapshots. Consumes aggregates, produces text, never mutates core state.

use chrono::{DateTime, Duration, Utc};
use pulse_core::{Mood, Pulse};
use serde::Serialize;
use std::collections::HashMap;

/// The slice of a pulse the agent needs: mood, accumulated resonance, age.
#[derive(Debug, Clone)]
pub struct PulseSample {
    pub mood: Mood,
    pub resonances: u64,
    pub created_at: DateTime<Utc>,
}

impl From<&Pulse> for PulseSample {
    fn from(pulse: &Pulse) -> Self {
        Self {
            mood: pulse.mood,
            resonances: pulse.resonance_count,
            created_at: pulse.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Community,
    Personal,
    Suggestion,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoodInsight {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    pub confidence: f32,
    pub created_at: DateTime<Utc>,
    pub is_ai: bool,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MoodShift {
    Brightening,
    Deepening,
    Steady,
}

/// Full analysis result returned to presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct EmotionalIntelligence {
    pub insights: Vec<MoodInsight>,
    pub dominant_mood: Mood,
    pub mood_shift: MoodShift,
    /// Community resonance level, 0-100.
    pub empathy_score: u32,
    pub last_analysis: DateTime<Utc>,
}

const COMMUNITY_TEMPLATES: [(Mood, [&str; 2]); 8] = [
    (Mood::Joy, [
        "The community is radiating joy right now — {count} happy pulses in the last hour",
        "Joy is contagious today! The galaxy is glowing with positive energy",
    ]),
    (Mood::Gratitude, [
        "A wave of gratitude is washing through the community. Beautiful.",
        "People are feeling thankful — {count} gratitude pulses and counting",
    ]),
    (Mood::Hope, [
        "Hope is the dominant frequency right now. The community believes in better tomorrows",
        "Hopeful energy is building — {count} people are looking forward",
    ]),
    (Mood::Calm, [
        "The community has found a peaceful wavelength. Calm energy prevails",
        "A gentle calm has settled over the galaxy. Breathe it in.",
    ]),
    (Mood::Energy, [
        "High energy! The community is buzzing with excitement and drive",
        "Electric vibes — {count} people are feeling energized right now",
    ]),
    (Mood::Love, [
        "Love is in the air! The community is sharing warmth and connection",
        "Hearts are open today — love pulses are lighting up the galaxy",
    ]),
    (Mood::Reflection, [
        "The community is in a reflective mood. Deep thoughts are being shared",
        "A contemplative energy has taken hold. People are looking inward",
    ]),
    (Mood::Determination, [
        "Determination is surging! The community is focused and driven",
        "Strong resolve — people are pushing through challenges together",
    ]),
];

const EMPATHY_PROMPTS: [&str; 6] = [
    "Someone shared a vulnerable moment. Your resonance could mean the world to them.",
    "A pulse nearby is waiting to be heard. Sometimes all we need is to know someone cares.",
    "The community thrives on connection. Have you resonated with someone today?",
    "Every resonance strengthens the emotional fabric of this community.",
    "Someone's joy deserves celebration. Someone's struggle deserves support.",
    "Your emotional presence matters here. Share what you're feeling.",
];

const POSITIVE_MOODS: [Mood; 5] = [
    Mood::Joy,
    Mood::Gratitude,
    Mood::Hope,
    Mood::Love,
    Mood::Energy,
];

fn mood_emoji(mood: Mood) -> &'static str {
    match mood {
        Mood::Joy => "😊",
        Mood::Gratitude => "🙏",
        Mood::Hope => "🌅",
        Mood::Calm => "🧘",
        Mood::Energy => "⚡",
        Mood::Love => "❤️",
        Mood::Reflection => "🤔",
        Mood::Determination => "💪",
    }
}

/// Stateless analyzer over pulse snapshots.
///
/// Unlike the hosted original, template selection is deterministic
/// (count-modulo-pool), so repeated analyses over the same snapshot agree.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsightAgent;

impl InsightAgent {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, samples: &[PulseSample], user_mood: Option<Mood>) -> EmotionalIntelligence {
        self.analyze_at(samples, user_mood, Utc::now())
    }

    pub fn analyze_at(
        &self,
        samples: &[PulseSample],
        user_mood: Option<Mood>,
        now: DateTime<Utc>,
    ) -> EmotionalIntelligence {
        let hour_ago = now - Duration::hours(1);
        let two_hours_ago = now - Duration::hours(2);

        let recent: Vec<&PulseSample> =
            samples.iter().filter(|s| s.created_at > hour_ago).collect();
        let older: Vec<&PulseSample> = samples
            .iter()
            .filter(|s| s.created_at > two_hours_ago && s.created_at <= hour_ago)
            .collect();

        let mut counts: HashMap<Mood, u64> = HashMap::new();
        for sample in &recent {
            *counts.entry(sample.mood).or_insert(0) += 1;
        }

        let mut dominant_mood = Mood::Calm;
        let mut dominant_count = 0;
        for mood in Mood::ALL {
            let count = counts.get(&mood).copied().unwrap_or(0);
            if count > dominant_count {
                dominant_mood = mood;
                dominant_count = count;
            }
        }

        let mut insights = Vec::with_capacity(3);

        let templates = COMMUNITY_TEMPLATES
            .iter()
            .find(|(mood, _)| *mood == dominant_mood)
            .map(|(_, templates)| templates)
            .unwrap_or(&COMMUNITY_TEMPLATES[3].1);
        let template = templates[dominant_count as usize % templates.len()];
        insights.push(MoodInsight {
            id: format!("ai_community_{}", now.timestamp_millis()),
            kind: InsightKind::Community,
            message: template.replace("{count}", &dominant_count.to_string()),
            mood: Some(dominant_mood),
            confidence: (0.5 + dominant_count as f32 * 0.05).min(0.95),
            created_at: now,
            is_ai: true,
        });

        insights.push(MoodInsight {
            id: format!("ai_empathy_{}", now.timestamp_millis()),
            kind: InsightKind::Suggestion,
            message: EMPATHY_PROMPTS[recent.len() % EMPATHY_PROMPTS.len()].to_string(),
            mood: None,
            confidence: 0.8,
            created_at: now,
            is_ai: true,
        });

        if let Some(mood) = user_mood {
            let same_mood = counts.get(&mood).copied().unwrap_or(0);
            let message = if same_mood > 1 {
                format!(
                    "You're not alone in feeling {} — {} others share this wavelength right now {}",
                    mood.as_str(),
                    same_mood,
                    mood_emoji(mood)
                )
            } else {
                format!(
                    "Your {} pulse adds a unique frequency to the galaxy {}",
                    mood.as_str(),
                    mood_emoji(mood)
                )
            };
            insights.push(MoodInsight {
                id: format!("ai_personal_{}", now.timestamp_millis()),
                kind: InsightKind::Personal,
                message,
                mood: Some(mood),
                confidence: 0.75,
                created_at: now,
                is_ai: true,
            });
        }

        let recent_positive = positive_share(&recent);
        let older_positive = positive_share(&older);
        let mood_shift = if recent_positive > older_positive + 0.1 {
            MoodShift::Brightening
        } else if recent_positive < older_positive - 0.1 {
            MoodShift::Deepening
        } else {
            MoodShift::Steady
        };

        let total_resonances: u64 = recent.iter().map(|s| s.resonances).sum();
        let empathy_score = (total_resonances * 5 + recent.len() as u64 * 3).min(100) as u32;

        EmotionalIntelligence {
            insights,
            dominant_mood,
            mood_shift,
            empathy_score,
            last_analysis: now,
        }
    }
}

fn positive_share(samples: &[&PulseSample]) -> f64 {
    let positive = samples
        .iter()
        .filter(|s| POSITIVE_MOODS.contains(&s.mood))
        .count();
    positive as f64 / samples.len().max(1) as f64
}

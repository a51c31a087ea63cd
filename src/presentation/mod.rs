//! Cosmetic derivations used by the renderers: label lookups, colour
//! thresholds, and the per-view dominant-trait tally.

mod mbti;
mod riasec;
mod tally;

use ratatui::style::Color;

pub use mbti::{TRAIT_AXES, TraitStrength, TypeProfile, display_code, display_letter, trait_strengths, type_profile};
pub use riasec::{AxisInfo, axis_info, decode_holland_code};
pub use tally::{Category, QuestionTopic, TraitTally, classify_question};

/// Three-band rating shared by confidence gauges and trait bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Strong,
    Moderate,
    Weak,
}

impl Level {
    /// Bands for a 0-100 confidence percentage.
    pub fn for_confidence(percent: f64) -> Self {
        if percent >= 75.0 {
            Level::Strong
        } else if percent >= 50.0 {
            Level::Moderate
        } else {
            Level::Weak
        }
    }

    /// Bands for a 0-1 axis probability.
    pub fn for_probability(value: f64) -> Self {
        if value >= 0.66 {
            Level::Strong
        } else if value >= 0.33 {
            Level::Moderate
        } else {
            Level::Weak
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::Strong => "strong",
            Level::Moderate => "moderate",
            Level::Weak => "weak",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Level::Strong => Color::Green,
            Level::Moderate => Color::Yellow,
            Level::Weak => Color::Red,
        }
    }
}

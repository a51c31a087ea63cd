//! Completed assessment results as returned by the backend and cached locally.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::QuizKind;

/// Holland interest axes, in canonical R-I-A-S-E-C order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiasecAxis {
    #[serde(rename = "R")]
    Realistic,
    #[serde(rename = "I")]
    Investigative,
    #[serde(rename = "A")]
    Artistic,
    #[serde(rename = "S")]
    Social,
    #[serde(rename = "E")]
    Enterprising,
    #[serde(rename = "C")]
    Conventional,
}

impl RiasecAxis {
    pub const ALL: [RiasecAxis; 6] = [
        RiasecAxis::Realistic,
        RiasecAxis::Investigative,
        RiasecAxis::Artistic,
        RiasecAxis::Social,
        RiasecAxis::Enterprising,
        RiasecAxis::Conventional,
    ];

    pub fn letter(self) -> char {
        match self {
            RiasecAxis::Realistic => 'R',
            RiasecAxis::Investigative => 'I',
            RiasecAxis::Artistic => 'A',
            RiasecAxis::Social => 'S',
            RiasecAxis::Enterprising => 'E',
            RiasecAxis::Conventional => 'C',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|axis| axis.letter() == letter.to_ascii_uppercase())
    }

    pub fn name(self) -> &'static str {
        match self {
            RiasecAxis::Realistic => "Realistic",
            RiasecAxis::Investigative => "Investigative",
            RiasecAxis::Artistic => "Artistic",
            RiasecAxis::Social => "Social",
            RiasecAxis::Enterprising => "Enterprising",
            RiasecAxis::Conventional => "Conventional",
        }
    }
}

impl fmt::Display for RiasecAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Per-axis numbers keyed by axis letter on the wire (`{"R": 8, "I": 14, ...}`).
pub type RiasecScores = BTreeMap<RiasecAxis, f64>;

/// Finalized MBTI classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MbtiResult {
    /// Four-letter type code, e.g. `INTJ`.
    pub mbti: String,
    #[serde(default)]
    pub confidence: f64,
    /// Mean probability per axis (I/E, S/N, T/F, J/P).
    #[serde(default)]
    pub mean_probs: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub std_probs: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entropy: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<f64>,
    /// Stamped client-side from the answered-question counter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_questions: Option<u32>,
}

/// Reliability figures the backend may attach to each interest axis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TraitMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    /// Standard error of measurement.
    #[serde(default)]
    pub sem: f64,
    #[serde(default)]
    pub ci_95_lower: f64,
    #[serde(default)]
    pub ci_95_upper: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trait_confidence: Option<f64>,
}

impl TraitMetrics {
    /// Half-width of the 95% interval implied by the SEM.
    pub fn margin(&self) -> f64 {
        1.96 * self.sem
    }

    /// Where `score` sits inside the interval, clamped to 0..=100.
    pub fn position_in_interval(&self, score: f64) -> f64 {
        let range = self.ci_95_upper - self.ci_95_lower;
        let position = if range > 0.0 {
            (score - self.ci_95_lower) / range * 100.0
        } else {
            50.0
        };
        position.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HollandAnalysis {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub top_3: Vec<RiasecAxis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub ci_overlaps: serde_json::Value,
}

/// Finalized RIASEC interest profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiasecResult {
    /// Three-letter dominant-axis code, e.g. `ASI`.
    pub riasec_code: String,
    #[serde(default)]
    pub confidence_pct: f64,
    /// 0-100 normalized score per axis.
    #[serde(default)]
    pub axis_percents: RiasecScores,
    /// Raw summed Likert score per axis; fed to the recommender.
    #[serde(default)]
    pub raw_scores: RiasecScores,
    #[serde(default)]
    pub answered: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trait_metrics: Option<BTreeMap<RiasecAxis, TraitMetrics>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holland_analysis: Option<HollandAnalysis>,
}

impl RiasecResult {
    /// The three strongest axes: the backend's ranking when supplied,
    /// otherwise axis percents descending with ties in R-I-A-S-E-C order.
    pub fn top_axes(&self) -> Vec<RiasecAxis> {
        if let Some(analysis) = &self.holland_analysis {
            if !analysis.top_3.is_empty() {
                return analysis.top_3.iter().copied().take(3).collect();
            }
        }

        let mut ranked: Vec<(RiasecAxis, f64)> = self
            .axis_percents
            .iter()
            .map(|(axis, score)| (*axis, *score))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.into_iter().take(3).map(|(axis, _)| axis).collect()
    }

    pub fn metrics_for(&self, axis: RiasecAxis) -> Option<&TraitMetrics> {
        self.trait_metrics.as_ref()?.get(&axis)
    }

    pub fn percent(&self, axis: RiasecAxis) -> f64 {
        self.axis_percents.get(&axis).copied().unwrap_or(0.0)
    }
}

/// Either assessment's final result. Serialized in the backend's own shape,
/// so the variant is recognized by its distinguishing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompletedResult {
    Mbti(MbtiResult),
    Riasec(RiasecResult),
}

impl CompletedResult {
    pub fn kind(&self) -> QuizKind {
        match self {
            CompletedResult::Mbti(_) => QuizKind::Mbti,
            CompletedResult::Riasec(_) => QuizKind::Riasec,
        }
    }

    pub fn into_mbti(self) -> Option<MbtiResult> {
        match self {
            CompletedResult::Mbti(result) => Some(result),
            CompletedResult::Riasec(_) => None,
        }
    }

    pub fn into_riasec(self) -> Option<RiasecResult> {
        match self {
            CompletedResult::Riasec(result) => Some(result),
            CompletedResult::Mbti(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn riasec_from(value: serde_json::Value) -> RiasecResult {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_untagged_result_picks_variant() {
        let mbti: CompletedResult =
            serde_json::from_value(json!({"mbti": "INTJ", "confidence": 82.0})).unwrap();
        assert_eq!(mbti.kind(), QuizKind::Mbti);

        let riasec: CompletedResult = serde_json::from_value(json!({
            "riasec_code": "ASI",
            "axis_percents": {"R": 10, "I": 60, "A": 90, "S": 70, "E": 20, "C": 5},
        }))
        .unwrap();
        assert_eq!(riasec.kind(), QuizKind::Riasec);
    }

    #[test]
    fn test_top_axes_derived_from_percents() {
        let result = riasec_from(json!({
            "riasec_code": "ASI",
            "axis_percents": {"R": 10, "I": 60, "A": 90, "S": 70, "E": 20, "C": 5},
        }));
        assert_eq!(
            result.top_axes(),
            vec![RiasecAxis::Artistic, RiasecAxis::Social, RiasecAxis::Investigative]
        );
    }

    #[test]
    fn test_top_axes_ties_keep_canonical_order() {
        let result = riasec_from(json!({
            "riasec_code": "RIA",
            "axis_percents": {"R": 50, "I": 50, "A": 50, "S": 50, "E": 50, "C": 50},
        }));
        assert_eq!(
            result.top_axes(),
            vec![RiasecAxis::Realistic, RiasecAxis::Investigative, RiasecAxis::Artistic]
        );
    }

    #[test]
    fn test_top_axes_prefers_backend_ranking() {
        let result = riasec_from(json!({
            "riasec_code": "SEC",
            "axis_percents": {"R": 99, "I": 1, "A": 1, "S": 1, "E": 1, "C": 1},
            "holland_analysis": {"code": "SEC", "top_3": ["S", "E", "C"]},
        }));
        assert_eq!(
            result.top_axes(),
            vec![RiasecAxis::Social, RiasecAxis::Enterprising, RiasecAxis::Conventional]
        );
    }

    #[test]
    fn test_interval_position_is_clamped() {
        let metrics = TraitMetrics {
            sem: 2.0,
            ci_95_lower: 40.0,
            ci_95_upper: 60.0,
            ..TraitMetrics::default()
        };
        assert_eq!(metrics.position_in_interval(50.0), 50.0);
        assert_eq!(metrics.position_in_interval(80.0), 100.0);
        assert!((metrics.margin() - 3.92).abs() < 1e-9);
    }
}

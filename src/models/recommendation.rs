use serde::{Deserialize, Serialize};

fn default_icon() -> String {
    "🎯".to_string()
}

/// One ranked career cluster returned by the recommender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRecommendation {
    pub cluster: String,
    /// Match probability in 0..=1.
    pub probability: f64,
    #[serde(default)]
    pub explanation: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub why_it_fits: String,
    #[serde(default)]
    pub natural_skills: Vec<String>,
    #[serde(default)]
    pub growth_skills: Vec<String>,
    #[serde(default)]
    pub spark_interest: String,
}

impl ClusterRecommendation {
    pub fn match_percent(&self) -> f64 {
        self.probability * 100.0
    }

    /// Short blurb for preview cards, falling back to the explanation.
    pub fn summary(&self) -> String {
        if !self.short_description.is_empty() {
            return self.short_description.clone();
        }
        if !self.explanation.is_empty() {
            return self.explanation.chars().take(150).collect();
        }
        "Career cluster description".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let rec: ClusterRecommendation =
            serde_json::from_value(json!({"cluster": "Arts", "probability": 0.42})).unwrap();
        assert_eq!(rec.icon, "🎯");
        assert!(rec.natural_skills.is_empty());
        assert_eq!(rec.summary(), "Career cluster description");
        assert!((rec.match_percent() - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_truncates_explanation() {
        let rec = ClusterRecommendation {
            cluster: "Health".into(),
            probability: 0.3,
            explanation: "x".repeat(400),
            icon: default_icon(),
            short_description: String::new(),
            why_it_fits: String::new(),
            natural_skills: vec![],
            growth_skills: vec![],
            spark_interest: String::new(),
        };
        assert_eq!(rec.summary().chars().count(), 150);
    }
}

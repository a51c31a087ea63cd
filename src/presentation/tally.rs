use std::collections::BTreeMap;

use crate::models::Answer;

/// Which preference pair an MBTI question is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Energy,
    Information,
    Decisions,
    Lifestyle,
    Personality,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Energy => "Energy",
            Category::Information => "Information",
            Category::Decisions => "Decisions",
            Category::Lifestyle => "Lifestyle",
            Category::Personality => "Personality",
        }
    }

    /// The two MBTI letters this category decides between.
    pub fn pair(self) -> Option<(char, char)> {
        match self {
            Category::Energy => Some(('E', 'I')),
            Category::Information => Some(('S', 'N')),
            Category::Decisions => Some(('T', 'F')),
            Category::Lifestyle => Some(('J', 'P')),
            Category::Personality => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionTopic {
    /// MBTI letter a "Yes" leans towards, when recognizable.
    pub dimension: Option<char>,
    pub category: Category,
}

const KEYWORDS: [(&[&str], char, Category); 8] = [
    (&["attention", "center", "social", "gathering"], 'E', Category::Energy),
    (&["alone", "quiet", "recharge"], 'I', Category::Energy),
    (&["fact", "concrete", "present", "details"], 'S', Category::Information),
    (&["imagine", "future", "possibility", "scenarios"], 'N', Category::Information),
    (&["logic", "decision"], 'T', Category::Decisions),
    (&["feeling", "harmony"], 'F', Category::Decisions),
    (&["schedule", "plan", "structure"], 'J', Category::Lifestyle),
    (&["spontaneous", "open", "flexible", "options"], 'P', Category::Lifestyle),
];

/// Guess the dimension a question probes from its wording. First match wins.
pub fn classify_question(text: &str) -> QuestionTopic {
    let text = text.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(words, _, _)| words.iter().any(|word| text.contains(word)))
        .map(|&(_, dimension, category)| QuestionTopic {
            dimension: Some(dimension),
            category,
        })
        .unwrap_or(QuestionTopic {
            dimension: None,
            category: Category::Personality,
        })
}

/// Running count of "Yes" answers per MBTI letter for one quiz view.
///
/// Purely cosmetic; owned by the view and dropped with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraitTally {
    counts: BTreeMap<char, u32>,
}

impl TraitTally {
    pub fn record(&mut self, question_text: &str, answer: &Answer) {
        if !answer.is_affirmative() {
            return;
        }
        if let Some(dimension) = classify_question(question_text).dimension {
            *self.counts.entry(dimension).or_default() += 1;
        }
    }

    pub fn count(&self, letter: char) -> u32 {
        self.counts.get(&letter).copied().unwrap_or(0)
    }

    /// The leading letter of `category`'s pair, or `None` on a tie.
    pub fn dominant(&self, category: Category) -> Option<char> {
        let (first, second) = category.pair()?;
        let (a, b) = (self.count(first), self.count(second));
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => Some(first),
            std::cmp::Ordering::Less => Some(second),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}

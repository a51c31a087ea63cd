use super::Level;

/// Axis labels for `MbtiResult::mean_probs`, in backend order.
pub const TRAIT_AXES: [&str; 4] = ["I/E", "S/N", "T/F", "J/P"];

/// Friendlier letter and word shown in place of each MBTI letter.
pub fn display_letter(letter: char) -> Option<(char, &'static str)> {
    let shown = match letter.to_ascii_uppercase() {
        'E' => ('O', "Outward"),
        'I' => ('R', "Reserved"),
        'S' => ('P', "Practical"),
        'N' => ('V', "Visionary"),
        'T' => ('L', "Logical"),
        'F' => ('E', "Emotional"),
        'J' => ('S', "Structured"),
        'P' => ('F', "Flexible"),
        _ => return None,
    };
    Some(shown)
}

/// `INTJ` becomes `RVLS`. Unknown letters pass through.
pub fn display_code(code: &str) -> String {
    code.chars()
        .map(|c| display_letter(c).map_or(c, |(shown, _)| shown))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeProfile {
    pub title: &'static str,
    pub description: &'static str,
}

const PROFILES: [(&str, TypeProfile); 16] = [
    ("INTJ", TypeProfile {
        title: "The Strategic Mastermind",
        description: "Independent thinkers who love solving complex problems. INTJs value logic, strategy, and long-term planning.",
    }),
    ("INTP", TypeProfile {
        title: "The Logical Architect",
        description: "Curious analyzers who enjoy exploring theories and understanding how things work.",
    }),
    ("ENTJ", TypeProfile {
        title: "The Commanding Leader",
        description: "Bold, decisive, and efficient. ENTJs excel at organizing people and driving large-scale goals.",
    }),
    ("ENTP", TypeProfile {
        title: "The Visionary Innovator",
        description: "Creative thinkers who challenge the status quo and generate unconventional solutions.",
    }),
    ("INFJ", TypeProfile {
        title: "The Insightful Counselor",
        description: "Deep thinkers who seek meaning, compassion, and purpose. INFJs thrive when helping others grow.",
    }),
    ("INFP", TypeProfile {
        title: "The Idealistic Dreamer",
        description: "Imaginative, empathetic, and guided by strong values. INFPs excel in artistic and supportive fields.",
    }),
    ("ENFJ", TypeProfile {
        title: "The Inspiring Mentor",
        description: "Charismatic motivators who bring people together and enjoy nurturing others' potential.",
    }),
    ("ENFP", TypeProfile {
        title: "The Enthusiastic Creator",
        description: "Energetic, expressive, and imaginative. ENFPs excel in creative roles and people-centric environments.",
    }),
    ("ISTJ", TypeProfile {
        title: "The Responsible Inspector",
        description: "Detail-oriented organizers who value structure, reliability, and duty.",
    }),
    ("ISFJ", TypeProfile {
        title: "The Loyal Protector",
        description: "Supportive and thoughtful individuals who enjoy helping people and preserving harmony.",
    }),
    ("ESTJ", TypeProfile {
        title: "The Efficient Director",
        description: "Strong-willed, practical and excellent at managing people, projects, and organizations.",
    }),
    ("ESFJ", TypeProfile {
        title: "The Supportive Organizer",
        description: "Warm-hearted collaborators who enjoy teamwork and building community relationships.",
    }),
    ("ISTP", TypeProfile {
        title: "The Tactical Problem-Solver",
        description: "Hands-on, practical individuals who excel in fixing, building, and analyzing systems.",
    }),
    ("ISFP", TypeProfile {
        title: "The Gentle Artist",
        description: "Quiet, sensitive, and highly creative. ISFPs excel in artistic and nature-related fields.",
    }),
    ("ESTP", TypeProfile {
        title: "The Energetic Troubleshooter",
        description: "Bold, direct, and action-oriented. ESTPs excel in fast-paced, dynamic environments.",
    }),
    ("ESFP", TypeProfile {
        title: "The Expressive Performer",
        description: "Fun-loving, expressive, and people-centered. ESFPs thrive in entertainment and social careers.",
    }),
];

pub fn type_profile(code: &str) -> Option<TypeProfile> {
    let code = code.trim().to_ascii_uppercase();
    PROFILES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, profile)| *profile)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraitStrength {
    pub axis: &'static str,
    pub value: f64,
    pub level: Level,
}

impl TraitStrength {
    pub fn percent(&self) -> u16 {
        (self.value * 100.0).round().clamp(0.0, 100.0) as u16
    }
}

/// Pair each mean probability with its axis label; extra values are ignored.
pub fn trait_strengths(mean_probs: &[f64]) -> Vec<TraitStrength> {
    TRAIT_AXES
        .iter()
        .zip(mean_probs)
        .map(|(&axis, &value)| TraitStrength {
            axis,
            value,
            level: Level::for_probability(value),
        })
        .collect()
}

use crate::models::RiasecAxis;

/// Descriptive copy shown next to an interest axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisInfo {
    pub icon: &'static str,
    pub subtitle: &'static str,
    pub description: &'static str,
}

pub fn axis_info(axis: RiasecAxis) -> AxisInfo {
    match axis {
        RiasecAxis::Realistic => AxisInfo {
            icon: "🔨",
            subtitle: "Hands-on Work",
            description: "You enjoy working with tools, machines, and hands-on activities.",
        },
        RiasecAxis::Investigative => AxisInfo {
            icon: "🔬",
            subtitle: "Analytical Thinking",
            description: "You like analyzing problems and exploring scientific concepts.",
        },
        RiasecAxis::Artistic => AxisInfo {
            icon: "🎭",
            subtitle: "Creative Expression",
            description: "You're drawn to creative expression and imaginative work.",
        },
        RiasecAxis::Social => AxisInfo {
            icon: "💬",
            subtitle: "Helping & People Work",
            description: "You enjoy helping others and working with people.",
        },
        RiasecAxis::Enterprising => AxisInfo {
            icon: "💼",
            subtitle: "Leadership & Business",
            description: "You're motivated by leadership and business opportunities.",
        },
        RiasecAxis::Conventional => AxisInfo {
            icon: "📊",
            subtitle: "Organization & Detail Work",
            description: "You prefer structured, organized, and detail-oriented work.",
        },
    }
}

/// `ASI` becomes `Artistic • Social • Investigative`; unknown letters are skipped.
pub fn decode_holland_code(code: &str) -> String {
    code.chars()
        .filter_map(RiasecAxis::from_letter)
        .map(RiasecAxis::name)
        .collect::<Vec<_>>()
        .join(" • ")
}

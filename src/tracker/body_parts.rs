use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::store::{WorkoutPlan, WorkoutTemplate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyPart {
    Legs,
    Arms,
    UpperBody,
    LowerBody,
    Chest,
    Back,
    Abdomen,
    Abs,
    Shoulders,
    Glutes,
    Cardio,
    FullBody,
}

impl BodyPart {
    /// Reporting order.
    pub const ALL: [BodyPart; 12] = [
        BodyPart::Legs,
        BodyPart::Arms,
        BodyPart::UpperBody,
        BodyPart::LowerBody,
        BodyPart::Chest,
        BodyPart::Back,
        BodyPart::Abdomen,
        BodyPart::Abs,
        BodyPart::Shoulders,
        BodyPart::Glutes,
        BodyPart::Cardio,
        BodyPart::FullBody,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BodyPart::Legs => "legs",
            BodyPart::Arms => "arms",
            BodyPart::UpperBody => "upperbody",
            BodyPart::LowerBody => "lowerbody",
            BodyPart::Chest => "chest",
            BodyPart::Back => "back",
            BodyPart::Abdomen => "abdomen",
            BodyPart::Abs => "abs",
            BodyPart::Shoulders => "shoulders",
            BodyPart::Glutes => "glutes",
            BodyPart::Cardio => "cardio",
            BodyPart::FullBody => "fullbody",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BodyPart::Legs => "Legs",
            BodyPart::Arms => "Arms",
            BodyPart::UpperBody => "Upper Body",
            BodyPart::LowerBody => "Lower Body",
            BodyPart::Chest => "Chest",
            BodyPart::Back => "Back",
            BodyPart::Abdomen => "Abdomen",
            BodyPart::Abs => "Abs",
            BodyPart::Shoulders => "Shoulders",
            BodyPart::Glutes => "Glutes",
            BodyPart::Cardio => "Cardio",
            BodyPart::FullBody => "Full Body",
        }
    }
}

impl FromStr for BodyPart {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BodyPart::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a rule inspects on the workout template.
#[derive(Debug, Clone, Copy)]
enum Matcher {
    /// Any of these substrings in the lowercased title.
    Title(&'static [&'static str]),
    /// Template type equal to any of these.
    Kind(&'static [&'static str]),
}

struct Rule {
    matcher: Matcher,
    parts: &'static [BodyPart],
}

/// Evaluated top to bottom; the first match wins.
const INFERENCE_RULES: &[Rule] = &[
    Rule {
        matcher: Matcher::Title(&["leg", "squat", "lunge"]),
        parts: &[BodyPart::Legs, BodyPart::LowerBody],
    },
    Rule {
        matcher: Matcher::Title(&["arm", "bicep", "tricep"]),
        parts: &[BodyPart::Arms, BodyPart::UpperBody],
    },
    Rule {
        matcher: Matcher::Title(&["chest", "push"]),
        parts: &[BodyPart::Chest, BodyPart::UpperBody],
    },
    Rule {
        matcher: Matcher::Title(&["back", "pull", "row"]),
        parts: &[BodyPart::Back, BodyPart::UpperBody],
    },
    Rule {
        matcher: Matcher::Title(&["abs", "core", "abdominal"]),
        parts: &[BodyPart::Abs, BodyPart::Abdomen],
    },
    Rule {
        matcher: Matcher::Kind(&["cardio", "hiit"]),
        parts: &[BodyPart::Cardio],
    },
];

const FALLBACK: &[BodyPart] = &[BodyPart::FullBody];

/// Last-resort tagging from a template's title and type.
pub fn infer(title: &str, kind: &str) -> &'static [BodyPart] {
    let title = title.to_lowercase();
    let kind = kind.to_lowercase();
    INFERENCE_RULES
        .iter()
        .find(|rule| match rule.matcher {
            Matcher::Title(needles) => needles.iter().any(|n| title.contains(n)),
            Matcher::Kind(kinds) => kinds.contains(&kind.as_str()),
        })
        .map_or(FALLBACK, |rule| rule.parts)
}

/// Tags a completed plan: explicit plan tags, then template tags, then inference.
///
/// Tag strings outside the known label set are dropped, so a plan tagged only
/// with unknown labels contributes to no body part.
pub fn resolve(plan: &WorkoutPlan, workout: &WorkoutTemplate) -> Vec<BodyPart> {
    let explicit = if !plan.body_parts.is_empty() {
        Some(&plan.body_parts)
    } else if !workout.body_parts.is_empty() {
        Some(&workout.body_parts)
    } else {
        None
    };

    match explicit {
        Some(tags) => {
            let mut parts: Vec<BodyPart> = tags.iter().filter_map(|t| t.parse().ok()).collect();
            parts.sort();
            parts.dedup();
            parts
        }
        None => infer(&workout.title, &workout.kind).to_vec(),
    }
}

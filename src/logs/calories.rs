//! MET-based energy estimate for logged workouts.

/// Body weight used when neither the request nor the profile carries one.
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;

const DEFAULT_MET: f64 = 6.0;

const MET_TABLE: &[(&str, f64)] = &[
    ("walking", 3.5),
    ("running", 9.8),
    ("cycling", 7.5),
    ("swimming", 8.0),
    ("strength", 5.0),
    ("hiit", 12.0),
    ("yoga", 3.0),
    ("pilates", 3.5),
    ("cardio", 7.0),
    ("crossfit", 10.0),
    ("dance", 6.0),
    ("boxing", 12.5),
];

/// MET for a workout type; unknown types get the generic value.
pub fn met_for(workout_type: &str) -> f64 {
    let key = workout_type.trim().to_ascii_lowercase();
    MET_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, met)| *met)
        .unwrap_or(DEFAULT_MET)
}

/// `round(MET * kg * hours)`.
pub fn calories_burned(workout_type: &str, duration_min: i32, weight_kg: f64) -> f64 {
    (met_for(workout_type) * weight_kg * f64::from(duration_min) / 60.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(met_for("Running"), 9.8);
        assert_eq!(met_for("HIIT"), 12.0);
        assert_eq!(met_for(" yoga "), 3.0);
    }

    #[test]
    fn unknown_type_uses_default_met() {
        assert_eq!(met_for("underwater basket weaving"), DEFAULT_MET);
    }

    #[test]
    fn calories_follow_met_formula() {
        // 9.8 * 70 * 0.5h = 343
        assert_eq!(calories_burned("running", 30, DEFAULT_WEIGHT_KG), 343.0);
        // 7.5 * 80 * 0.75h = 450
        assert_eq!(calories_burned("cycling", 45, 80.0), 450.0);
        // 3.5 * 62 * (20 / 60) = 72.33
        assert_eq!(calories_burned("walking", 20, 62.0), 72.0);
    }
}

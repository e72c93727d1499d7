use std::str::FromStr;

use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Weekly,
    Monthly,
    #[default]
    Total,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Total => "total",
        }
    }

    pub fn window(self) -> Option<Duration> {
        match self {
            Period::Weekly => Some(Duration::days(7)),
            Period::Monthly => Some(Duration::days(30)),
            Period::Total => None,
        }
    }

    /// Earliest plan date included, or `None` for an unbounded period.
    pub fn floor(self, now: OffsetDateTime) -> Option<OffsetDateTime> {
        self.window().map(|w| now - w)
    }

    /// Completed workouts per body part that count as 100%.
    pub fn target_workouts(self) -> u32 {
        match self {
            Period::Weekly => 3,
            Period::Monthly => 8,
            Period::Total => 10,
        }
    }

    /// `None` (parameter omitted) means `Total`; anything unrecognized is rejected.
    pub fn from_query(raw: Option<&str>) -> Result<Self, AppError> {
        match raw {
            None => Ok(Period::Total),
            Some(v) => v.parse(),
        }
    }
}

impl FromStr for Period {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            "total" => Ok(Period::Total),
            other => Err(AppError::invalid(format!(
                "Invalid period `{other}` (expected weekly, monthly or total)"
            ))),
        }
    }
}

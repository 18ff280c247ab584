//! Tunable challenge parameters and their bounds.

use serde::{Deserialize, Serialize};

use launchpad_types::ComplexityTier;

use crate::DifficultyError;

/// Shortest time limit the controller will hand out.
pub const MIN_TIME_LIMIT_SECS: u32 = 30;
/// Longest time limit the controller will hand out.
pub const MAX_TIME_LIMIT_SECS: u32 = 600;
/// Calculation step bounds.
pub const CALCULATION_STEPS: (u32, u32) = (1, 10);
/// Constraint count bounds.
pub const CONSTRAINTS: (u32, u32) = (0, 6);
/// Hint count bounds.
pub const HINTS: (u32, u32) = (0, 5);
/// Attempt bounds.
pub const ATTEMPTS: (u32, u32) = (1, 5);
/// Answer tolerance bounds, in percent.
pub const TOLERANCE_PCT: (u32, u32) = (1, 20);

/// Knobs for the next challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeParams {
    /// Seconds allowed.
    pub time_limit_secs: u32,
    /// Complexity tier.
    pub complexity: ComplexityTier,
    /// Calculation steps required.
    pub calculation_steps: u32,
    /// Extra constraints layered on the problem.
    pub constraints: u32,
    /// Hints available.
    pub hints: u32,
    /// Attempts allowed.
    pub max_attempts: u32,
    /// Accepted deviation from the exact answer, in percent.
    pub tolerance_pct: u32,
    /// Whether formulas are shown alongside the problem.
    pub show_formulas: bool,
}

/// Starting parameters for a player with no history.
impl Default for ChallengeParams {
    fn default() -> Self {
        Self {
            time_limit_secs: 180,
            complexity: ComplexityTier::Medium,
            calculation_steps: 3,
            constraints: 1,
            hints: 2,
            max_attempts: 3,
            tolerance_pct: 5,
            show_formulas: false,
        }
    }
}

const fn clamp(value: u32, (lo, hi): (u32, u32)) -> u32 {
    if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}

/// `value * num / den` in integer arithmetic, saturating.
pub(crate) const fn scale(value: u32, num: u32, den: u32) -> u32 {
    value.saturating_mul(num) / den
}

impl ChallengeParams {
    /// Scale the time limit by `num / den`, kept within bounds.
    pub(crate) const fn scale_time(&mut self, num: u32, den: u32) {
        self.time_limit_secs = clamp(scale(self.time_limit_secs, num, den), (MIN_TIME_LIMIT_SECS, MAX_TIME_LIMIT_SECS));
    }

    /// Pull every numeric field back inside its bounds.
    pub(crate) const fn clamp_all(&mut self) {
        self.time_limit_secs = clamp(self.time_limit_secs, (MIN_TIME_LIMIT_SECS, MAX_TIME_LIMIT_SECS));
        self.calculation_steps = clamp(self.calculation_steps, CALCULATION_STEPS);
        self.constraints = clamp(self.constraints, CONSTRAINTS);
        self.hints = clamp(self.hints, HINTS);
        self.max_attempts = clamp(self.max_attempts, ATTEMPTS);
        self.tolerance_pct = clamp(self.tolerance_pct, TOLERANCE_PCT);
    }

    /// Check every numeric field against its bounds without changing it.
    ///
    /// # Errors
    ///
    /// Returns [`DifficultyError::ParamOutOfRange`] for the first field
    /// outside its bounds.
    pub fn validate(&self) -> Result<(), DifficultyError> {
        let fields = [
            ("time_limit_secs", self.time_limit_secs, (MIN_TIME_LIMIT_SECS, MAX_TIME_LIMIT_SECS)),
            ("calculation_steps", self.calculation_steps, CALCULATION_STEPS),
            ("constraints", self.constraints, CONSTRAINTS),
            ("hints", self.hints, HINTS),
            ("max_attempts", self.max_attempts, ATTEMPTS),
            ("tolerance_pct", self.tolerance_pct, TOLERANCE_PCT),
        ];
        for (field, value, (min, max)) in fields {
            if !(min..=max).contains(&value) {
                return Err(DifficultyError::ParamOutOfRange { field, value, min, max });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_scaling_respects_bounds() {
        let mut p = ChallengeParams {
            time_limit_secs: 35,
            ..ChallengeParams::default()
        };
        p.scale_time(4, 5);
        assert_eq!(p.time_limit_secs, MIN_TIME_LIMIT_SECS);

        p.time_limit_secs = 550;
        p.scale_time(13, 10);
        assert_eq!(p.time_limit_secs, MAX_TIME_LIMIT_SECS);
    }

    #[test]
    fn clamp_all_fixes_out_of_range_fields() {
        let mut p = ChallengeParams {
            hints: 40,
            max_attempts: 0,
            tolerance_pct: 0,
            ..ChallengeParams::default()
        };
        assert!(p.validate().is_err());
        p.clamp_all();
        assert_eq!((p.hints, p.max_attempts, p.tolerance_pct), (5, 1, 1));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn validate_names_the_first_bad_field() {
        assert!(ChallengeParams::default().validate().is_ok());

        let p = ChallengeParams {
            time_limit_secs: 0,
            hints: 999,
            ..ChallengeParams::default()
        };
        assert_eq!(
            p.validate(),
            Err(DifficultyError::ParamOutOfRange {
                field: "time_limit_secs",
                value: 0,
                min: MIN_TIME_LIMIT_SECS,
                max: MAX_TIME_LIMIT_SECS,
            })
        );
    }
}

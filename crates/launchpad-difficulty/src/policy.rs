//! The difficulty policy table.

use serde::{Deserialize, Serialize};
use tracing::debug;

use launchpad_types::{DifficultyAction, PerformanceRecord, WeakArea};

use crate::params::ChallengeParams;
use crate::stats::{PerformanceStats, analyze_performance};

/// Parameters chosen for the next challenge and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyAdjustment {
    /// Which policy row matched.
    pub action: DifficultyAction,
    /// The adjusted parameters.
    pub params: ChallengeParams,
    /// Short human-readable explanation.
    pub reason: String,
    /// Statistics the decision was based on; `None` for a new player.
    pub stats: Option<PerformanceStats>,
}

fn cruising(stats: &PerformanceStats, current: &ChallengeParams) -> bool {
    stats.avg_score > 85.0
        && stats.avg_time_secs < 0.5 * f64::from(current.time_limit_secs)
        && stats.failure_rate < 0.1
}

fn struggling(stats: &PerformanceStats) -> bool {
    stats.avg_score < 50.0 && stats.failure_rate > 0.6
}

fn just_below_target(stats: &PerformanceStats) -> bool {
    (60.0..70.0).contains(&stats.avg_score)
}

fn increase(p: &mut ChallengeParams) {
    p.scale_time(4, 5);
    p.complexity = p.complexity.harder();
    p.calculation_steps = p.calculation_steps.saturating_add(1);
    p.constraints = p.constraints.saturating_add(1);
    p.hints = p.hints.saturating_sub(1);
    p.tolerance_pct = p.tolerance_pct.saturating_sub(1);
}

fn decrease(p: &mut ChallengeParams) {
    p.scale_time(13, 10);
    p.complexity = p.complexity.easier();
    p.calculation_steps = p.calculation_steps.saturating_sub(1);
    p.constraints = p.constraints.saturating_sub(1);
    p.hints = p.hints.saturating_add(1);
    p.max_attempts = p.max_attempts.saturating_add(1);
    p.tolerance_pct = p.tolerance_pct.saturating_add(2);
}

fn slight_decrease(p: &mut ChallengeParams) {
    p.scale_time(11, 10);
    p.hints = p.hints.saturating_add(1);
}

/// Per-weakness tweaks applied when the tier is kept.
fn maintain(p: &mut ChallengeParams, stats: &PerformanceStats) -> Vec<WeakArea> {
    let weak = stats.weaknesses.weak_areas();
    for area in &weak {
        match area {
            WeakArea::Calculation => {
                p.calculation_steps = p.calculation_steps.saturating_sub(1);
                p.show_formulas = true;
            }
            WeakArea::Logic => p.hints = p.hints.saturating_add(1),
            WeakArea::Strategy => p.constraints = p.constraints.saturating_sub(1),
            WeakArea::TimeManagement => p.scale_time(115, 100),
            WeakArea::Accuracy => {
                p.max_attempts = p.max_attempts.saturating_add(1);
                p.tolerance_pct = p.tolerance_pct.saturating_add(1);
            }
        }
    }
    weak
}

/// Choose the next challenge's parameters from a player's history.
///
/// A player with no history always gets [`ChallengeParams::default`].
/// Otherwise the first matching row of the policy table applies to
/// `current`, and the result is clamped to the parameter bounds.
pub fn adjust_difficulty(history: &[PerformanceRecord], current: &ChallengeParams) -> DifficultyAdjustment {
    let Some(stats) = analyze_performance(history) else {
        return DifficultyAdjustment {
            action: DifficultyAction::Default,
            params: ChallengeParams::default(),
            reason: "no history yet".to_owned(),
            stats: None,
        };
    };

    let mut params = current.clone();
    let (action, reason) = if cruising(&stats, current) {
        increase(&mut params);
        (DifficultyAction::Increase, format!("cruising at {:.0} average", stats.avg_score))
    } else if struggling(&stats) {
        decrease(&mut params);
        (
            DifficultyAction::Decrease,
            format!("failing {:.0}% of challenges", stats.failure_rate * 100.0),
        )
    } else if just_below_target(&stats) {
        slight_decrease(&mut params);
        (DifficultyAction::SlightDecrease, format!("just below target at {:.0}", stats.avg_score))
    } else {
        let weak = maintain(&mut params, &stats);
        let reason = if weak.is_empty() {
            "on target".to_owned()
        } else {
            let names: Vec<&str> = weak.iter().map(|a| a.as_str()).collect();
            format!("on target; easing {}", names.join(", "))
        };
        (DifficultyAction::Maintain, reason)
    };
    params.clamp_all();

    debug!(%action, tier = %params.complexity, time = params.time_limit_secs, "difficulty adjusted");
    DifficultyAdjustment {
        action,
        params,
        reason,
        stats: Some(stats),
    }
}

#[cfg(test)]
mod tests {
    use launchpad_types::{ChallengeType, ComplexityTier};

    use super::*;
    use crate::stats::tests::{record, scores};

    #[test]
    fn new_player_gets_default() {
        let current = ChallengeParams {
            complexity: ComplexityTier::Nightmare,
            ..ChallengeParams::default()
        };
        let adj = adjust_difficulty(&[], &current);
        assert_eq!(adj.action, DifficultyAction::Default);
        assert_eq!(adj.params, ChallengeParams::default());
        assert!(adj.stats.is_none());
    }

    #[test]
    fn fast_high_scores_increase() {
        // 90 average, 30% of the time limit, no failures.
        let history: Vec<_> = (0..10).map(|_| record(ChallengeType::Logic, 90, 54, 180, 1)).collect();
        let current = ChallengeParams::default();
        let adj = adjust_difficulty(&history, &current);

        assert_eq!(adj.action, DifficultyAction::Increase);
        assert_eq!(adj.params.complexity, ComplexityTier::Hard);
        assert_eq!(adj.params.time_limit_secs, 144);
        assert_eq!(adj.params.hints, current.hints - 1);
        assert!(adj.params.calculation_steps > current.calculation_steps);
        assert!(adj.params.tolerance_pct < current.tolerance_pct);
    }

    #[test]
    fn increase_clamps_at_hardest_tier() {
        let history: Vec<_> = (0..10).map(|_| record(ChallengeType::Logic, 95, 20, 180, 1)).collect();
        let current = ChallengeParams {
            complexity: ComplexityTier::Nightmare,
            hints: 0,
            ..ChallengeParams::default()
        };
        let adj = adjust_difficulty(&history, &current);
        assert_eq!(adj.params.complexity, ComplexityTier::Nightmare);
        assert_eq!(adj.params.hints, 0);
    }

    #[test]
    fn low_scores_with_many_failures_decrease() {
        // 40 average, 80% failures.
        let history = scores(&[40, 40, 40, 40, 40, 40, 40, 40, 20, 80]);
        let current = ChallengeParams::default();
        let adj = adjust_difficulty(&history, &current);

        assert_eq!(adj.action, DifficultyAction::Decrease);
        assert_eq!(adj.params.complexity, ComplexityTier::Simple);
        assert_eq!(adj.params.time_limit_secs, 234);
        assert_eq!(adj.params.hints, current.hints + 1);
        assert_eq!(adj.params.max_attempts, current.max_attempts + 1);
    }

    #[test]
    fn decrease_clamps_at_easiest_tier() {
        let history = scores(&[10; 10]);
        let current = ChallengeParams {
            complexity: ComplexityTier::Simple,
            ..ChallengeParams::default()
        };
        assert_eq!(adjust_difficulty(&history, &current).params.complexity, ComplexityTier::Simple);
    }

    #[test]
    fn sixties_get_a_slight_decrease() {
        let history = scores(&[65; 10]);
        let current = ChallengeParams::default();
        let adj = adjust_difficulty(&history, &current);
        assert_eq!(adj.action, DifficultyAction::SlightDecrease);
        assert_eq!(adj.params.hints, current.hints + 1);
        assert_eq!(adj.params.time_limit_secs, 198);
        assert_eq!(adj.params.complexity, current.complexity);
    }

    #[test]
    fn maintain_eases_calculation_weakness() {
        // Strong logic, weak calculation: average 75, not in any other row.
        let mut history: Vec<_> = (0..6).map(|_| record(ChallengeType::Logic, 100, 60, 180, 1)).collect();
        history.extend((0..4).map(|_| record(ChallengeType::Calculation, 37, 60, 180, 1)));
        let current = ChallengeParams::default();
        let adj = adjust_difficulty(&history, &current);

        assert_eq!(adj.action, DifficultyAction::Maintain);
        assert!(adj.params.show_formulas);
        assert_eq!(adj.params.calculation_steps, current.calculation_steps - 1);
        assert_eq!(adj.params.complexity, current.complexity);
    }

    #[test]
    fn maintain_without_weakness_keeps_params() {
        let history = scores(&[80; 10]);
        let current = ChallengeParams::default();
        let adj = adjust_difficulty(&history, &current);
        assert_eq!(adj.action, DifficultyAction::Maintain);
        assert_eq!(adj.params, current);
    }
}

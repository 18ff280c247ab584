//! Aggregate statistics over recent challenge attempts.
//!
//! Everything here is derived on demand from the history slice; nothing is
//! cached, so the numbers can never drift from the records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use launchpad_types::{ChallengeType, PerformanceRecord, SkillLevel, Trend, WeakArea};

/// Number of most recent records analyzed.
pub const ANALYSIS_WINDOW: usize = 10;

/// Half-window compared for the trend.
const TREND_HALF: usize = ANALYSIS_WINDOW / 2;

/// Mean-score gap that counts as a trend.
const TREND_MARGIN: f64 = 10.0;

/// A category failure rate above this flags a weakness.
pub const WEAKNESS_THRESHOLD: f64 = 0.5;

// ---------------------------------------------------------------------------
// Weaknesses
// ---------------------------------------------------------------------------

/// Failure rate per weakness category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaknessReport {
    /// Failures / members for each category; `0.0` with no members.
    pub rates: BTreeMap<WeakArea, f64>,
}

impl WeaknessReport {
    /// Rate for one category.
    pub fn rate(&self, area: WeakArea) -> f64 {
        self.rates.get(&area).copied().unwrap_or(0.0)
    }

    /// Whether a category exceeds the weakness threshold.
    pub fn is_weak(&self, area: WeakArea) -> bool {
        self.rate(area) > WEAKNESS_THRESHOLD
    }

    /// Flagged categories in fixed order.
    pub fn weak_areas(&self) -> Vec<WeakArea> {
        WeakArea::ALL.into_iter().filter(|a| self.is_weak(*a)).collect()
    }

    /// The flagged category with the highest rate; earlier categories win
    /// ties.
    pub fn weakest(&self) -> Option<WeakArea> {
        let mut best: Option<(WeakArea, f64)> = None;
        for area in self.weak_areas() {
            let rate = self.rate(area);
            if best.is_none_or(|(_, r)| rate > r) {
                best = Some((area, rate));
            }
        }
        best.map(|(a, _)| a)
    }
}

fn is_member(area: WeakArea, record: &PerformanceRecord) -> bool {
    match area {
        WeakArea::Calculation => record.challenge_type == ChallengeType::Calculation,
        WeakArea::Logic => record.challenge_type == ChallengeType::Logic,
        WeakArea::Strategy => record.challenge_type == ChallengeType::Strategy,
        WeakArea::TimeManagement => record.ran_close_to_limit(),
        WeakArea::Accuracy => record.attempts > 1,
    }
}

fn weaknesses(records: &[PerformanceRecord]) -> WeaknessReport {
    let rates = WeakArea::ALL
        .into_iter()
        .map(|area| {
            let (members, failures) = records
                .iter()
                .filter(|r| is_member(area, r))
                .fold((0u32, 0u32), |(m, f), r| (m + 1, f + u32::from(r.is_failure())));
            let rate = if members == 0 {
                0.0
            } else {
                f64::from(failures) / f64::from(members)
            };
            (area, rate)
        })
        .collect();
    WeaknessReport { rates }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Aggregates over the most recent [`ANALYSIS_WINDOW`] records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    /// Records analyzed.
    pub sample_size: usize,
    /// Mean score.
    pub avg_score: f64,
    /// Mean seconds spent.
    pub avg_time_secs: f64,
    /// Fraction of records scoring below 70.
    pub failure_rate: f64,
    /// Mean attempts per challenge.
    pub avg_attempts: f64,
    /// Recent half versus previous half.
    pub trend: Trend,
    /// Waterfall classification.
    pub skill_level: SkillLevel,
    /// Per-category failure rates.
    pub weaknesses: WeaknessReport,
}

fn mean(values: impl Iterator<Item = u32>) -> f64 {
    let (sum, n) = values.fold((0.0, 0u32), |(s, n), v| (s + f64::from(v), n + 1));
    if n == 0 { 0.0 } else { sum / f64::from(n) }
}

fn classify(avg_score: f64, failure_rate: f64) -> SkillLevel {
    const WATERFALL: [(SkillLevel, f64, f64); 4] = [
        (SkillLevel::Master, 90.0, 0.1),
        (SkillLevel::Expert, 80.0, 0.2),
        (SkillLevel::Advanced, 70.0, 0.3),
        (SkillLevel::Intermediate, 60.0, 0.5),
    ];
    WATERFALL
        .into_iter()
        .find(|&(_, min_score, max_failures)| avg_score >= min_score && failure_rate < max_failures)
        .map_or(SkillLevel::Beginner, |(level, _, _)| level)
}

fn trend(window: &[PerformanceRecord]) -> Trend {
    if window.len() < ANALYSIS_WINDOW {
        return Trend::Stable;
    }
    let previous = mean(window.iter().take(TREND_HALF).map(|r| r.score));
    let recent = mean(window.iter().skip(TREND_HALF).map(|r| r.score));
    if recent - previous > TREND_MARGIN {
        Trend::Improving
    } else if previous - recent > TREND_MARGIN {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// Analyze the most recent [`ANALYSIS_WINDOW`] records of a history
/// (oldest first). Returns `None` for an empty history.
pub fn analyze_performance(history: &[PerformanceRecord]) -> Option<PerformanceStats> {
    if history.is_empty() {
        return None;
    }
    let start = history.len().saturating_sub(ANALYSIS_WINDOW);
    let window = history.get(start..).unwrap_or(history);

    let failures = window.iter().filter(|r| r.is_failure()).count();
    let failure_rate = failures as f64 / window.len() as f64;
    let avg_score = mean(window.iter().map(|r| r.score));

    Some(PerformanceStats {
        sample_size: window.len(),
        avg_score,
        avg_time_secs: mean(window.iter().map(|r| r.time_spent_secs)),
        failure_rate,
        avg_attempts: mean(window.iter().map(|r| r.attempts)),
        trend: trend(window),
        skill_level: classify(avg_score, failure_rate),
        weaknesses: weaknesses(window),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use chrono::Utc;
    use launchpad_types::ComplexityTier;

    use super::*;

    pub(crate) fn record(kind: ChallengeType, score: u32, spent: u32, limit: u32, attempts: u32) -> PerformanceRecord {
        PerformanceRecord {
            challenge_id: format!("{kind}-{score}"),
            challenge_type: kind,
            score,
            time_spent_secs: spent,
            time_limit_secs: limit,
            attempts,
            hints_used: 0,
            difficulty: ComplexityTier::Medium,
            recorded_at: Utc::now(),
        }
    }

    pub(crate) fn scores(values: &[u32]) -> Vec<PerformanceRecord> {
        values
            .iter()
            .map(|&s| record(ChallengeType::Calculation, s, 60, 180, 1))
            .collect()
    }

    #[test]
    fn empty_history_has_no_stats() {
        assert!(analyze_performance(&[]).is_none());
    }

    #[test]
    fn ten_nineties_is_master() {
        let stats = analyze_performance(&scores(&[90; 10])).unwrap();
        assert_eq!(stats.skill_level, SkillLevel::Master);
        assert!(stats.failure_rate.abs() < f64::EPSILON);
        assert_eq!(stats.trend, Trend::Stable);
    }

    #[test]
    fn waterfall_checks_failure_rate_too() {
        // Mean 90 but two failures out of ten: not master, not expert.
        let values = [50, 50, 100, 100, 100, 100, 100, 100, 100, 100];
        let stats = analyze_performance(&scores(&values)).unwrap();
        assert!((stats.avg_score - 90.0).abs() < 1e-9);
        assert_eq!(stats.skill_level, SkillLevel::Advanced);
    }

    #[test]
    fn low_scores_are_beginner() {
        let stats = analyze_performance(&scores(&[30, 40, 20])).unwrap();
        assert_eq!(stats.skill_level, SkillLevel::Beginner);
    }

    #[test]
    fn only_last_ten_count() {
        let mut values = vec![0; 20];
        values.extend([80; 10]);
        let stats = analyze_performance(&scores(&values)).unwrap();
        assert_eq!(stats.sample_size, 10);
        assert!((stats.avg_score - 80.0).abs() < 1e-9);
    }

    #[test]
    fn trend_compares_halves() {
        let improving = analyze_performance(&scores(&[50, 50, 50, 50, 50, 80, 80, 80, 80, 80])).unwrap();
        assert_eq!(improving.trend, Trend::Improving);

        let declining = analyze_performance(&scores(&[80, 80, 80, 80, 80, 60, 60, 60, 60, 60])).unwrap();
        assert_eq!(declining.trend, Trend::Declining);

        let short = analyze_performance(&scores(&[10, 10, 10, 90, 90, 90])).unwrap();
        assert_eq!(short.trend, Trend::Stable);
    }

    #[test]
    fn weakness_rates_use_membership() {
        let history = vec![
            record(ChallengeType::Logic, 40, 170, 180, 1),
            record(ChallengeType::Logic, 50, 60, 180, 2),
            record(ChallengeType::Logic, 90, 60, 180, 1),
            record(ChallengeType::Strategy, 95, 30, 180, 3),
        ];
        let stats = analyze_performance(&history).unwrap();
        let w = &stats.weaknesses;

        assert!((w.rate(WeakArea::Logic) - 2.0 / 3.0).abs() < 1e-9);
        assert!(w.rate(WeakArea::Calculation).abs() < f64::EPSILON);
        assert!((w.rate(WeakArea::TimeManagement) - 1.0).abs() < 1e-9);
        assert!((w.rate(WeakArea::Accuracy) - 0.5).abs() < 1e-9);

        assert_eq!(w.weak_areas(), vec![WeakArea::Logic, WeakArea::TimeManagement]);
        assert_eq!(w.weakest(), Some(WeakArea::TimeManagement));
    }

    #[test]
    fn weakest_breaks_ties_by_category_order() {
        let history = vec![
            record(ChallengeType::Calculation, 10, 60, 180, 1),
            record(ChallengeType::Strategy, 10, 60, 180, 1),
        ];
        let stats = analyze_performance(&history).unwrap();
        assert_eq!(stats.weaknesses.weakest(), Some(WeakArea::Calculation));
    }
}

//! Decision streak state and its display form.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use launchpad_types::DecisionQuality;

/// Streak length at which the player goes on fire.
pub const ON_FIRE_THRESHOLD: u32 = 3;

/// Streak counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboState {
    /// Consecutive excellent decisions since the last poor one.
    pub current_combo: u32,
    /// Longest streak this run.
    pub max_combo: u32,
    /// Set at [`ON_FIRE_THRESHOLD`]; cleared only by a poor decision.
    pub on_fire: bool,
    /// Most recent grade, if any.
    pub last_decision_quality: Option<DecisionQuality>,
}

/// What a single update did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// Streak grew by one.
    Extended,
    /// Nothing changed.
    Held,
    /// Streak was reset to zero from the given length.
    Broken {
        /// Length before the reset.
        lost: u32,
    },
}

impl ComboState {
    /// Apply one decision grade.
    pub fn update(&mut self, quality: DecisionQuality) -> StreakChange {
        let change = match quality {
            DecisionQuality::Excellent => {
                self.current_combo = self.current_combo.saturating_add(1);
                StreakChange::Extended
            }
            DecisionQuality::Good => StreakChange::Held,
            DecisionQuality::Poor => {
                let lost = self.current_combo;
                self.current_combo = 0;
                self.on_fire = false;
                StreakChange::Broken { lost }
            }
        };
        self.last_decision_quality = Some(quality);
        self.max_combo = self.max_combo.max(self.current_combo);

        if !self.on_fire && self.current_combo >= ON_FIRE_THRESHOLD {
            self.on_fire = true;
            info!(streak = self.current_combo, "on fire");
        }
        if let StreakChange::Broken { lost } = change
            && lost > 0
        {
            info!(lost, "streak broken");
        }
        debug!(%quality, current = self.current_combo, max = self.max_combo, "streak updated");
        change
    }

    /// `1 + 0.1 * current` while on fire, else `1`.
    pub fn on_fire_multiplier(&self) -> Decimal {
        if !self.on_fire {
            return Decimal::ONE;
        }
        Decimal::ONE.saturating_add(Decimal::new(i64::from(self.current_combo), 1))
    }

    /// Display tier for the current streak.
    pub const fn tier(&self) -> ComboTier {
        match self.current_combo {
            0 => ComboTier::None,
            1 | 2 => ComboTier::Warm,
            3 | 4 => ComboTier::OnFire,
            _ => ComboTier::Unstoppable,
        }
    }

    /// Everything a HUD needs to draw the streak.
    pub fn display(&self) -> ComboDisplay {
        let tier = self.tier();
        ComboDisplay {
            count: self.current_combo,
            max: self.max_combo,
            on_fire: self.on_fire,
            multiplier: self.on_fire_multiplier(),
            tier,
            label: tier.label().to_owned(),
        }
    }
}

/// Coarse streak band for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComboTier {
    /// No streak.
    None,
    /// One or two.
    Warm,
    /// Three or four.
    OnFire,
    /// Five or more.
    Unstoppable,
}

impl ComboTier {
    /// Short label for the tier.
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Warm => "Warming up",
            Self::OnFire => "On fire!",
            Self::Unstoppable => "Unstoppable!",
        }
    }
}

/// Read-only view of the streak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboDisplay {
    /// Current streak.
    pub count: u32,
    /// Best streak.
    pub max: u32,
    /// Whether the on-fire bonus applies.
    pub on_fire: bool,
    /// The on-fire multiplier.
    pub multiplier: Decimal,
    /// Display band.
    pub tier: ComboTier,
    /// Label for the band.
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    use DecisionQuality::{Excellent, Good, Poor};

    fn run(grades: &[DecisionQuality]) -> ComboState {
        let mut state = ComboState::default();
        for &g in grades {
            state.update(g);
        }
        state
    }

    #[test]
    fn three_excellent_from_zero_sets_on_fire() {
        let state = run(&[Excellent, Excellent, Excellent]);
        assert_eq!(state.current_combo, 3);
        assert!(state.on_fire);
        assert_eq!(state.max_combo, 3);
    }

    #[test]
    fn poor_resets_a_hot_streak() {
        let mut state = ComboState {
            current_combo: 4,
            max_combo: 4,
            on_fire: true,
            last_decision_quality: Some(Excellent),
        };
        let change = state.update(Poor);
        assert_eq!(change, StreakChange::Broken { lost: 4 });
        assert_eq!(state.current_combo, 0);
        assert!(!state.on_fire);
        assert_eq!(state.max_combo, 4);
    }

    #[test]
    fn good_at_zero_stays_zero() {
        let state = run(&[Good]);
        assert_eq!(state.current_combo, 0);
        assert_eq!(state.last_decision_quality, Some(Good));
    }

    #[test]
    fn good_preserves_without_incrementing() {
        let state = run(&[Excellent, Excellent, Good, Good]);
        assert_eq!(state.current_combo, 2);
        assert!(!state.on_fire);
    }

    #[test]
    fn on_fire_survives_good_decisions() {
        let state = run(&[Excellent, Excellent, Excellent, Good]);
        assert!(state.on_fire);
        assert_eq!(state.current_combo, 3);
    }

    #[test]
    fn max_combo_is_never_lower_than_current() {
        let grades = [Excellent, Good, Excellent, Poor, Excellent, Excellent, Excellent, Excellent, Good, Poor];
        let mut state = ComboState::default();
        for g in grades {
            state.update(g);
            assert!(state.max_combo >= state.current_combo);
        }
        assert_eq!(state.max_combo, 4);
    }

    #[test]
    fn on_fire_multiplier_scales_with_streak() {
        assert_eq!(run(&[Excellent, Excellent]).on_fire_multiplier(), Decimal::ONE);
        assert_eq!(run(&[Excellent; 3]).on_fire_multiplier(), Decimal::new(13, 1));
        assert_eq!(run(&[Excellent; 5]).on_fire_multiplier(), Decimal::new(15, 1));
    }

    #[test]
    fn display_tiers() {
        assert_eq!(run(&[]).display().tier, ComboTier::None);
        assert_eq!(run(&[Excellent, Excellent]).display().tier, ComboTier::Warm);
        assert_eq!(run(&[Excellent; 4]).display().tier, ComboTier::OnFire);
        let d = run(&[Excellent; 6]).display();
        assert_eq!(d.tier, ComboTier::Unstoppable);
        assert_eq!(d.label, "Unstoppable!");
        assert_eq!(d.count, 6);
    }
}

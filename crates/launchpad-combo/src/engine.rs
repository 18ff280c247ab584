//! Window checks, bonus composition, and snapshots.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use launchpad_types::{DecisionQuality, ResourceMap, SkillUseRecord};

use crate::ComboError;
use crate::definition::{ComboBook, ComboKind, Synergy};
use crate::streak::{ComboDisplay, ComboState, StreakChange};

/// Current snapshot format version.
pub const COMBO_SNAPSHOT_VERSION: u32 = 1;

/// Combo engine tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    /// How many of the most recent skill uses count toward synergies.
    pub window_size: usize,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self { window_size: 10 }
    }
}

/// One definition that matched this window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynergyMatch {
    /// Definition id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display icon.
    pub icon: String,
    /// Regular synergy or hidden combo.
    pub kind: ComboKind,
    /// Required skills present in the window.
    pub matched: usize,
    /// Required skills in total.
    pub required: usize,
    /// Every required skill is present.
    pub complete: bool,
    /// A hidden combo revealed by this check.
    pub just_discovered: bool,
    /// Growth multiplier contributed.
    pub multiplier: Decimal,
    /// Flat resource bonus contributed.
    pub bonus: ResourceMap,
}

impl SynergyMatch {
    fn from_definition(def: &Synergy, kind: ComboKind, matched: usize) -> Self {
        let required = def.skills.len();
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            icon: def.icon.clone(),
            kind,
            matched,
            required,
            complete: matched == required,
            just_discovered: kind == ComboKind::Hidden,
            multiplier: def.multiplier,
            bonus: def.bonus.clone(),
        }
    }
}

/// Result of checking a skill window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynergyCheck {
    /// Active synergies, then hidden combos discovered by this check.
    pub active: Vec<SynergyMatch>,
}

impl SynergyCheck {
    /// Hidden combos revealed by this check.
    pub fn discovered(&self) -> impl Iterator<Item = &SynergyMatch> {
        self.active.iter().filter(|m| m.just_discovered)
    }

    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// The growth magnitudes of a skill outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthResult {
    /// New users gained.
    pub user_growth: Decimal,
    /// Revenue gained.
    pub revenue_growth: Decimal,
}

/// A growth result after synergy multipliers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusResult {
    /// Scaled growth, floored to whole units.
    pub result: GrowthResult,
    /// Product of every active multiplier.
    pub total_multiplier: Decimal,
    /// Summed flat bonuses for the caller to grant.
    pub bonuses: ResourceMap,
}

/// Serializable streak and discovery state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboSnapshot {
    /// Format version; must equal [`COMBO_SNAPSHOT_VERSION`] to import.
    pub version: u32,
    /// Streak counters.
    pub state: ComboState,
    /// Ids of hidden combos already revealed.
    pub discovered: BTreeSet<String>,
}

/// Detects synergies over a skill window and tracks the decision streak.
#[derive(Debug, Clone)]
pub struct ComboEngine {
    config: ComboConfig,
    book: ComboBook,
    state: ComboState,
    discovered: BTreeSet<String>,
}

impl ComboEngine {
    /// Create an engine with a fresh streak and nothing discovered.
    pub fn new(config: ComboConfig, book: ComboBook) -> Self {
        Self {
            config,
            book,
            state: ComboState::default(),
            discovered: BTreeSet::new(),
        }
    }

    /// Create an engine over the stock definitions.
    ///
    /// # Errors
    ///
    /// Propagates definition validation errors.
    pub fn with_builtin_book(config: ComboConfig) -> Result<Self, ComboError> {
        Ok(Self::new(config, ComboBook::builtin()?))
    }

    /// The engine's configuration.
    pub const fn config(&self) -> &ComboConfig {
        &self.config
    }

    /// The registered definitions.
    pub const fn book(&self) -> &ComboBook {
        &self.book
    }

    /// Current streak counters.
    pub const fn state(&self) -> &ComboState {
        &self.state
    }

    /// Ids of hidden combos revealed so far.
    pub const fn discovered(&self) -> &BTreeSet<String> {
        &self.discovered
    }

    /// Look up a definition by id.
    ///
    /// # Errors
    ///
    /// Returns [`ComboError::UnknownSynergy`] for an unregistered id.
    pub fn synergy(&self, id: &str) -> Result<&Synergy, ComboError> {
        self.book.get(id).map(|(s, _)| s)
    }

    // -----------------------------------------------------------------------
    // Streak
    // -----------------------------------------------------------------------

    /// Apply one decision grade to the streak.
    pub fn update_combo_state(&mut self, quality: DecisionQuality) -> StreakChange {
        self.state.update(quality)
    }

    /// Zero the current streak without touching the best streak.
    pub fn reset_streak(&mut self) {
        self.state.current_combo = 0;
        self.state.on_fire = false;
        debug!("streak reset");
    }

    /// The on-fire multiplier (`1` when not on fire).
    pub fn on_fire_multiplier(&self) -> Decimal {
        self.state.on_fire_multiplier()
    }

    /// Synergy multiplier composed with the on-fire multiplier.
    pub fn total_effectiveness(&self, synergy_multiplier: Decimal) -> Decimal {
        synergy_multiplier.saturating_mul(self.on_fire_multiplier())
    }

    /// Streak view for display.
    pub fn combo_display(&self) -> ComboDisplay {
        self.state.display()
    }

    // -----------------------------------------------------------------------
    // Synergies
    // -----------------------------------------------------------------------

    /// Check the most recent `window_size` entries of a skill log.
    ///
    /// Every synergy with two or more of its skills present is reported,
    /// with `complete` set when all of them are. A hidden combo is reported
    /// only when all of its skills are present and it has not been seen
    /// before; it is then recorded as discovered for good.
    pub fn check_synergies(&mut self, log: &[SkillUseRecord]) -> SynergyCheck {
        let start = log.len().saturating_sub(self.config.window_size);
        let present: BTreeSet<&str> = log.iter().skip(start).map(|r| r.skill.as_str()).collect();

        let mut check = SynergyCheck::default();
        for def in self.book.synergies() {
            let matched = def.match_count(&present);
            if matched >= 2 {
                check.active.push(SynergyMatch::from_definition(def, ComboKind::Synergy, matched));
            }
        }
        for def in self.book.hidden() {
            if self.discovered.contains(&def.id) {
                continue;
            }
            let matched = def.match_count(&present);
            if matched == def.skills.len() {
                info!(combo = %def.id, name = %def.name, "hidden combo discovered");
                self.discovered.insert(def.id.clone());
                check.active.push(SynergyMatch::from_definition(def, ComboKind::Hidden, matched));
            }
        }

        if !check.is_empty() {
            debug!(matches = check.active.len(), window = present.len(), "synergies active");
        }
        check
    }

    /// Scale a growth result by every matched multiplier and sum the flat
    /// bonuses. Multipliers compose by product; growth is floored.
    pub fn apply_synergy_bonus(base: GrowthResult, matches: &[SynergyMatch]) -> BonusResult {
        let mut total_multiplier = Decimal::ONE;
        let mut bonuses = ResourceMap::new();
        for m in matches {
            total_multiplier = total_multiplier.saturating_mul(m.multiplier);
            for (&resource, &amount) in &m.bonus {
                let entry = bonuses.entry(resource).or_insert(Decimal::ZERO);
                *entry = entry.saturating_add(amount);
            }
        }
        BonusResult {
            result: GrowthResult {
                user_growth: base.user_growth.saturating_mul(total_multiplier).floor(),
                revenue_growth: base.revenue_growth.saturating_mul(total_multiplier).floor(),
            },
            total_multiplier,
            bonuses,
        }
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Capture the streak and discovery set.
    pub fn export(&self) -> ComboSnapshot {
        ComboSnapshot {
            version: COMBO_SNAPSHOT_VERSION,
            state: self.state,
            discovered: self.discovered.clone(),
        }
    }

    /// Check a snapshot without mutating.
    ///
    /// # Errors
    ///
    /// Returns [`ComboError::MalformedImport`] on a version mismatch, a
    /// best streak below the current one, an on-fire flag without a long
    /// enough streak, or a discovered id that is not a hidden combo.
    pub fn validate_snapshot(&self, snapshot: &ComboSnapshot) -> Result<(), ComboError> {
        let malformed = |reason: String| Err(ComboError::MalformedImport { reason });
        if snapshot.version != COMBO_SNAPSHOT_VERSION {
            return malformed(format!(
                "unsupported version {} (expected {COMBO_SNAPSHOT_VERSION})",
                snapshot.version
            ));
        }
        let s = &snapshot.state;
        if s.max_combo < s.current_combo {
            return malformed(format!("max combo {} below current {}", s.max_combo, s.current_combo));
        }
        if s.on_fire && s.current_combo < crate::streak::ON_FIRE_THRESHOLD {
            return malformed(format!("on fire with a streak of {}", s.current_combo));
        }
        if let Some(unknown) = snapshot.discovered.iter().find(|id| !self.book.is_hidden(id)) {
            return malformed(format!("{unknown} is not a hidden combo"));
        }
        Ok(())
    }

    /// Replace the streak and discovery set.
    ///
    /// # Errors
    ///
    /// See [`validate_snapshot`](Self::validate_snapshot). State is
    /// untouched on error.
    pub fn import(&mut self, snapshot: ComboSnapshot) -> Result<(), ComboError> {
        self.validate_snapshot(&snapshot)?;
        self.state = snapshot.state;
        self.discovered = snapshot.discovered;
        info!(discovered = self.discovered.len(), "combo state imported");
        Ok(())
    }
}

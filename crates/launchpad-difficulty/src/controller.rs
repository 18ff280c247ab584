//! Per-player performance histories and next-challenge recommendations.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use launchpad_types::{ChallengeType, DifficultyAction, PerformanceRecord, PlayerId, WeakArea};

use crate::DifficultyError;
use crate::params::ChallengeParams;
use crate::policy::{DifficultyAdjustment, adjust_difficulty};
use crate::stats::{PerformanceStats, analyze_performance};

/// Current snapshot format version.
pub const DIFFICULTY_SNAPSHOT_VERSION: u32 = 1;

/// Controller tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Records retained per player.
    pub history_cap: usize,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self { history_cap: 50 }
    }
}

/// What to play next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeRecommendation {
    /// Challenge type to serve.
    pub challenge_type: ChallengeType,
    /// The weakness being targeted, if any.
    pub focus: Option<WeakArea>,
    /// Policy row that produced `params`.
    pub action: DifficultyAction,
    /// Parameters for the challenge.
    pub params: ChallengeParams,
    /// Short explanation.
    pub reason: String,
}

/// Serializable copy of every player's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultySnapshot {
    /// Format version; must equal [`DIFFICULTY_SNAPSHOT_VERSION`] to import.
    pub version: u32,
    /// Records per player, oldest first.
    pub histories: BTreeMap<PlayerId, Vec<PerformanceRecord>>,
}

/// Keeps rolling histories and retunes challenges per player.
#[derive(Debug, Clone, Default)]
pub struct DifficultyController {
    config: DifficultyConfig,
    histories: BTreeMap<PlayerId, VecDeque<PerformanceRecord>>,
}

fn validate_record(record: &PerformanceRecord) -> Result<(), DifficultyError> {
    if record.score > 100 {
        return Err(DifficultyError::ScoreOutOfRange { score: record.score });
    }
    if record.time_limit_secs == 0 {
        return Err(DifficultyError::ZeroTimeLimit {
            challenge_id: record.challenge_id.clone(),
        });
    }
    Ok(())
}

impl DifficultyController {
    /// Create a controller with no players.
    pub fn new(config: DifficultyConfig) -> Self {
        Self {
            config,
            histories: BTreeMap::new(),
        }
    }

    /// The controller's configuration.
    pub const fn config(&self) -> &DifficultyConfig {
        &self.config
    }

    /// Append a finished attempt, evicting the oldest past the cap.
    ///
    /// # Errors
    ///
    /// Returns [`DifficultyError::ScoreOutOfRange`] for a score above 100 or
    /// [`DifficultyError::ZeroTimeLimit`] for a zero time limit.
    pub fn record_performance(&mut self, player: PlayerId, record: PerformanceRecord) -> Result<(), DifficultyError> {
        validate_record(&record)?;
        let cap = self.config.history_cap;
        let history = self.histories.entry(player).or_default();
        debug!(%player, challenge = %record.challenge_id, score = record.score, "performance recorded");
        history.push_back(record);
        while history.len() > cap {
            history.pop_front();
        }
        Ok(())
    }

    /// A player's records, oldest first. Empty for an unknown player.
    pub fn history(&self, player: PlayerId) -> Vec<PerformanceRecord> {
        self.histories
            .get(&player)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Players with at least one record.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.histories.keys().copied()
    }

    /// Statistics over the player's recent attempts.
    ///
    /// # Errors
    ///
    /// Returns [`DifficultyError::UnknownPlayer`] if nothing was recorded.
    pub fn analyze_performance(&self, player: PlayerId) -> Result<PerformanceStats, DifficultyError> {
        analyze_performance(&self.history(player)).ok_or(DifficultyError::UnknownPlayer(player))
    }

    /// Retune `current` for the player's next challenge.
    pub fn adjust_difficulty(&self, player: PlayerId, current: &ChallengeParams) -> DifficultyAdjustment {
        adjust_difficulty(&self.history(player), current)
    }

    /// Pick the next challenge type and its parameters.
    ///
    /// Targets the weakest flagged area. Type categories map directly to a
    /// challenge type; time management and accuracy, which cut across
    /// types, fall back to the least-practiced type. With no weakness the
    /// least-practiced type is chosen.
    pub fn recommend_next_challenge(&self, player: PlayerId, current: &ChallengeParams) -> ChallengeRecommendation {
        let history = self.history(player);
        let adjustment = adjust_difficulty(&history, current);
        let focus = adjustment.stats.as_ref().and_then(|s| s.weaknesses.weakest());
        let least = least_practiced(&history);

        let (challenge_type, why) = match focus {
            Some(WeakArea::Calculation) => (ChallengeType::Calculation, "targeting calculation weakness".to_owned()),
            Some(WeakArea::Logic) => (ChallengeType::Logic, "targeting logic weakness".to_owned()),
            Some(WeakArea::Strategy) => (ChallengeType::Strategy, "targeting strategy weakness".to_owned()),
            Some(area) => (least, format!("targeting {area} on least-practiced {least}")),
            None => (least, format!("least-practiced type {least}")),
        };

        info!(%player, %challenge_type, action = %adjustment.action, "challenge recommended");
        ChallengeRecommendation {
            challenge_type,
            focus,
            action: adjustment.action,
            params: adjustment.params,
            reason: format!("{why}; {}", adjustment.reason),
        }
    }

    /// Drop a player's history.
    pub fn forget(&mut self, player: PlayerId) -> bool {
        self.histories.remove(&player).is_some()
    }

    /// Capture every history.
    pub fn export(&self) -> DifficultySnapshot {
        DifficultySnapshot {
            version: DIFFICULTY_SNAPSHOT_VERSION,
            histories: self
                .histories
                .iter()
                .map(|(p, h)| (*p, h.iter().cloned().collect()))
                .collect(),
        }
    }

    /// Check a snapshot without mutating.
    ///
    /// # Errors
    ///
    /// Returns [`DifficultyError::MalformedImport`] on a version mismatch or
    /// an invalid record.
    pub fn validate_snapshot(snapshot: &DifficultySnapshot) -> Result<(), DifficultyError> {
        if snapshot.version != DIFFICULTY_SNAPSHOT_VERSION {
            return Err(DifficultyError::MalformedImport {
                reason: format!(
                    "unsupported version {} (expected {DIFFICULTY_SNAPSHOT_VERSION})",
                    snapshot.version
                ),
            });
        }
        for (player, records) in &snapshot.histories {
            for record in records {
                validate_record(record).map_err(|e| DifficultyError::MalformedImport {
                    reason: format!("player {player}: {e}"),
                })?;
            }
        }
        Ok(())
    }

    /// Replace every history with the snapshot's. Histories longer than the
    /// cap keep their newest records.
    ///
    /// # Errors
    ///
    /// See [`validate_snapshot`](Self::validate_snapshot). State is untouched
    /// on error.
    pub fn import(&mut self, snapshot: DifficultySnapshot) -> Result<(), DifficultyError> {
        Self::validate_snapshot(&snapshot)?;

        let cap = self.config.history_cap;
        self.histories = snapshot
            .histories
            .into_iter()
            .map(|(player, records)| {
                let skip = records.len().saturating_sub(cap);
                (player, records.into_iter().skip(skip).collect())
            })
            .collect();
        info!(players = self.histories.len(), "difficulty histories imported");
        Ok(())
    }
}

/// The type with the fewest records; earlier types win ties.
fn least_practiced(history: &[PerformanceRecord]) -> ChallengeType {
    ChallengeType::ALL
        .into_iter()
        .min_by_key(|t| history.iter().filter(|r| r.challenge_type == *t).count())
        .unwrap_or(ChallengeType::Calculation)
}

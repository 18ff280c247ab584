//! Headless runner for the Launchpad simulation.
//!
//! Plays a scripted founder through a seeded session and logs what
//! happens: events and how they were answered, skills and the synergies
//! they completed, challenge results and how difficulty responded.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `LAUNCHPAD_CONFIG` (default
//!    `launchpad-config.yaml`), falling back to defaults when absent
//! 2. Initialize structured logging (tracing), text or JSON
//! 3. Build the session and the founder's RNG from the configured seed
//! 4. Play the requested number of turns (first CLI argument, default 30)
//! 5. Log the summary and, if `LAUNCHPAD_SNAPSHOT` is set, write the final
//!    session snapshot there as JSON

mod error;
mod playbook;

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use launchpad_core::{GameConfig, GameSession, LogFormat, LoggingConfig, SkillResult};
use launchpad_ledger::LedgerNotification;
use launchpad_types::ResourceKind;

use crate::error::SimError;

/// Turns played when no count is given.
const DEFAULT_TURNS: u64 = 30;

/// Hours restored at the start of each simulated week.
const WEEKLY_HOURS: i64 = 40;

/// Energy restored at the start of each simulated week.
const WEEKLY_ENERGY: i64 = 15;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration loading or the run itself fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        seed = config.session.seed,
        trigger_probability = %config.events.engine.trigger_probability,
        combo_window = config.combo.window_size,
        "Configuration loaded"
    );

    // 3. Build the session.
    let turns = parse_turns(std::env::args().nth(1))?;
    let mut session = GameSession::new(&config)?;
    let mut founder_rng = SmallRng::seed_from_u64(config.session.seed.wrapping_add(1));
    info!(player = %session.player(), turns, "Session ready");

    // 4. Play.
    let played = run(&mut session, &mut founder_rng, turns)?;

    // 5. Summarize.
    log_summary(&session, played);
    if let Some(path) = std::env::var_os("LAUNCHPAD_SNAPSHOT").map(PathBuf::from) {
        let json = session.export().to_json().map_err(SimError::from)?;
        std::fs::write(&path, json).map_err(SimError::from)?;
        info!(path = %path.display(), "Snapshot written");
    }

    info!("launchpad-sim finished");
    Ok(())
}

/// Play up to `turns` turns. Stops early when the cash runs out.
fn run(session: &mut GameSession, rng: &mut SmallRng, turns: u64) -> Result<u64, SimError> {
    for _ in 0..turns {
        let report = session.advance_turn();
        for notification in &report.notifications {
            log_notification(notification);
        }

        if let Some(resolution) = playbook::respond_to_event(session)? {
            info!(
                turn = report.turn,
                event = %resolution.event.id,
                choice = %resolution.choice_id,
                success = resolution.success,
                message = %resolution.outcome.message,
                "Event answered"
            );
        }

        match session.use_skill(playbook::next_skill(report.turn, rng))? {
            SkillResult::Applied(outcome) => {
                for found in outcome.synergies.discovered() {
                    info!(combo = %found.name, icon = %found.icon, "Hidden combo found");
                }
                debug!(
                    turn = report.turn,
                    users = %outcome.growth.user_growth,
                    revenue = %outcome.growth.revenue_growth,
                    effectiveness = %outcome.effectiveness,
                    "Skill scored"
                );
            }
            SkillResult::Unaffordable { shortfalls } => {
                let short: Vec<&str> = shortfalls.iter().map(|s| s.resource.as_str()).collect();
                info!(turn = report.turn, short = ?short, "Skill skipped");
            }
        }

        let recommendation = session.recommend_next_challenge();
        let record =
            playbook::attempt_challenge(recommendation.challenge_type, session.challenge_params(), rng);
        let score = record.score;
        let adjustment = session.record_challenge(record)?;
        debug!(
            turn = report.turn,
            challenge = %recommendation.challenge_type,
            score,
            action = %adjustment.action,
            reason = %adjustment.reason,
            "Challenge played"
        );

        let ledger = session.ledger_mut();
        ledger
            .gain(ResourceKind::Time, Decimal::from(WEEKLY_HOURS), "new week")
            .map_err(launchpad_core::SessionError::from)?;
        ledger
            .gain(ResourceKind::Energy, Decimal::from(WEEKLY_ENERGY), "weekend")
            .map_err(launchpad_core::SessionError::from)?;

        if session.ledger().value(ResourceKind::Cash) <= Decimal::ZERO {
            warn!(turn = report.turn, "Out of cash");
            return Ok(report.turn);
        }
    }
    Ok(session.turn())
}

fn log_notification(notification: &LedgerNotification) {
    match notification {
        LedgerNotification::EnteredCritical {
            resource,
            value,
            threshold,
        } => warn!(%resource, %value, %threshold, "Resource critical"),
        LedgerNotification::BecameEmpty { resource } => warn!(%resource, "Resource exhausted"),
        LedgerNotification::BecameFull { resource } => debug!(%resource, "Resource full"),
        LedgerNotification::Insufficient {
            resource,
            requested,
            available,
        } => debug!(%resource, %requested, %available, "Insufficient resource"),
        LedgerNotification::Changed { .. } => {}
    }
}

fn log_summary(session: &GameSession, played: u64) {
    let ledger = session.ledger();
    for resource in ResourceKind::ALL {
        info!(
            %resource,
            value = %ledger.value(resource),
            percent = %ledger.percentage(resource).round_dp(1),
            "Final level"
        );
    }

    let combo = session.combo_display();
    let discovered: Vec<&str> = session.combo().discovered().iter().map(String::as_str).collect();
    let resolved = session.events().history().len();
    let successes = session.events().history().iter().filter(|h| h.success).count();
    let challenges = session.difficulty().history(session.player()).len();
    let stats = session.difficulty().analyze_performance(session.player()).ok();

    info!(
        turns = played,
        events_resolved = resolved,
        event_successes = successes,
        best_streak = combo.max,
        hidden_combos = ?discovered,
        challenges,
        skill_level = stats.as_ref().map_or("-", |s| s.skill_level.as_str()),
        avg_score = stats.as_ref().map_or(0.0, |s| s.avg_score),
        next_tier = %session.challenge_params().complexity,
        "Run complete"
    );
}

/// Parse the optional turn-count argument.
fn parse_turns(arg: Option<String>) -> Result<u64, SimError> {
    let Some(raw) = arg else {
        return Ok(DEFAULT_TURNS);
    };
    match raw.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(SimError::InvalidTurns { value: raw }),
    }
}

/// Load the game configuration.
///
/// Reads the file named by `LAUNCHPAD_CONFIG`, or `launchpad-config.yaml`
/// in the working directory. A missing file means defaults.
fn load_config() -> Result<GameConfig, SimError> {
    let path = std::env::var_os("LAUNCHPAD_CONFIG")
        .map_or_else(|| PathBuf::from("launchpad-config.yaml"), PathBuf::from);
    load_config_from(&path)
}

fn load_config_from(path: &Path) -> Result<GameConfig, SimError> {
    if path.exists() {
        Ok(GameConfig::from_file(path)?)
    } else {
        // Logging is not up yet; defaults are reported once it is.
        let mut config = GameConfig::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn turns_default_and_parse() {
        assert_eq!(parse_turns(None).unwrap(), DEFAULT_TURNS);
        assert_eq!(parse_turns(Some("12".to_owned())).unwrap(), 12);
        assert!(matches!(parse_turns(Some("0".to_owned())), Err(SimError::InvalidTurns { .. })));
        assert!(matches!(parse_turns(Some("many".to_owned())), Err(SimError::InvalidTurns { .. })));
    }

    #[test]
    fn missing_config_file_means_defaults() {
        let config = load_config_from(Path::new("/nonexistent/launchpad-config.yaml")).unwrap();
        assert_eq!(config.combo, GameConfig::default().combo);
    }

    #[test]
    fn seeded_runs_repeat() {
        let play = || {
            let mut session = GameSession::new(&GameConfig::default()).unwrap();
            let mut rng = SmallRng::seed_from_u64(7);
            let played = run(&mut session, &mut rng, 20).unwrap();
            (played, session.ledger().values(), session.events().history().len())
        };
        assert_eq!(play(), play());
    }
}

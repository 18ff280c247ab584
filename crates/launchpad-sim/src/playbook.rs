//! The scripted founder that plays a headless run.
//!
//! Every choice the founder makes is drawn from its own seeded RNG, kept
//! apart from the session's, so the session's event rolls stay identical
//! whatever the founder does.

use std::cmp::Reverse;

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use tracing::{debug, info};

use launchpad_combo::GrowthResult;
use launchpad_core::{GameSession, SessionError, SkillAction};
use launchpad_difficulty::ChallengeParams;
use launchpad_events::{ChoiceResolution, Resolution};
use launchpad_types::{
    ChallengeType, ComplexityTier, DecisionQuality, PerformanceRecord, ResourceKind, ResourceMap,
};

/// Skills in the order the founder cycles through them, with their hour
/// and cash costs.
const ROTATION: [(&str, i64, i64); 8] = [
    ("customer_interviews", 8, 0),
    ("mvp", 20, 5_000),
    ("analytics", 6, 500),
    ("content_marketing", 10, 1_000),
    ("seo", 8, 1_500),
    ("pitching", 12, 0),
    ("networking", 10, 800),
    ("financial_modeling", 8, 0),
];

/// Energy every skill costs.
const SKILL_ENERGY: i64 = 5;

/// The founder's pick for this turn.
pub fn next_skill(turn: u64, rng: &mut impl Rng) -> SkillAction {
    let slot = usize::try_from(turn).unwrap_or(0) % ROTATION.len();
    let (skill, hours, cash) = ROTATION.get(slot).copied().unwrap_or(("customer_interviews", 8, 0));

    let mut cost = ResourceMap::from([
        (ResourceKind::Time, Decimal::from(hours)),
        (ResourceKind::Energy, Decimal::from(SKILL_ENERGY)),
    ]);
    if cash > 0 {
        cost.insert(ResourceKind::Cash, Decimal::from(cash));
    }

    let quality = match rng.random_range(0..10) {
        0..5 => DecisionQuality::Excellent,
        5..8 => DecisionQuality::Good,
        _ => DecisionQuality::Poor,
    };

    SkillAction {
        skill: skill.to_owned(),
        tags: Vec::new(),
        cost,
        quality,
        base: GrowthResult {
            user_growth: Decimal::from(rng.random_range(50_i64..=150)),
            revenue_growth: Decimal::from(rng.random_range(500_i64..=2_000)),
        },
    }
}

/// Answer the pending event with the likeliest choice the founder can
/// afford. Dismisses the event when nothing is affordable.
pub fn respond_to_event(session: &mut GameSession) -> Result<Option<ChoiceResolution>, SessionError> {
    let Some(active) = session.events().active_event() else {
        return Ok(None);
    };
    let event_id = active.event.id.clone();
    let mut choices: Vec<(String, Decimal)> = active
        .event
        .choices
        .iter()
        .map(|c| (c.id.clone(), c.success_rate))
        .collect();
    choices.sort_by_key(|c| Reverse(c.1));

    for (choice_id, _) in choices {
        match session.resolve_event(&choice_id)? {
            Resolution::Resolved(resolution) => return Ok(Some(resolution)),
            Resolution::Unaffordable { shortfalls } => {
                debug!(%event_id, %choice_id, shortfalls = shortfalls.len(), "choice out of reach");
            }
        }
    }

    info!(%event_id, "no affordable choice, event dismissed");
    session.events_mut().clear_active();
    Ok(None)
}

/// Play one challenge of the given type at the given parameters.
///
/// Harder tiers lower the expected score; hints raise it.
pub fn attempt_challenge(kind: ChallengeType, params: &ChallengeParams, rng: &mut impl Rng) -> PerformanceRecord {
    let tier = ComplexityTier::ALL
        .iter()
        .position(|t| *t == params.complexity)
        .and_then(|i| i64::try_from(i).ok())
        .unwrap_or(0);
    let hints = i64::from(params.hints);
    let raw = 88 - tier * 8 + hints * 2 + rng.random_range(-20..=15);
    let score = u32::try_from(raw.clamp(0, 100)).unwrap_or(0);

    let share: u32 = rng.random_range(30..=100);
    let time_spent_secs = params.time_limit_secs.saturating_mul(share) / 100;
    let attempts = if score < PerformanceRecord::PASS_SCORE {
        rng.random_range(1..=params.max_attempts.max(1))
    } else {
        1
    };

    PerformanceRecord {
        challenge_id: format!("{kind}-{}", params.complexity),
        challenge_type: kind,
        score,
        time_spent_secs,
        time_limit_secs: params.time_limit_secs,
        attempts,
        hints_used: rng.random_range(0..=params.hints),
        difficulty: params.complexity,
        recorded_at: Utc::now(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use launchpad_core::GameConfig;

    use super::*;

    #[test]
    fn rotation_cycles() {
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(next_skill(0, &mut rng).skill, "customer_interviews");
        assert_eq!(next_skill(8, &mut rng).skill, "customer_interviews");
        assert_eq!(next_skill(1, &mut rng).skill, "mvp");
    }

    #[test]
    fn challenge_records_are_valid() {
        let mut rng = SmallRng::seed_from_u64(11);
        let params = ChallengeParams::default();
        for _ in 0..200 {
            let r = attempt_challenge(ChallengeType::Strategy, &params, &mut rng);
            assert!(r.score <= 100);
            assert!(r.time_spent_secs <= r.time_limit_secs);
            assert!((1..=params.max_attempts).contains(&r.attempts));
        }
    }

    #[test]
    fn unaffordable_event_is_dismissed() {
        let mut session = GameSession::new(&GameConfig::default()).unwrap();
        session.ledger_mut().set(ResourceKind::Energy, Decimal::ZERO, "exhausted");
        session.ledger_mut().set(ResourceKind::Cash, Decimal::ZERO, "broke");
        session.events_mut().force_trigger("server_outage").unwrap();

        assert!(respond_to_event(&mut session).unwrap().is_none());
        assert!(session.events().active_event().is_none());
    }
}

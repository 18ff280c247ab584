//! The event state machine.
//!
//! [`EventEngine`] is either idle or holding exactly one [`ActiveEvent`].
//! `tick` may move it from idle to awaiting a choice; `resolve_choice`
//! moves it back once the player can pay for the chosen response.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use launchpad_ledger::{EffectReport, ResourceLedger, Shortfall};
use launchpad_types::ResourceMap;

use crate::EventError;
use crate::catalog::{Event, EventCatalog, Outcome};
use crate::selection::{RarityWeights, pick_weighted, roll_probability};

/// Current snapshot format version.
pub const EVENT_SNAPSHOT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for event triggering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Chance per tick that an event fires, in `[0, 1]`.
    pub trigger_probability: Decimal,
    /// Selection weight per rarity.
    pub rarity_weights: RarityWeights,
    /// Maximum retained history entries.
    pub history_cap: usize,
    /// An event in this many most recent entries cannot be selected again.
    pub repeat_window: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            trigger_probability: Decimal::new(3, 1),
            rarity_weights: RarityWeights::default(),
            history_cap: 50,
            repeat_window: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A triggered event waiting for the player's choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEvent {
    /// Copy of the template.
    pub event: Event,
    /// When it fired.
    pub triggered_at: DateTime<Utc>,
}

/// One resolved event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHistoryEntry {
    /// The event template id.
    pub event_id: String,
    /// The choice the player made.
    pub choice_id: String,
    /// Whether the success outcome was drawn.
    pub success: bool,
    /// Actual resource changes from the outcome.
    pub effects: ResourceMap,
    /// When it was resolved.
    pub resolved_at: DateTime<Utc>,
}

/// A choice that was paid for and rolled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceResolution {
    /// The event that was resolved.
    pub event: Event,
    /// The choice made.
    pub choice_id: String,
    /// Whether the success outcome was drawn.
    pub success: bool,
    /// The outcome that applied.
    pub outcome: Outcome,
    /// What the outcome's effects actually did to the ledger.
    pub effects: EffectReport,
}

/// Result of [`EventEngine::resolve_choice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The choice was paid, rolled, and applied. The engine is idle again.
    Resolved(ChoiceResolution),
    /// The cost could not be covered. Nothing was charged and the event
    /// stays active so another choice can be tried.
    Unaffordable {
        /// Every resource that fell short.
        shortfalls: Vec<Shortfall>,
    },
}

/// Serializable copy of the engine's mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEngineSnapshot {
    /// Format version; must equal [`EVENT_SNAPSHOT_VERSION`] to import.
    pub version: u32,
    /// Id of the event awaiting a choice, if any.
    pub active_event_id: Option<String>,
    /// Resolved events, oldest first.
    pub history: Vec<EventHistoryEntry>,
}

// ---------------------------------------------------------------------------
// EventEngine
// ---------------------------------------------------------------------------

/// Triggers events from a catalog and resolves the player's responses.
#[derive(Debug, Clone)]
pub struct EventEngine {
    config: EventConfig,
    catalog: EventCatalog,
    active: Option<ActiveEvent>,
    history: VecDeque<EventHistoryEntry>,
}

impl EventEngine {
    /// Create an idle engine over a validated catalog.
    pub fn new(config: EventConfig, catalog: EventCatalog) -> Self {
        let history = VecDeque::with_capacity(config.history_cap);
        Self {
            config,
            catalog,
            active: None,
            history,
        }
    }

    /// Create an idle engine over the stock catalog.
    ///
    /// # Errors
    ///
    /// Propagates catalog validation errors.
    pub fn with_builtin_catalog(config: EventConfig) -> Result<Self, EventError> {
        Ok(Self::new(config, EventCatalog::builtin()?))
    }

    /// The engine's configuration.
    pub const fn config(&self) -> &EventConfig {
        &self.config
    }

    /// The catalog events are drawn from.
    pub const fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    /// The event awaiting a choice, if any.
    pub const fn active_event(&self) -> Option<&ActiveEvent> {
        self.active.as_ref()
    }

    /// Resolved events, oldest first.
    pub const fn history(&self) -> &VecDeque<EventHistoryEntry> {
        &self.history
    }

    /// Events that could fire against these resource levels: the
    /// precondition holds and the id is not among the most recent
    /// `repeat_window` history entries.
    pub fn eligible(&self, values: &ResourceMap) -> Vec<&Event> {
        self.catalog
            .iter()
            .filter(|e| e.precondition.holds(values))
            .filter(|e| !self.recently_resolved(&e.id))
            .collect()
    }

    fn recently_resolved(&self, event_id: &str) -> bool {
        self.history
            .iter()
            .rev()
            .take(self.config.repeat_window)
            .any(|h| h.event_id == event_id)
    }

    /// Run one turn of the trigger roll.
    ///
    /// Does nothing while an event is already active. Otherwise rolls
    /// against `trigger_probability`; on success picks a rarity-weighted
    /// eligible event and makes it active. Returns the newly active event.
    pub fn tick(&mut self, ledger: &ResourceLedger, rng: &mut impl Rng) -> Option<&ActiveEvent> {
        if self.active.is_some() {
            return None;
        }
        if !roll_probability(self.config.trigger_probability, rng) {
            return None;
        }

        let values = ledger.values();
        let eligible = self.eligible(&values);
        let Some(event) = pick_weighted(&eligible, &self.config.rarity_weights, rng) else {
            debug!("trigger roll passed but no event is eligible");
            return None;
        };
        let event = event.clone();

        info!(
            event_id = %event.id,
            category = %event.category,
            rarity = %event.rarity,
            eligible = eligible.len(),
            "event triggered"
        );
        self.active = Some(ActiveEvent {
            event,
            triggered_at: Utc::now(),
        });
        self.active.as_ref()
    }

    /// Make a specific catalog event active, bypassing the roll and the
    /// eligibility filter.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnknownEvent`] for an id not in the catalog, or
    /// [`EventError::EventAlreadyActive`] while another event is pending.
    pub fn force_trigger(&mut self, event_id: &str) -> Result<&ActiveEvent, EventError> {
        if let Some(active) = &self.active {
            return Err(EventError::EventAlreadyActive {
                active: active.event.id.clone(),
            });
        }
        let event = self
            .catalog
            .get(event_id)
            .ok_or_else(|| EventError::UnknownEvent(event_id.to_owned()))?
            .clone();

        info!(event_id, "event forced");
        Ok(&*self.active.insert(ActiveEvent {
            event,
            triggered_at: Utc::now(),
        }))
    }

    /// Dismiss the active event without resolving it. No history entry is
    /// written.
    pub fn clear_active(&mut self) -> Option<ActiveEvent> {
        let cleared = self.active.take();
        if let Some(a) = &cleared {
            debug!(event_id = %a.event.id, "active event dismissed");
        }
        cleared
    }

    /// Answer the active event with one of its choices.
    ///
    /// The choice's cost is charged all-or-nothing. If it cannot be paid the
    /// result is [`Resolution::Unaffordable`] and the event stays active.
    /// Otherwise the success rate is rolled, the matching outcome's effects
    /// are applied to the ledger, a history entry is appended, and the
    /// engine returns to idle.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::NoActiveEvent`] when idle and
    /// [`EventError::ChoiceNotFound`] for a choice the event does not have.
    pub fn resolve_choice(
        &mut self,
        choice_id: &str,
        ledger: &mut ResourceLedger,
        rng: &mut impl Rng,
    ) -> Result<Resolution, EventError> {
        let active = self.active.as_ref().ok_or(EventError::NoActiveEvent)?;
        let event_id = active.event.id.clone();
        let choice = active
            .event
            .choice(choice_id)
            .ok_or_else(|| EventError::ChoiceNotFound {
                event_id: event_id.clone(),
                choice_id: choice_id.to_owned(),
            })?
            .clone();

        let reason = format!("event {event_id}: {choice_id}");
        let check = ledger.consume_all(&choice.cost, &reason)?;
        if !check.ok {
            debug!(%event_id, choice_id, shortfalls = check.shortfalls.len(), "choice unaffordable");
            return Ok(Resolution::Unaffordable {
                shortfalls: check.shortfalls,
            });
        }

        let success = roll_probability(choice.success_rate, rng);
        let outcome = choice.outcome(success).clone();
        let effects = ledger.apply_effects(&outcome.effects, &reason)?;

        let Some(resolved) = self.active.take() else {
            return Err(EventError::NoActiveEvent);
        };
        self.push_history(EventHistoryEntry {
            event_id: event_id.clone(),
            choice_id: choice_id.to_owned(),
            success,
            effects: effects.applied.clone(),
            resolved_at: Utc::now(),
        });

        info!(%event_id, choice_id, success, unmet = effects.unmet.len(), "event resolved");
        Ok(Resolution::Resolved(ChoiceResolution {
            event: resolved.event,
            choice_id: choice_id.to_owned(),
            success,
            outcome,
            effects,
        }))
    }

    fn push_history(&mut self, entry: EventHistoryEntry) {
        if self.config.history_cap == 0 {
            return;
        }
        while self.history.len() >= self.config.history_cap {
            self.history.pop_front();
        }
        self.history.push_back(entry);
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Capture the active event id and history.
    pub fn export(&self) -> EventEngineSnapshot {
        EventEngineSnapshot {
            version: EVENT_SNAPSHOT_VERSION,
            active_event_id: self.active.as_ref().map(|a| a.event.id.clone()),
            history: self.history.iter().cloned().collect(),
        }
    }

    /// Check a snapshot against this engine's catalog without mutating.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::MalformedImport`] on a version mismatch or an
    /// active event id missing from the catalog.
    pub fn validate_snapshot(&self, snapshot: &EventEngineSnapshot) -> Result<(), EventError> {
        if snapshot.version != EVENT_SNAPSHOT_VERSION {
            return Err(EventError::MalformedImport {
                reason: format!(
                    "unsupported version {} (expected {EVENT_SNAPSHOT_VERSION})",
                    snapshot.version
                ),
            });
        }
        if let Some(id) = &snapshot.active_event_id
            && !self.catalog.contains(id)
        {
            return Err(EventError::MalformedImport {
                reason: format!("active event {id} is not in the catalog"),
            });
        }
        Ok(())
    }

    /// Replace the active event and history with a snapshot's. History
    /// beyond the cap keeps its newest entries.
    ///
    /// # Errors
    ///
    /// See [`validate_snapshot`](Self::validate_snapshot). State is untouched
    /// on error.
    pub fn import(&mut self, snapshot: EventEngineSnapshot) -> Result<(), EventError> {
        self.validate_snapshot(&snapshot)?;

        let active = snapshot
            .active_event_id
            .as_deref()
            .and_then(|id| self.catalog.get(id))
            .map(|event| ActiveEvent {
                event: event.clone(),
                triggered_at: Utc::now(),
            });

        let skip = snapshot.history.len().saturating_sub(self.config.history_cap);
        self.history = snapshot.history.into_iter().skip(skip).collect();
        self.active = active;
        info!(history = self.history.len(), active = self.active.is_some(), "event state imported");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use launchpad_types::{EventCategory, Rarity, ResourceKind};

    use super::*;
    use crate::catalog::{Choice, Precondition};

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn map(pairs: &[(ResourceKind, i64)]) -> ResourceMap {
        pairs.iter().map(|&(k, v)| (k, d(v))).collect()
    }

    fn outcome(msg: &str, effects: &[(ResourceKind, i64)]) -> Outcome {
        Outcome {
            message: msg.to_owned(),
            effects: map(effects),
        }
    }

    fn choice(id: &str, cost: &[(ResourceKind, i64)], rate: Decimal) -> Choice {
        Choice {
            id: id.to_owned(),
            label: id.to_owned(),
            cost: map(cost),
            success_rate: rate,
            success: outcome("won", &[(ResourceKind::Reputation, 5)]),
            failure: Some(outcome("lost", &[(ResourceKind::Trust, -5)])),
        }
    }

    fn event(id: &str, precondition: Precondition, choices: Vec<Choice>) -> Event {
        Event {
            id: id.to_owned(),
            title: id.to_owned(),
            description: String::new(),
            category: EventCategory::Crisis,
            rarity: Rarity::Common,
            precondition,
            choices,
        }
    }

    fn always_config() -> EventConfig {
        EventConfig {
            trigger_probability: Decimal::ONE,
            ..EventConfig::default()
        }
    }

    fn engine_with(events: Vec<Event>, config: EventConfig) -> EventEngine {
        EventEngine::new(config, EventCatalog::new(events).unwrap())
    }

    fn simple_engine() -> EventEngine {
        engine_with(
            vec![event(
                "outage",
                Precondition::Always,
                vec![
                    choice("sure_thing", &[(ResourceKind::Energy, 10)], Decimal::ONE),
                    choice("doomed", &[], Decimal::ZERO),
                    choice("pricey", &[(ResourceKind::Cash, 1_000_000)], Decimal::ONE),
                ],
            )],
            always_config(),
        )
    }

    #[test]
    fn zero_probability_never_triggers() {
        let mut engine = engine_with(
            vec![event("a", Precondition::Always, vec![choice("x", &[], Decimal::ONE)])],
            EventConfig {
                trigger_probability: Decimal::ZERO,
                ..EventConfig::default()
            },
        );
        let ledger = ResourceLedger::default();
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..500 {
            assert!(engine.tick(&ledger, &mut rng).is_none());
        }
    }

    #[test]
    fn tick_does_not_replace_active_event() {
        let mut engine = engine_with(
            vec![
                event("a", Precondition::Always, vec![choice("x", &[], Decimal::ONE)]),
                event("b", Precondition::Always, vec![choice("x", &[], Decimal::ONE)]),
            ],
            always_config(),
        );
        let ledger = ResourceLedger::default();
        let mut rng = SmallRng::seed_from_u64(11);
        let first = engine.tick(&ledger, &mut rng).map(|a| a.event.id.clone());
        assert!(first.is_some());
        for _ in 0..20 {
            assert!(engine.tick(&ledger, &mut rng).is_none());
        }
        assert_eq!(engine.active_event().map(|a| a.event.id.clone()), first);
    }

    #[test]
    fn failing_precondition_is_filtered_not_an_error() {
        let broke_only = Precondition::Below {
            resource: ResourceKind::Cash,
            amount: d(1_000),
        };
        let mut engine = engine_with(
            vec![event("broke", broke_only, vec![choice("x", &[], Decimal::ONE)])],
            always_config(),
        );
        let mut ledger = ResourceLedger::default();
        let mut rng = SmallRng::seed_from_u64(5);
        assert!(engine.tick(&ledger, &mut rng).is_none());

        ledger.set(ResourceKind::Cash, d(500), "burn");
        assert_eq!(engine.tick(&ledger, &mut rng).map(|a| a.event.id.as_str()), Some("broke"));
    }

    #[test]
    fn recently_resolved_events_are_excluded() {
        let mut engine = simple_engine();
        let mut ledger = ResourceLedger::default();
        let mut rng = SmallRng::seed_from_u64(9);

        assert!(engine.tick(&ledger, &mut rng).is_some());
        engine.resolve_choice("doomed", &mut ledger, &mut rng).unwrap();
        assert!(engine.eligible(&ledger.values()).is_empty());
        assert!(engine.tick(&ledger, &mut rng).is_none());
    }

    #[test]
    fn repeat_window_only_covers_recent_entries() {
        let events: Vec<Event> = ["a", "b", "c"]
            .iter()
            .map(|id| event(id, Precondition::Always, vec![choice("x", &[], Decimal::ONE)]))
            .collect();
        let mut engine = engine_with(
            events,
            EventConfig {
                repeat_window: 2,
                ..always_config()
            },
        );
        let mut ledger = ResourceLedger::default();
        let mut rng = SmallRng::seed_from_u64(1);
        for id in ["a", "b", "c"] {
            engine.force_trigger(id).unwrap();
            engine.resolve_choice("x", &mut ledger, &mut rng).unwrap();
        }
        let eligible: Vec<&str> = engine.eligible(&ledger.values()).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(eligible, vec!["a"]);
    }

    #[test]
    fn resolve_charges_cost_and_applies_success() {
        let mut engine = simple_engine();
        let mut ledger = ResourceLedger::default();
        let mut rng = SmallRng::seed_from_u64(21);
        engine.force_trigger("outage").unwrap();

        let resolution = engine.resolve_choice("sure_thing", &mut ledger, &mut rng).unwrap();
        let Resolution::Resolved(r) = resolution else {
            panic!("expected a resolved choice");
        };
        assert!(r.success);
        assert_eq!(r.outcome.message, "won");
        assert_eq!(ledger.value(ResourceKind::Energy), d(90));
        assert_eq!(ledger.value(ResourceKind::Reputation), d(15));
        assert!(engine.active_event().is_none());
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.history().back().map(|h| h.effects.clone()), Some(map(&[(ResourceKind::Reputation, 5)])));
    }

    #[test]
    fn zero_success_rate_applies_failure_outcome() {
        let mut engine = simple_engine();
        let mut ledger = ResourceLedger::default();
        let mut rng = SmallRng::seed_from_u64(22);
        engine.force_trigger("outage").unwrap();

        let Resolution::Resolved(r) = engine.resolve_choice("doomed", &mut ledger, &mut rng).unwrap() else {
            panic!("expected a resolved choice");
        };
        assert!(!r.success);
        assert_eq!(r.outcome.message, "lost");
        assert_eq!(ledger.value(ResourceKind::Trust), d(45));
    }

    #[test]
    fn unaffordable_choice_keeps_event_active() {
        let mut engine = simple_engine();
        let mut ledger = ResourceLedger::default();
        let mut rng = SmallRng::seed_from_u64(23);
        engine.force_trigger("outage").unwrap();
        let before = ledger.values();

        let resolution = engine.resolve_choice("pricey", &mut ledger, &mut rng).unwrap();
        let Resolution::Unaffordable { shortfalls } = resolution else {
            panic!("expected unaffordable");
        };
        assert_eq!(shortfalls.len(), 1);
        assert_eq!(shortfalls.first().map(|s| s.resource), Some(ResourceKind::Cash));
        assert_eq!(ledger.values(), before);
        assert!(engine.active_event().is_some());
        assert!(engine.history().is_empty());

        // A different choice still works afterwards.
        assert!(matches!(
            engine.resolve_choice("sure_thing", &mut ledger, &mut rng),
            Ok(Resolution::Resolved(_))
        ));
    }

    #[test]
    fn unknown_choice_is_an_error() {
        let mut engine = simple_engine();
        let mut ledger = ResourceLedger::default();
        let mut rng = SmallRng::seed_from_u64(24);
        engine.force_trigger("outage").unwrap();
        let err = engine.resolve_choice("teleport", &mut ledger, &mut rng);
        assert_eq!(
            err,
            Err(EventError::ChoiceNotFound {
                event_id: "outage".to_owned(),
                choice_id: "teleport".to_owned(),
            })
        );
        assert!(engine.active_event().is_some());
    }

    #[test]
    fn resolve_while_idle_is_an_error() {
        let mut engine = simple_engine();
        let mut ledger = ResourceLedger::default();
        let mut rng = SmallRng::seed_from_u64(25);
        assert_eq!(
            engine.resolve_choice("sure_thing", &mut ledger, &mut rng),
            Err(EventError::NoActiveEvent)
        );
    }

    #[test]
    fn force_trigger_rejects_unknown_and_busy() {
        let mut engine = simple_engine();
        assert!(matches!(engine.force_trigger("meteor"), Err(EventError::UnknownEvent(_))));
        engine.force_trigger("outage").unwrap();
        assert!(matches!(
            engine.force_trigger("outage"),
            Err(EventError::EventAlreadyActive { .. })
        ));
        assert!(engine.clear_active().is_some());
        assert!(engine.history().is_empty());
    }

    #[test]
    fn history_is_capped() {
        let mut engine = engine_with(
            vec![event("a", Precondition::Always, vec![choice("x", &[], Decimal::ONE)])],
            EventConfig {
                history_cap: 3,
                ..always_config()
            },
        );
        let mut ledger = ResourceLedger::default();
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..10 {
            engine.force_trigger("a").unwrap();
            engine.resolve_choice("x", &mut ledger, &mut rng).unwrap();
        }
        assert_eq!(engine.history().len(), 3);
    }

    #[test]
    fn snapshot_round_trip_restores_active_and_history() {
        let mut engine = simple_engine();
        let mut ledger = ResourceLedger::default();
        let mut rng = SmallRng::seed_from_u64(30);
        engine.force_trigger("outage").unwrap();
        engine.resolve_choice("sure_thing", &mut ledger, &mut rng).unwrap();
        engine.force_trigger("outage").unwrap();

        let json = serde_json::to_string(&engine.export()).unwrap();
        let snapshot: EventEngineSnapshot = serde_json::from_str(&json).unwrap();

        let mut restored = simple_engine();
        restored.import(snapshot).unwrap();
        assert_eq!(restored.active_event().map(|a| a.event.id.as_str()), Some("outage"));
        assert_eq!(restored.history(), engine.history());
    }

    #[test]
    fn malformed_snapshot_leaves_state_untouched() {
        let mut engine = simple_engine();
        engine.force_trigger("outage").unwrap();
        let before = engine.export();

        let mut bad = before.clone();
        bad.active_event_id = Some("meteor".to_owned());
        assert!(matches!(engine.import(bad), Err(EventError::MalformedImport { .. })));

        let mut wrong_version = before.clone();
        wrong_version.version = 7;
        assert!(engine.import(wrong_version).is_err());
        assert_eq!(engine.export(), before);
    }
}

//! Event templates and the validated catalog.
//!
//! Events are immutable templates. Everything about them is plain data,
//! including the trigger precondition, so a catalog can be authored in YAML
//! and checked once at load time instead of at use time.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use launchpad_types::{EventCategory, Rarity, ResourceKind, ResourceMap};

use crate::EventError;

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

/// A pure predicate over a snapshot of resource levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Precondition {
    /// Always eligible.
    #[default]
    Always,
    /// The resource is at or above `amount`.
    AtLeast {
        /// Resource to test.
        resource: ResourceKind,
        /// Inclusive lower bound.
        amount: Decimal,
    },
    /// The resource is strictly below `amount`.
    Below {
        /// Resource to test.
        resource: ResourceKind,
        /// Exclusive upper bound.
        amount: Decimal,
    },
    /// Every nested condition holds (vacuously true when empty).
    All {
        /// Nested conditions.
        conditions: Vec<Self>,
    },
    /// At least one nested condition holds (false when empty).
    Any {
        /// Nested conditions.
        conditions: Vec<Self>,
    },
}

impl Precondition {
    /// Evaluate against a snapshot. Missing resources read as zero.
    pub fn holds(&self, values: &ResourceMap) -> bool {
        let level = |r: &ResourceKind| values.get(r).copied().unwrap_or(Decimal::ZERO);
        match self {
            Self::Always => true,
            Self::AtLeast { resource, amount } => level(resource) >= *amount,
            Self::Below { resource, amount } => level(resource) < *amount,
            Self::All { conditions } => conditions.iter().all(|c| c.holds(values)),
            Self::Any { conditions } => conditions.iter().any(|c| c.holds(values)),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes and choices
// ---------------------------------------------------------------------------

/// Text and signed resource deltas produced by a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Narrative shown to the player.
    pub message: String,
    /// Signed deltas applied to the ledger.
    #[serde(default)]
    pub effects: ResourceMap,
}

/// One mutually exclusive response to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Identifier, unique within its event.
    pub id: String,
    /// Button text.
    pub label: String,
    /// Up-front cost; every entry must be affordable at once.
    #[serde(default)]
    pub cost: ResourceMap,
    /// Probability of the success outcome, in `[0, 1]`.
    pub success_rate: Decimal,
    /// Outcome on success.
    pub success: Outcome,
    /// Outcome on failure; the success outcome is reused when absent.
    #[serde(default)]
    pub failure: Option<Outcome>,
}

impl Choice {
    /// The outcome for a roll. Failure falls back to the success outcome
    /// when the choice has none of its own.
    pub fn outcome(&self, success: bool) -> &Outcome {
        if success {
            &self.success
        } else {
            self.failure.as_ref().unwrap_or(&self.success)
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// An event template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier.
    pub id: String,
    /// Headline.
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub description: String,
    /// Opportunity, crisis, or milestone.
    pub category: EventCategory,
    /// Selection weight class.
    pub rarity: Rarity,
    /// Must hold for the event to be eligible.
    #[serde(default)]
    pub precondition: Precondition,
    /// Ordered responses; at least one.
    pub choices: Vec<Choice>,
}

impl Event {
    /// Find a choice by id.
    pub fn choice(&self, choice_id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }

    /// Check the template's internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidEvent`] if the id is blank, there are no
    /// choices, choice ids repeat, a success rate lies outside `[0, 1]`, or
    /// a cost is negative.
    pub fn validate(&self) -> Result<(), EventError> {
        let invalid = |reason: String| {
            Err(EventError::InvalidEvent {
                event_id: self.id.clone(),
                reason,
            })
        };

        if self.id.trim().is_empty() {
            return invalid("event id is blank".to_owned());
        }
        if self.choices.is_empty() {
            return invalid("event has no choices".to_owned());
        }

        let mut seen = BTreeSet::new();
        for choice in &self.choices {
            if !seen.insert(choice.id.as_str()) {
                return invalid(format!("duplicate choice id {}", choice.id));
            }
            if choice.success_rate < Decimal::ZERO || choice.success_rate > Decimal::ONE {
                return invalid(format!(
                    "choice {} success rate {} outside [0, 1]",
                    choice.id, choice.success_rate
                ));
            }
            if let Some((resource, amount)) = choice.cost.iter().find(|(_, a)| a.is_sign_negative() && !a.is_zero()) {
                return invalid(format!(
                    "choice {} has negative {resource} cost {amount}",
                    choice.id
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A validated, ordered set of event templates with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCatalog {
    events: Vec<Event>,
}

impl EventCatalog {
    /// Validate and wrap a list of events.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::DuplicateEvent`] on a repeated id, or the first
    /// [`EventError::InvalidEvent`] from [`Event::validate`].
    pub fn new(events: Vec<Event>) -> Result<Self, EventError> {
        let mut ids = BTreeSet::new();
        for event in &events {
            event.validate()?;
            if !ids.insert(event.id.as_str()) {
                return Err(EventError::DuplicateEvent(event.id.clone()));
            }
        }
        Ok(Self { events })
    }

    /// The stock startup catalog.
    ///
    /// # Errors
    ///
    /// Propagates validation errors; the stock catalog passes validation.
    pub fn builtin() -> Result<Self, EventError> {
        Self::new(crate::builtin::builtin_events())
    }

    /// Look up an event by id.
    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Whether the catalog contains an id.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Iterate templates in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn outcome(msg: &str) -> Outcome {
        Outcome {
            message: msg.to_owned(),
            effects: ResourceMap::new(),
        }
    }

    fn choice(id: &str, rate: Decimal) -> Choice {
        Choice {
            id: id.to_owned(),
            label: id.to_owned(),
            cost: ResourceMap::new(),
            success_rate: rate,
            success: outcome("yay"),
            failure: None,
        }
    }

    fn event(id: &str, choices: Vec<Choice>) -> Event {
        Event {
            id: id.to_owned(),
            title: id.to_owned(),
            description: String::new(),
            category: EventCategory::Opportunity,
            rarity: Rarity::Common,
            precondition: Precondition::Always,
            choices,
        }
    }

    #[test]
    fn failure_defaults_to_success_outcome() {
        let c = choice("go", Decimal::ONE);
        assert_eq!(c.outcome(false).message, "yay");
        assert_eq!(c.outcome(true).message, "yay");
    }

    #[test]
    fn preconditions_compose() {
        let values: ResourceMap = [(ResourceKind::Cash, d(500)), (ResourceKind::Trust, d(10))]
            .into_iter()
            .collect();
        let broke_and_distrusted = Precondition::All {
            conditions: vec![
                Precondition::Below {
                    resource: ResourceKind::Cash,
                    amount: d(1_000),
                },
                Precondition::Below {
                    resource: ResourceKind::Trust,
                    amount: d(20),
                },
            ],
        };
        assert!(broke_and_distrusted.holds(&values));

        let rich_or_famous = Precondition::Any {
            conditions: vec![
                Precondition::AtLeast {
                    resource: ResourceKind::Cash,
                    amount: d(100_000),
                },
                Precondition::AtLeast {
                    resource: ResourceKind::Reputation,
                    amount: d(50),
                },
            ],
        };
        assert!(!rich_or_famous.holds(&values));
        assert!(!Precondition::Any { conditions: vec![] }.holds(&values));
    }

    #[test]
    fn success_rate_out_of_range_is_rejected() {
        let e = event("bad", vec![choice("go", Decimal::new(15, 1))]);
        assert!(matches!(e.validate(), Err(EventError::InvalidEvent { .. })));
    }

    #[test]
    fn event_without_choices_is_rejected() {
        assert!(event("empty", vec![]).validate().is_err());
    }

    #[test]
    fn duplicate_choice_ids_are_rejected() {
        let e = event("dup", vec![choice("a", Decimal::ONE), choice("a", Decimal::ONE)]);
        assert!(e.validate().is_err());
    }

    #[test]
    fn negative_cost_is_rejected() {
        let mut c = choice("a", Decimal::ONE);
        c.cost.insert(ResourceKind::Cash, d(-10));
        assert!(event("neg", vec![c]).validate().is_err());
    }

    #[test]
    fn duplicate_event_ids_are_rejected() {
        let catalog = EventCatalog::new(vec![
            event("x", vec![choice("a", Decimal::ONE)]),
            event("x", vec![choice("b", Decimal::ONE)]),
        ]);
        assert_eq!(catalog, Err(EventError::DuplicateEvent("x".to_owned())));
    }

    #[test]
    fn catalog_parses_from_json_with_defaults() {
        let json = r#"[{
            "id": "coffee",
            "title": "Free coffee",
            "category": "opportunity",
            "rarity": "common",
            "choices": [{
                "id": "drink",
                "label": "Drink it",
                "success_rate": "1",
                "success": {"message": "Buzzing", "effects": {"energy": "5"}}
            }]
        }]"#;
        let events: Result<Vec<Event>, _> = serde_json::from_str(json);
        assert!(events.is_ok());
        let catalog = events.map_err(|e| e.to_string()).and_then(|v| EventCatalog::new(v).map_err(|e| e.to_string()));
        assert!(catalog.is_ok());
        if let Ok(c) = catalog {
            let e = c.get("coffee");
            assert_eq!(e.map(|e| &e.precondition), Some(&Precondition::Always));
            assert_eq!(
                e.and_then(|e| e.choice("drink")).and_then(|c| c.success.effects.get(&ResourceKind::Energy)),
                Some(&d(5))
            );
        }
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = EventCatalog::builtin();
        assert!(catalog.is_ok());
        assert!(catalog.is_ok_and(|c| c.len() >= 8));
    }
}

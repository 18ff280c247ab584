//! The stock startup event catalog.
//!
//! Covers every category and rarity so a fresh game has something to
//! surface from turn one. Games that ship their own content load a YAML
//! catalog instead (see `launchpad-core`).

use rust_decimal::Decimal;

use launchpad_types::{EventCategory, Rarity, ResourceKind, ResourceMap};

use crate::catalog::{Choice, Event, Outcome, Precondition};

fn map(pairs: &[(ResourceKind, i64)]) -> ResourceMap {
    pairs.iter().map(|&(k, v)| (k, Decimal::from(v))).collect()
}

fn outcome(message: &str, effects: &[(ResourceKind, i64)]) -> Outcome {
    Outcome {
        message: message.to_owned(),
        effects: map(effects),
    }
}

/// Success rate expressed in percent.
fn pct(p: i64) -> Decimal {
    Decimal::new(p, 2)
}

struct ChoiceSpec<'a> {
    id: &'a str,
    label: &'a str,
    cost: &'a [(ResourceKind, i64)],
    rate: i64,
    success: Outcome,
    failure: Option<Outcome>,
}

impl ChoiceSpec<'_> {
    fn build(self) -> Choice {
        Choice {
            id: self.id.to_owned(),
            label: self.label.to_owned(),
            cost: map(self.cost),
            success_rate: pct(self.rate),
            success: self.success,
            failure: self.failure,
        }
    }
}

fn event(
    id: &str,
    title: &str,
    description: &str,
    category: EventCategory,
    rarity: Rarity,
    precondition: Precondition,
    choices: Vec<ChoiceSpec<'_>>,
) -> Event {
    Event {
        id: id.to_owned(),
        title: title.to_owned(),
        description: description.to_owned(),
        category,
        rarity,
        precondition,
        choices: choices.into_iter().map(ChoiceSpec::build).collect(),
    }
}

/// Build the stock event list.
#[allow(clippy::too_many_lines)]
pub fn builtin_events() -> Vec<Event> {
    use EventCategory::{Crisis, Milestone, Opportunity};
    use ResourceKind::{Cash, Energy, Reputation, Time, Trust};

    vec![
        event(
            "viral_tweet",
            "Your launch tweet is going viral",
            "A well-known founder quote-tweeted your demo video.",
            Opportunity,
            Rarity::Common,
            Precondition::Always,
            vec![
                ChoiceSpec {
                    id: "ride_the_wave",
                    label: "Reply to everyone for the next six hours",
                    cost: &[(Time, 6), (Energy, 10)],
                    rate: 70,
                    success: outcome("Sign-ups spike and the press notices.", &[(Reputation, 8), (Trust, 3)]),
                    failure: Some(outcome("The thread fizzles after an hour.", &[(Reputation, 2)])),
                },
                ChoiceSpec {
                    id: "stay_focused",
                    label: "Ignore it and keep shipping",
                    cost: &[],
                    rate: 100,
                    success: outcome("You ship the feature on schedule.", &[(Trust, 1)]),
                    failure: None,
                },
            ],
        ),
        event(
            "partnership_offer",
            "A larger company wants to partner",
            "Their BD lead proposes a co-marketing deal.",
            Opportunity,
            Rarity::Uncommon,
            Precondition::AtLeast { resource: Reputation, amount: Decimal::from(15) },
            vec![
                ChoiceSpec {
                    id: "negotiate",
                    label: "Negotiate hard for better terms",
                    cost: &[(Time, 10), (Energy, 15)],
                    rate: 55,
                    success: outcome("You land a revenue share.", &[(Cash, 15_000), (Reputation, 6)]),
                    failure: Some(outcome("They walk away, unimpressed.", &[(Trust, -5)])),
                },
                ChoiceSpec {
                    id: "accept",
                    label: "Accept the standard terms",
                    cost: &[(Time, 4)],
                    rate: 90,
                    success: outcome("The logo swap goes live.", &[(Cash, 5_000), (Reputation, 3)]),
                    failure: Some(outcome("Legal review drags on forever.", &[(Energy, -5)])),
                },
            ],
        ),
        event(
            "angel_investor",
            "An angel investor wants a meeting",
            "She invested early in two unicorns and likes your traction.",
            Opportunity,
            Rarity::Rare,
            Precondition::AtLeast { resource: Trust, amount: Decimal::from(30) },
            vec![
                ChoiceSpec {
                    id: "pitch",
                    label: "Pitch the full vision",
                    cost: &[(Time, 8), (Energy, 20)],
                    rate: 45,
                    success: outcome("She writes a check on the spot.", &[(Cash, 100_000), (Trust, 10)]),
                    failure: Some(outcome("She passes, but keeps in touch.", &[(Reputation, 2)])),
                },
                ChoiceSpec {
                    id: "ask_for_advice",
                    label: "Ask for advice instead of money",
                    cost: &[(Time, 2)],
                    rate: 100,
                    success: outcome("Her feedback reshapes your roadmap.", &[(Trust, 4)]),
                    failure: None,
                },
            ],
        ),
        event(
            "server_outage",
            "Production is down",
            "The database ran out of connections during peak traffic.",
            Crisis,
            Rarity::Common,
            Precondition::Always,
            vec![
                ChoiceSpec {
                    id: "all_hands",
                    label: "All hands on deck",
                    cost: &[(Energy, 25), (Time, 6)],
                    rate: 85,
                    success: outcome("Back up in forty minutes with a public postmortem.", &[(Trust, 5)]),
                    failure: Some(outcome("The fix takes all night.", &[(Trust, -8), (Energy, -10)])),
                },
                ChoiceSpec {
                    id: "hire_consultant",
                    label: "Call an expensive consultant",
                    cost: &[(Cash, 8_000)],
                    rate: 95,
                    success: outcome("The consultant finds the leak in an hour.", &[(Trust, 2)]),
                    failure: Some(outcome("The consultant bills you and shrugs.", &[(Trust, -4)])),
                },
            ],
        ),
        event(
            "key_hire_quits",
            "Your lead engineer is leaving",
            "A competitor offered double the salary.",
            Crisis,
            Rarity::Uncommon,
            Precondition::Always,
            vec![
                ChoiceSpec {
                    id: "counter_offer",
                    label: "Match the offer",
                    cost: &[(Cash, 20_000)],
                    rate: 75,
                    success: outcome("They stay, and the team notices you care.", &[(Trust, 6)]),
                    failure: Some(outcome("They leave anyway.", &[(Trust, -6), (Energy, -10)])),
                },
                ChoiceSpec {
                    id: "let_go",
                    label: "Wish them well and backfill",
                    cost: &[(Time, 12)],
                    rate: 60,
                    success: outcome("A great replacement joins within weeks.", &[(Energy, 5)]),
                    failure: Some(outcome("Velocity tanks for a month.", &[(Energy, -20), (Trust, -3)])),
                },
            ],
        ),
        event(
            "cash_crunch",
            "Payroll is due and the bank balance is thin",
            "Runway is measured in days, not months.",
            Crisis,
            Rarity::Rare,
            Precondition::Below { resource: Cash, amount: Decimal::from(15_000) },
            vec![
                ChoiceSpec {
                    id: "bridge_loan",
                    label: "Take a bridge loan from existing investors",
                    cost: &[(Trust, 10)],
                    rate: 80,
                    success: outcome("The bridge closes in time.", &[(Cash, 40_000)]),
                    failure: Some(outcome("Investors balk.", &[(Trust, -10)])),
                },
                ChoiceSpec {
                    id: "founders_skip_salary",
                    label: "Founders skip their salaries",
                    cost: &[(Energy, 15)],
                    rate: 100,
                    success: outcome("You buy another month.", &[(Cash, 10_000), (Trust, 3)]),
                    failure: None,
                },
            ],
        ),
        event(
            "first_hundred_users",
            "One hundred active users",
            "The dashboard ticked over while you were making coffee.",
            Milestone,
            Rarity::Uncommon,
            Precondition::AtLeast { resource: Reputation, amount: Decimal::from(12) },
            vec![
                ChoiceSpec {
                    id: "celebrate",
                    label: "Take the team out",
                    cost: &[(Cash, 500), (Time, 3)],
                    rate: 100,
                    success: outcome("Morale soars.", &[(Energy, 20), (Trust, 4)]),
                    failure: None,
                },
                ChoiceSpec {
                    id: "interview_users",
                    label: "Call ten of them for feedback",
                    cost: &[(Time, 5)],
                    rate: 90,
                    success: outcome("You find your killer feature.", &[(Reputation, 5)]),
                    failure: Some(outcome("Nobody picks up.", &[])),
                },
            ],
        ),
        event(
            "product_hunt_launch",
            "Product of the Day",
            "You are trending on every launch board at once.",
            Milestone,
            Rarity::Epic,
            Precondition::All {
                conditions: vec![
                    Precondition::AtLeast { resource: Reputation, amount: Decimal::from(20) },
                    Precondition::AtLeast { resource: Energy, amount: Decimal::from(30) },
                ],
            },
            vec![
                ChoiceSpec {
                    id: "go_all_in",
                    label: "Cancel everything and work the launch",
                    cost: &[(Time, 16), (Energy, 30)],
                    rate: 65,
                    success: outcome("Number one of the day.", &[(Reputation, 25), (Cash, 25_000), (Trust, 8)]),
                    failure: Some(outcome("Top ten, not bad at all.", &[(Reputation, 10)])),
                },
                ChoiceSpec {
                    id: "let_it_run",
                    label: "Let it run on its own",
                    cost: &[],
                    rate: 100,
                    success: outcome("A respectable showing.", &[(Reputation, 6)]),
                    failure: None,
                },
            ],
        ),
    ]
}

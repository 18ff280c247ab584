//! Stock startup synergies and hidden combos.

use rust_decimal::Decimal;

use launchpad_types::{ResourceKind, ResourceMap};

use crate::definition::Synergy;

fn def(id: &str, name: &str, icon: &str, skills: &[&str], multiplier: Decimal, bonus: &[(ResourceKind, i64)]) -> Synergy {
    Synergy {
        id: id.to_owned(),
        name: name.to_owned(),
        icon: icon.to_owned(),
        skills: skills.iter().map(|s| (*s).to_owned()).collect(),
        multiplier,
        bonus: bonus
            .iter()
            .map(|&(k, v)| (k, Decimal::from(v)))
            .collect::<ResourceMap>(),
    }
}

/// Regular synergies, active whenever two or more of their skills are in
/// the window.
pub fn builtin_synergies() -> Vec<Synergy> {
    vec![
        def(
            "growth_hacking",
            "Growth Hacking",
            "rocket",
            &["content_marketing", "seo", "analytics"],
            Decimal::new(15, 1),
            &[(ResourceKind::Reputation, 5)],
        ),
        def(
            "lean_startup",
            "Lean Startup",
            "flask",
            &["customer_interviews", "mvp", "analytics"],
            Decimal::new(13, 1),
            &[(ResourceKind::Time, 5)],
        ),
        def(
            "fundraising_machine",
            "Fundraising Machine",
            "briefcase",
            &["pitching", "networking", "financial_modeling"],
            Decimal::new(14, 1),
            &[(ResourceKind::Trust, 5)],
        ),
    ]
}

/// Hidden combos, revealed once when every skill appears together.
pub fn builtin_hidden_combos() -> Vec<Synergy> {
    vec![
        def(
            "unicorn_formula",
            "Unicorn Formula",
            "unicorn",
            &["mvp", "content_marketing", "pitching", "analytics"],
            Decimal::TWO,
            &[(ResourceKind::Cash, 25_000), (ResourceKind::Reputation, 10)],
        ),
        def(
            "pivot_master",
            "Pivot Master",
            "compass",
            &["customer_interviews", "pivot", "mvp"],
            Decimal::new(175, 2),
            &[(ResourceKind::Energy, 20)],
        ),
    ]
}

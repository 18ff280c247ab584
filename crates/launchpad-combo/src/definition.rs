//! Synergy and hidden-combo definitions.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use launchpad_types::ResourceMap;

use crate::ComboError;

/// How a definition is matched against the skill window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComboKind {
    /// Active whenever at least two of its skills are in the window.
    Synergy,
    /// Revealed once, the first time all of its skills are in the window.
    Hidden,
}

/// A set of skills that reward being used together.
///
/// Hidden combos share this shape; the [`ComboBook`] keeps them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synergy {
    /// Unique identifier across synergies and hidden combos.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display icon.
    #[serde(default)]
    pub icon: String,
    /// Required skill names; at least two.
    pub skills: BTreeSet<String>,
    /// Growth multiplier while active; greater than one.
    pub multiplier: Decimal,
    /// Flat resource bonus granted while active.
    #[serde(default)]
    pub bonus: ResourceMap,
}

impl Synergy {
    /// Check the definition.
    ///
    /// # Errors
    ///
    /// Returns [`ComboError::InvalidSynergy`] for a blank id, fewer than two
    /// skills, or a multiplier not greater than one.
    pub fn validate(&self) -> Result<(), ComboError> {
        let invalid = |reason: &str| {
            Err(ComboError::InvalidSynergy {
                id: self.id.clone(),
                reason: reason.to_owned(),
            })
        };
        if self.id.trim().is_empty() {
            return invalid("id is blank");
        }
        if self.skills.len() < 2 {
            return invalid("needs at least two skills");
        }
        if self.multiplier <= Decimal::ONE {
            return invalid("multiplier must be greater than 1");
        }
        Ok(())
    }

    /// How many of the required skills appear in `present`.
    pub fn match_count(&self, present: &BTreeSet<&str>) -> usize {
        self.skills.iter().filter(|s| present.contains(s.as_str())).count()
    }
}

/// Validated synergies and hidden combos with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComboBook {
    synergies: Vec<Synergy>,
    hidden: Vec<Synergy>,
}

impl ComboBook {
    /// Validate and wrap the two lists.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, or
    /// [`ComboError::DuplicateSynergy`] when an id repeats in either list.
    pub fn new(synergies: Vec<Synergy>, hidden: Vec<Synergy>) -> Result<Self, ComboError> {
        let mut ids = BTreeSet::new();
        for def in synergies.iter().chain(&hidden) {
            def.validate()?;
            if !ids.insert(def.id.as_str()) {
                return Err(ComboError::DuplicateSynergy(def.id.clone()));
            }
        }
        Ok(Self { synergies, hidden })
    }

    /// The stock startup definitions.
    ///
    /// # Errors
    ///
    /// Propagates validation errors; the stock set passes validation.
    pub fn builtin() -> Result<Self, ComboError> {
        Self::new(crate::builtin::builtin_synergies(), crate::builtin::builtin_hidden_combos())
    }

    /// Regular synergies, in registration order.
    pub fn synergies(&self) -> &[Synergy] {
        &self.synergies
    }

    /// Hidden combos, in registration order.
    pub fn hidden(&self) -> &[Synergy] {
        &self.hidden
    }

    /// Find any definition by id.
    ///
    /// # Errors
    ///
    /// Returns [`ComboError::UnknownSynergy`] if neither list has the id.
    pub fn get(&self, id: &str) -> Result<(&Synergy, ComboKind), ComboError> {
        if let Some(s) = self.synergies.iter().find(|s| s.id == id) {
            return Ok((s, ComboKind::Synergy));
        }
        self.hidden
            .iter()
            .find(|s| s.id == id)
            .map(|s| (s, ComboKind::Hidden))
            .ok_or_else(|| ComboError::UnknownSynergy(id.to_owned()))
    }

    /// Whether `id` names a hidden combo.
    pub fn is_hidden(&self, id: &str) -> bool {
        self.hidden.iter().any(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synergy(id: &str, skills: &[&str], multiplier: Decimal) -> Synergy {
        Synergy {
            id: id.to_owned(),
            name: id.to_owned(),
            icon: String::new(),
            skills: skills.iter().map(|s| (*s).to_owned()).collect(),
            multiplier,
            bonus: ResourceMap::new(),
        }
    }

    #[test]
    fn single_skill_is_rejected() {
        let s = synergy("solo", &["a"], Decimal::TWO);
        assert!(matches!(s.validate(), Err(ComboError::InvalidSynergy { .. })));
    }

    #[test]
    fn multiplier_of_one_is_rejected() {
        assert!(synergy("flat", &["a", "b"], Decimal::ONE).validate().is_err());
    }

    #[test]
    fn ids_are_unique_across_kinds() {
        let book = ComboBook::new(
            vec![synergy("x", &["a", "b"], Decimal::TWO)],
            vec![synergy("x", &["c", "d"], Decimal::TWO)],
        );
        assert_eq!(book, Err(ComboError::DuplicateSynergy("x".to_owned())));
    }

    #[test]
    fn lookup_reports_kind_and_unknown() {
        let book = ComboBook::new(
            vec![synergy("s", &["a", "b"], Decimal::TWO)],
            vec![synergy("h", &["c", "d"], Decimal::TWO)],
        );
        assert!(book.is_ok());
        if let Ok(book) = book {
            assert!(matches!(book.get("s"), Ok((_, ComboKind::Synergy))));
            assert!(matches!(book.get("h"), Ok((_, ComboKind::Hidden))));
            assert_eq!(book.get("nope").err(), Some(ComboError::UnknownSynergy("nope".to_owned())));
        }
    }

    #[test]
    fn match_count_counts_distinct_required_skills() {
        let s = synergy("s", &["a", "b", "c"], Decimal::TWO);
        let present: BTreeSet<&str> = ["a", "c", "z"].into_iter().collect();
        assert_eq!(s.match_count(&present), 2);
    }

    #[test]
    fn builtin_book_is_valid() {
        let book = ComboBook::builtin();
        assert!(book.as_ref().is_ok_and(|b| b.synergies().len() == 3 && b.hidden().len() == 2));
    }
}

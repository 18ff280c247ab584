//! Numeric variants of challenge text.
//!
//! A challenge template is prose with numbers in it ("Burn is $42,000 a
//! month and you have $1,260,000 in the bank..."). A variant scales every
//! standalone number by its own random factor drawn from `1 +/- spread`,
//! keeping the number's decimal places and thousands separators and every
//! other character of the text. Answers must be recomputed by the caller.
//!
//! Digits glued to letters (`Q3`, `B2B`) are left alone.

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One number that was rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericChange {
    /// The literal as it appeared.
    pub original_text: String,
    /// Its value.
    pub original: Decimal,
    /// The literal as rewritten.
    pub perturbed_text: String,
    /// The new value.
    pub perturbed: Decimal,
}

/// A perturbed copy of a challenge template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeVariant {
    /// Rewritten text.
    pub text: String,
    /// Every rewritten number, in order of appearance.
    pub changes: Vec<NumericChange>,
    /// Perturbation level used.
    pub variant_level: u32,
    /// Always `true`: expected answers depend on the new numbers.
    pub needs_recalculation: bool,
}

/// Maximum relative change for a level, in per-mille.
const fn spread_per_mille(level: u32) -> i64 {
    match level {
        0 | 1 => 100,
        2 => 250,
        _ => 400,
    }
}

/// Scan a number starting at `start`; return its end offset.
///
/// Grammar: `digits (',' ddd)* ('.' digits)?`, where a separator group must
/// be exactly three digits.
fn number_end(bytes: &[u8], start: usize) -> usize {
    let digit = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);
    let mut end = start;
    while digit(end) {
        end += 1;
    }
    while bytes.get(end) == Some(&b',') && digit(end + 1) && digit(end + 2) && digit(end + 3) && !digit(end + 4) {
        end += 4;
    }
    if bytes.get(end) == Some(&b'.') && digit(end + 1) {
        end += 1;
        while digit(end) {
            end += 1;
        }
    }
    end
}

fn group_thousands(int_part: &str) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn format_like(value: Decimal, decimal_places: u32, grouped: bool) -> String {
    let mut v = value.round_dp(decimal_places);
    v.rescale(decimal_places);
    let plain = v.to_string();
    if !grouped {
        return plain;
    }
    match plain.split_once('.') {
        Some((int_part, frac)) => format!("{}.{frac}", group_thousands(int_part)),
        None => group_thousands(&plain),
    }
}

fn perturb(literal: &str, spread: i64, rng: &mut impl Rng) -> Option<NumericChange> {
    let grouped = literal.contains(',');
    let plain: String = literal.chars().filter(|c| *c != ',').collect();
    let original: Decimal = plain.parse().ok()?;
    let decimal_places = plain.split_once('.').map_or(0, |(_, f)| u32::try_from(f.len()).unwrap_or(0));

    let offset: i64 = rng.random_range(-spread..=spread);
    let factor = Decimal::ONE.saturating_add(Decimal::new(offset, 3));
    let perturbed = original.saturating_mul(factor).round_dp(decimal_places);
    let perturbed_text = format_like(perturbed, decimal_places, grouped);

    Some(NumericChange {
        original_text: literal.to_owned(),
        original,
        perturbed_text,
        perturbed,
    })
}

/// Rewrite every standalone number in `template`.
///
/// Level 1 (and 0) perturbs by up to 10%, level 2 by up to 25%, level 3
/// and above by up to 40%.
pub fn generate_variant(template: &str, variant_level: u32, rng: &mut impl Rng) -> ChallengeVariant {
    let spread = spread_per_mille(variant_level);
    let bytes = template.as_bytes();
    let mut text = String::with_capacity(template.len());
    let mut changes = Vec::new();

    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        let starts_number = bytes.get(i).is_some_and(u8::is_ascii_digit)
            && !i
                .checked_sub(1)
                .and_then(|p| bytes.get(p))
                .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'.' || *b == b'_');
        if !starts_number {
            i += 1;
            continue;
        }

        let end = number_end(bytes, i);
        let glued = bytes.get(end).is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_');
        let literal = template.get(i..end).unwrap_or_default();
        if !glued
            && let Some(change) = perturb(literal, spread, rng)
        {
            text.push_str(template.get(copied..i).unwrap_or_default());
            text.push_str(&change.perturbed_text);
            changes.push(change);
            copied = end;
        }
        i = end;
    }
    text.push_str(template.get(copied..).unwrap_or_default());

    ChallengeVariant {
        text,
        changes,
        variant_level,
        needs_recalculation: true,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn scanner_handles_separators_and_decimals() {
        let s = b"1,234,567.89 rest";
        assert_eq!(number_end(s, 0), 12);
        assert_eq!(number_end(b"12,34", 0), 2);
        assert_eq!(number_end(b"500.", 0), 3);
    }

    #[test]
    fn grouping() {
        assert_eq!(group_thousands("1234567"), "1,234,567");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(format_like(Decimal::new(123_456, 2), 2, true), "1,234.56");
        assert_eq!(format_like(Decimal::from(42), 1, false), "42.0");
    }

    #[test]
    fn structure_is_preserved() {
        let template = "Burn is $42,000 a month, churn is 3.5% and you have 18 months in Q3.";
        let mut rng = SmallRng::seed_from_u64(99);
        let v = generate_variant(template, 2, &mut rng);

        assert!(v.needs_recalculation);
        assert_eq!(v.changes.len(), 3);
        assert!(v.text.starts_with("Burn is $"));
        assert!(v.text.ends_with(" months in Q3."));
        assert!(v.text.contains("% and you have "));

        let originals: Vec<&str> = v.changes.iter().map(|c| c.original_text.as_str()).collect();
        assert_eq!(originals, vec!["42,000", "3.5", "18"]);

        let burn = v.changes.first().map(|c| c.perturbed_text.clone()).unwrap_or_default();
        assert!(burn.contains(','));
        let churn = v.changes.get(1).map(|c| c.perturbed_text.clone()).unwrap_or_default();
        assert_eq!(churn.split_once('.').map(|(_, f)| f.len()), Some(1));
    }

    #[test]
    fn perturbation_stays_within_spread() {
        let mut rng = SmallRng::seed_from_u64(5);
        for level in 1..=4 {
            let bound = Decimal::new(spread_per_mille(level), 3);
            for _ in 0..200 {
                let v = generate_variant("Revenue was 10000 dollars", level, &mut rng);
                let change = v.changes.first().map(|c| c.perturbed).unwrap_or_default();
                let ratio = change / Decimal::from(10_000);
                assert!((ratio - Decimal::ONE).abs() <= bound, "level {level}: {ratio}");
            }
        }
    }

    #[test]
    fn text_without_numbers_is_unchanged() {
        let mut rng = SmallRng::seed_from_u64(1);
        let v = generate_variant("Pick the better pricing model.", 3, &mut rng);
        assert_eq!(v.text, "Pick the better pricing model.");
        assert!(v.changes.is_empty());
    }
}

//! Pure weighted-mean aggregation.
//!
//! # Invariants
//! - Contributions without a score are excluded, not counted as zero.
//! - A zero total weight yields `None` ("no score"), never `0`.
//! - Results are independent of input order and bit-identical across runs.
//! - Exact means are carried between levels; rounding happens only in
//!   [`round_for_display`].

use rust_decimal::{Decimal, RoundingStrategy};

/// Fractional digits kept for displayed scores.
pub const DISPLAY_SCALE: u32 = 2;

/// One weighted input of a rollup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution {
    /// `None` when there is no published score (or the lower level is
    /// undefined).
    pub score: Option<Decimal>,
    pub weight: u32,
}

impl Contribution {
    pub fn new(score: Option<Decimal>, weight: u32) -> Self {
        Self { score, weight }
    }

    pub fn scored(score: Decimal, weight: u32) -> Self {
        Self::new(Some(score), weight)
    }
}

/// Computes `Σ(score × weight) / Σ(weight)` over scored contributions.
///
/// Returns `None` when no contribution carries a score or every scored
/// contribution has weight 0.
pub fn weighted_mean<I>(contributions: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Contribution>,
{
    let mut included: Vec<(Decimal, u32)> = contributions
        .into_iter()
        .filter_map(|item| item.score.map(|score| (score, item.weight)))
        .collect();

    // Decimal addition may round at 28 significant digits; summing in a
    // canonical order keeps the result independent of input order.
    included.sort_unstable();

    let (weighted_sum, total_weight) = included.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(weighted_sum, total_weight), (score, weight)| {
            let weight = Decimal::from(*weight);
            (weighted_sum + *score * weight, total_weight + weight)
        },
    );

    if total_weight.is_zero() {
        return None;
    }

    Some(weighted_sum / total_weight)
}

/// Rolls field contributions up to a category score.
pub fn category_score<I>(fields: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Contribution>,
{
    weighted_mean(fields)
}

/// Rolls category contributions up to an overall project score.
///
/// Categories whose score is undefined are skipped exactly like fields
/// without a published result.
pub fn overall_score<I>(categories: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Contribution>,
{
    weighted_mean(categories)
}

/// Rounds a score half-up to [`DISPLAY_SCALE`] digits for display.
pub fn round_for_display(score: Decimal) -> Decimal {
    let mut rounded =
        score.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(DISPLAY_SCALE);
    rounded
}

#[cfg(test)]
mod tests {
    use super::{category_score, overall_score, round_for_display, weighted_mean, Contribution};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn two_fields_weighted_mean_is_exact() {
        let score = category_score([
            Contribution::scored(dec("4.50"), 2),
            Contribution::scored(dec("3.00"), 1),
        ])
        .unwrap();
        assert_eq!(score, dec("4"));
        assert_eq!(round_for_display(score).to_string(), "4.00");
    }

    #[test]
    fn empty_input_is_undefined_not_zero() {
        assert_eq!(category_score(Vec::new()), None);
    }

    #[test]
    fn all_zero_weights_are_undefined() {
        let score = category_score([
            Contribution::scored(dec("4.00"), 0),
            Contribution::scored(dec("2.00"), 0),
        ]);
        assert_eq!(score, None);
    }

    #[test]
    fn unscored_contributions_are_excluded_not_zeroed() {
        let score = category_score([
            Contribution::scored(dec("4.00"), 1),
            Contribution::new(None, 5),
        ]);
        assert_eq!(score, Some(dec("4")));

        assert_eq!(category_score([Contribution::new(None, 3)]), None);
    }

    #[test]
    fn included_zero_weight_is_neutral() {
        let with_zero = category_score([
            Contribution::scored(dec("3.00"), 2),
            Contribution::scored(dec("5.00"), 0),
        ]);
        assert_eq!(with_zero, Some(dec("3")));
    }

    #[test]
    fn result_does_not_depend_on_input_order() {
        let items = vec![
            Contribution::scored(dec("1.37"), 3),
            Contribution::scored(dec("4.91"), 7),
            Contribution::scored(dec("2.05"), 11),
            Contribution::new(None, 2),
            Contribution::scored(dec("3.33"), 1),
        ];
        let forward = weighted_mean(items.clone());
        let mut reversed = items.clone();
        reversed.reverse();
        let mut rotated = items;
        rotated.rotate_left(2);

        assert_eq!(forward, weighted_mean(reversed));
        assert_eq!(forward, weighted_mean(rotated));
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let items = [
            Contribution::scored(dec("4.10"), 1),
            Contribution::scored(dec("2.20"), 2),
        ];
        let first = overall_score(items).unwrap();
        let second = overall_score(items).unwrap();
        assert_eq!(first.serialize(), second.serialize());
    }

    #[test]
    fn overall_skips_undefined_categories() {
        let overall = overall_score([
            Contribution::new(category_score(Vec::new()), 4),
            Contribution::scored(dec("3.50"), 1),
            Contribution::scored(dec("4.50"), 1),
        ]);
        assert_eq!(overall, Some(dec("4")));
    }

    #[test]
    fn overall_uses_exact_category_means() {
        let category = category_score([
            Contribution::scored(dec("3.00"), 1),
            Contribution::scored(dec("4.00"), 2),
        ])
        .unwrap();
        let overall = overall_score([Contribution::scored(category, 1)]).unwrap();
        assert_eq!(overall, category);
        assert_ne!(overall, dec("3.67"));
        assert_eq!(round_for_display(overall).to_string(), "3.67");
    }

    #[test]
    fn display_rounding_is_half_up() {
        assert_eq!(round_for_display(dec("3.125")).to_string(), "3.13");
        assert_eq!(round_for_display(dec("3.124999")).to_string(), "3.12");
        assert_eq!(round_for_display(dec("4.005")).to_string(), "4.01");
        assert_eq!(round_for_display(dec("2")).to_string(), "2.00");
    }
}

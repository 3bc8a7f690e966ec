use controlreg_types::{RiskEntry, ScoreScale, WeightBounds};
use std::cmp::Ordering;

/// Number of risk entries a report keeps.
pub const TOP_RISKS: usize = 5;

/// `100 * Σ(weight·score) / Σ(weight·max)`, rounded to two decimals (half away from zero).
///
/// `None` when there is nothing to score, the weighted denominator is zero, or the sums do
/// not fit in 128 bits.
pub fn weighted_score(pairs: &[(i64, i64)], scale_max: i64) -> Option<f64> {
    if pairs.is_empty() {
        return None;
    }
    let earned = weighted_sum(pairs, |score| score)?;
    let possible = weighted_sum(pairs, |_| scale_max)?;
    if possible == 0 {
        return None;
    }
    let pct = 100.0 * earned as f64 / possible as f64;
    Some(round2(pct))
}

/// `(max - score) * weight`, saturating at the `i64` bounds.
pub fn risk_score(scale_max: i64, score: i64, weight: i64) -> i64 {
    scale_max.saturating_sub(score).saturating_mul(weight)
}

/// Whether every `risk_score` and weighted product under these bounds fits in an `i64`.
pub fn bounds_fit(scale: &ScoreScale, weight: &WeightBounds) -> bool {
    let scale_extent = scale.min.unsigned_abs().max(scale.max.unsigned_abs());
    let weight_extent = weight.min.unsigned_abs().max(weight.max.unsigned_abs());
    scale_extent
        .checked_mul(2)
        .and_then(|spread| spread.checked_mul(weight_extent))
        .is_some_and(|product| product <= i64::MAX.unsigned_abs())
}

/// Highest risk first, then heavier weight, then control id.
pub fn compare_risks(a: &RiskEntry, b: &RiskEntry) -> Ordering {
    b.risk_score
        .cmp(&a.risk_score)
        .then_with(|| b.weight.cmp(&a.weight))
        .then_with(|| a.control_id.cmp(&b.control_id))
}

pub fn rank_risks(mut entries: Vec<RiskEntry>) -> Vec<RiskEntry> {
    entries.sort_by(compare_risks);
    entries.truncate(TOP_RISKS);
    entries
}

fn weighted_sum(pairs: &[(i64, i64)], factor: impl Fn(i64) -> i64) -> Option<i128> {
    pairs.iter().try_fold(0i128, |acc, &(weight, score)| {
        acc.checked_add(i128::from(weight) * i128::from(factor(score)))
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

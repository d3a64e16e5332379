use super::ParameterScore;

/// Weight-renormalized average of the normalized scores, rounded to two
/// decimals. Correct even when active-parameter weights do not sum to 100;
/// zero active parameters yield zero.
pub fn aggregate(scores: &[ParameterScore]) -> f64 {
    let total_weight: f64 = scores.iter().map(|score| score.weight as f64).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    let weighted_sum: f64 = scores
        .iter()
        .map(|score| score.normalized_score * score.weight as f64)
        .sum();
    round2(weighted_sum / total_weight)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

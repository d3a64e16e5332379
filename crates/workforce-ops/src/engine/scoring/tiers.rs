use serde::Serialize;

/// One band of the bonus ladder mapping a composite score range onto a
/// bonus-percentage range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BonusTier {
    pub min_score: f64,
    pub max_score: f64,
    pub min_bonus: u32,
    pub max_bonus: u32,
    pub label: &'static str,
    pub color: &'static str,
}

/// Tier resolved for a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierAssignment {
    pub bonus_percentage: u32,
    pub tier: &'static str,
    pub tier_color: &'static str,
}

/// Fixed ladder of bonus tiers, contiguous and exhaustive over [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierLadder {
    tiers: Vec<BonusTier>,
}

impl TierLadder {
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                tier(0.0, 30.0, 0, 25, "Needs Improvement", "#ef4444"),
                tier(31.0, 50.0, 26, 50, "Below Average", "#f97316"),
                tier(51.0, 65.0, 51, 75, "Average", "#eab308"),
                tier(66.0, 78.0, 76, 100, "Good", "#84cc16"),
                tier(79.0, 87.0, 101, 150, "Very Good", "#22c55e"),
                tier(88.0, 93.0, 151, 175, "Excellent", "#14b8a6"),
                tier(94.0, 97.0, 176, 200, "Outstanding", "#3b82f6"),
                tier(98.0, 100.0, 201, 250, "Exceptional", "#8b5cf6"),
            ],
        }
    }

    pub fn tiers(&self) -> &[BonusTier] {
        &self.tiers
    }

    /// Map a composite score onto its tier, interpolating the bonus
    /// percentage linearly within the band. Scores are clamped to [0, 100];
    /// anything falling between bands resolves to the lowest tier.
    pub fn resolve(&self, total_score: f64) -> TierAssignment {
        let score = total_score.clamp(0.0, 100.0);
        let matched = self
            .tiers
            .iter()
            .find(|tier| score >= tier.min_score && score <= tier.max_score)
            .or_else(|| self.tiers.first());

        let Some(tier) = matched else {
            return TierAssignment {
                bonus_percentage: 0,
                tier: "Unclassified",
                tier_color: "#9ca3af",
            };
        };

        let span = tier.max_score - tier.min_score;
        let position = if span <= f64::EPSILON {
            0.0
        } else {
            ((score - tier.min_score) / span).clamp(0.0, 1.0)
        };
        let bonus_span = (tier.max_bonus - tier.min_bonus) as f64;
        let bonus = (tier.min_bonus as f64 + position * bonus_span).round() as u32;

        TierAssignment {
            bonus_percentage: bonus,
            tier: tier.label,
            tier_color: tier.color,
        }
    }
}

const fn tier(
    min_score: f64,
    max_score: f64,
    min_bonus: u32,
    max_bonus: u32,
    label: &'static str,
    color: &'static str,
) -> BonusTier {
    BonusTier {
        min_score,
        max_score,
        min_bonus,
        max_bonus,
        label,
        color,
    }
}

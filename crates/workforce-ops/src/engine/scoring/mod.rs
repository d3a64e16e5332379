//! Performance scoring: per-parameter formulas, weighted aggregation, and
//! bonus-tier mapping.

pub mod composite;
pub mod formulas;
pub mod service;
pub mod tiers;

pub use formulas::{measure_parameter, task_speed_score, ParameterKind};
pub use service::PerformanceService;
pub use tiers::{BonusTier, TierAssignment, TierLadder};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::Period;
use super::domain::{AttendanceRecord, CompanyId, LeaveRequest, TaskRecord, TaskReview, UserId};

/// Raw measurement and its 0-100 normalization for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasuredScore {
    pub raw_value: f64,
    pub normalized_score: f64,
}

impl MeasuredScore {
    /// Neutral measure used when a parameter name is unrecognized.
    pub fn neutral() -> Self {
        Self {
            raw_value: 0.0,
            normalized_score: 50.0,
        }
    }
}

/// Everything a scoring formula may read: one user's period aggregates plus
/// the company-wide simultaneous-absence context. Formulas are pure over
/// this snapshot, so each one can be unit tested in isolation.
#[derive(Debug, Clone, Copy)]
pub struct ScoreContext<'a> {
    pub period: Period,
    pub today: NaiveDate,
    pub working_days: u32,
    pub attendance: &'a [AttendanceRecord],
    pub leaves: &'a [LeaveRequest],
    pub tasks: &'a [TaskRecord],
    pub reviews: &'a [TaskReview],
    /// Company-wide "2+ absent" day-violations over the trailing 3 months.
    pub simultaneous_absence_violations: u32,
}

/// Derived score for one user, parameter, and period; upserted by that key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterScore {
    pub user_id: UserId,
    pub parameter_id: String,
    pub parameter_name: String,
    pub period: Period,
    pub raw_value: f64,
    pub normalized_score: f64,
    pub weight: f32,
    pub weighted_score: f64,
}

/// Derived composite for one user and period; overwritten on recalculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub period: Period,
    pub total_score: f64,
    pub bonus_percentage: u32,
    pub tier: String,
    pub tier_color: String,
    pub breakdown: Vec<ParameterScore>,
}

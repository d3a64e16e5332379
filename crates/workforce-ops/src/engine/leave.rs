use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::weekday_count;
use super::domain::{
    CompanyId, LeaveId, LeaveRequest, LeaveStatus, LeaveType, ProofStatus, UserId,
};
use super::repository::WorkforceRepository;
use super::settings::EngineSettings;
use super::EngineError;

/// Notice-period and penalty policy applied when a leave is filed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeavePolicy {
    /// Whole days of notice required for a leave to count as advance.
    pub advance_notice_days: i64,
    /// Duration (working days) above which the heavier penalty applies.
    pub long_leave_days: u32,
    pub short_leave_impact: f32,
    pub long_leave_impact: f32,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            advance_notice_days: 7,
            long_leave_days: 2,
            short_leave_impact: -1.0,
            long_leave_impact: -2.0,
        }
    }
}

/// Outcome of classifying a leave filing against the notice policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeaveClassification {
    pub duration_days: u32,
    pub days_in_advance: i64,
    pub is_advance: bool,
    pub is_emergency: bool,
    pub scoring_impact: f32,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LeaveValidationError {
    #[error("leave end date {end} precedes start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("leave range {start} to {end} contains no working days")]
    NoWorkingDays { start: NaiveDate, end: NaiveDate },
    #[error("proof approval applies only to emergency leaves")]
    ProofNotApplicable,
    #[error("leave status cannot transition from {from} to {to}")]
    InvalidTransition { from: &'static str, to: &'static str },
}

/// Classify a filing at the moment it is made. Duration counts weekdays
/// (Monday through Friday) in the inclusive range; a leave filed at least
/// `advance_notice_days` ahead is advance and carries no penalty, anything
/// shorter is an emergency penalized by duration.
pub fn classify_filing(
    start_date: NaiveDate,
    end_date: NaiveDate,
    today: NaiveDate,
    policy: &LeavePolicy,
) -> Result<LeaveClassification, LeaveValidationError> {
    if end_date < start_date {
        return Err(LeaveValidationError::EndBeforeStart {
            start: start_date,
            end: end_date,
        });
    }

    let duration_days = weekday_count(start_date, end_date);
    if duration_days == 0 {
        return Err(LeaveValidationError::NoWorkingDays {
            start: start_date,
            end: end_date,
        });
    }

    let days_in_advance = (start_date - today).num_days();
    let is_advance = days_in_advance >= policy.advance_notice_days;

    let scoring_impact = if is_advance {
        0.0
    } else if duration_days > policy.long_leave_days {
        policy.long_leave_impact
    } else {
        policy.short_leave_impact
    };

    Ok(LeaveClassification {
        duration_days,
        days_in_advance,
        is_advance,
        is_emergency: !is_advance,
        scoring_impact,
    })
}

/// Payload accepted when an employee files a leave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveSubmission {
    pub company_id: CompanyId,
    pub user_id: UserId,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

static LEAVE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_leave_id() -> LeaveId {
    let id = LEAVE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LeaveId(format!("leave-{id:06}"))
}

/// Service handling the synchronous leave write path: filing with impact
/// classification, proof approval, and status transitions.
pub struct LeaveService<R> {
    repository: Arc<R>,
    settings: Arc<EngineSettings>,
}

impl<R> LeaveService<R>
where
    R: WorkforceRepository + 'static,
{
    pub fn new(repository: Arc<R>, settings: Arc<EngineSettings>) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Validate and classify a filing, then persist it as a pending request.
    pub fn file(
        &self,
        submission: LeaveSubmission,
        today: NaiveDate,
    ) -> Result<LeaveRequest, EngineError> {
        let classification = classify_filing(
            submission.start_date,
            submission.end_date,
            today,
            &self.settings.leave,
        )?;

        let proof_status = if classification.is_emergency {
            ProofStatus::Pending
        } else {
            ProofStatus::NotRequired
        };

        let record = LeaveRequest {
            id: next_leave_id(),
            user_id: submission.user_id,
            company_id: submission.company_id,
            leave_type: submission.leave_type,
            start_date: submission.start_date,
            end_date: submission.end_date,
            duration_days: classification.duration_days,
            is_advance: classification.is_advance,
            is_emergency: classification.is_emergency,
            scoring_impact: classification.scoring_impact,
            proof_status,
            status: LeaveStatus::Pending,
        };

        self.repository.insert_leave(&record)?;
        Ok(record)
    }

    /// Approving proof on an emergency leave neutralizes its scoring penalty
    /// without altering the advance/emergency classification.
    pub fn approve_proof(&self, leave_id: &LeaveId) -> Result<LeaveRequest, EngineError> {
        let mut record = self
            .repository
            .fetch_leave(leave_id)?
            .ok_or(super::repository::RepositoryError::NotFound)?;

        if !record.is_emergency {
            return Err(LeaveValidationError::ProofNotApplicable.into());
        }

        record.proof_status = ProofStatus::Approved;
        record.scoring_impact = 0.0;
        self.repository.update_leave(&record)?;
        Ok(record)
    }

    /// Transition a pending request to approved, rejected, or cancelled.
    pub fn set_status(
        &self,
        leave_id: &LeaveId,
        status: LeaveStatus,
    ) -> Result<LeaveRequest, EngineError> {
        let mut record = self
            .repository
            .fetch_leave(leave_id)?
            .ok_or(super::repository::RepositoryError::NotFound)?;

        let allowed = record.status == LeaveStatus::Pending
            && matches!(
                status,
                LeaveStatus::Approved | LeaveStatus::Rejected | LeaveStatus::Cancelled
            );
        if !allowed {
            return Err(LeaveValidationError::InvalidTransition {
                from: record.status.label(),
                to: status.label(),
            }
            .into());
        }

        record.status = status;
        self.repository.update_leave(&record)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn filing_exactly_at_notice_boundary_is_advance() {
        let today = date(2026, 6, 1);
        let classification =
            classify_filing(date(2026, 6, 8), date(2026, 6, 8), today, &LeavePolicy::default())
                .expect("valid filing");
        assert!(classification.is_advance);
        assert!(!classification.is_emergency);
        assert_eq!(classification.days_in_advance, 7);
        assert_eq!(classification.scoring_impact, 0.0);
    }

    #[test]
    fn short_notice_long_leave_takes_heavier_penalty() {
        // 6 days notice, Mon-Wed duration of 3 working days.
        let today = date(2026, 6, 2);
        let classification =
            classify_filing(date(2026, 6, 8), date(2026, 6, 10), today, &LeavePolicy::default())
                .expect("valid filing");
        assert!(classification.is_emergency);
        assert_eq!(classification.days_in_advance, 6);
        assert_eq!(classification.duration_days, 3);
        assert_eq!(classification.scoring_impact, -2.0);

        // Same notice, single working day.
        let single =
            classify_filing(date(2026, 6, 8), date(2026, 6, 8), today, &LeavePolicy::default())
                .expect("valid filing");
        assert_eq!(single.scoring_impact, -1.0);
    }

    #[test]
    fn weekend_only_range_is_rejected() {
        // June 6-7 2026 is a Saturday and Sunday.
        let result = classify_filing(
            date(2026, 6, 6),
            date(2026, 6, 7),
            date(2026, 6, 1),
            &LeavePolicy::default(),
        );
        assert_eq!(
            result,
            Err(LeaveValidationError::NoWorkingDays {
                start: date(2026, 6, 6),
                end: date(2026, 6, 7),
            })
        );
    }

    #[test]
    fn inverted_range_is_rejected() {
        let result = classify_filing(
            date(2026, 6, 10),
            date(2026, 6, 8),
            date(2026, 6, 1),
            &LeavePolicy::default(),
        );
        assert!(matches!(
            result,
            Err(LeaveValidationError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn weekends_do_not_count_toward_duration() {
        // Friday through Monday spans four calendar days but two working days.
        let classification = classify_filing(
            date(2026, 6, 5),
            date(2026, 6, 8),
            date(2026, 6, 1),
            &LeavePolicy::default(),
        )
        .expect("valid filing");
        assert_eq!(classification.duration_days, 2);
    }
}

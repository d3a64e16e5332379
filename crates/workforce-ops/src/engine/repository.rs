use chrono::NaiveDate;

use super::anomaly::AnomalyReport;
use super::calendar::Period;
use super::domain::{
    AnomalyRule, AttendanceRecord, CompanyId, CompanySettings, EmployeeProfile, GeoFence,
    LeaveId, LeaveRequest, ScoringParameter, TaskRecord, TaskReview, UserId,
};
use super::scoring::{CompositeResult, ParameterScore};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction over the operational tables the engine reads and the
/// derived tables it writes. All derived writes are upserts keyed by natural
/// identity so calculation passes stay idempotent.
pub trait WorkforceRepository: Send + Sync {
    // Reference data owned by collaborators.
    fn active_employees(&self, company: &CompanyId) -> Result<Vec<EmployeeProfile>, RepositoryError>;
    fn company_settings(&self, company: &CompanyId)
        -> Result<Option<CompanySettings>, RepositoryError>;
    fn active_parameters(&self, company: &CompanyId)
        -> Result<Vec<ScoringParameter>, RepositoryError>;
    fn active_fences(&self, company: &CompanyId) -> Result<Vec<GeoFence>, RepositoryError>;
    fn active_anomaly_rules(&self, company: &CompanyId)
        -> Result<Vec<AnomalyRule>, RepositoryError>;

    // Attendance: one record per user per date.
    fn fetch_attendance(
        &self,
        company: &CompanyId,
        user: &UserId,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, RepositoryError>;
    fn insert_attendance(&self, record: &AttendanceRecord) -> Result<(), RepositoryError>;
    fn update_attendance(&self, record: &AttendanceRecord) -> Result<(), RepositoryError>;
    fn attendance_on(
        &self,
        company: &CompanyId,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError>;
    fn user_attendance_between(
        &self,
        company: &CompanyId,
        user: &UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError>;
    fn company_attendance_between(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError>;

    // Leave requests. Range queries select by start date.
    fn insert_leave(&self, record: &LeaveRequest) -> Result<(), RepositoryError>;
    fn update_leave(&self, record: &LeaveRequest) -> Result<(), RepositoryError>;
    fn fetch_leave(&self, id: &LeaveId) -> Result<Option<LeaveRequest>, RepositoryError>;
    fn user_leaves_between(
        &self,
        company: &CompanyId,
        user: &UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LeaveRequest>, RepositoryError>;
    fn approved_leaves_covering(
        &self,
        company: &CompanyId,
        date: NaiveDate,
    ) -> Result<Vec<LeaveRequest>, RepositoryError>;

    // Tasks and reviews.
    fn user_tasks(&self, company: &CompanyId, user: &UserId)
        -> Result<Vec<TaskRecord>, RepositoryError>;
    fn company_tasks(&self, company: &CompanyId) -> Result<Vec<TaskRecord>, RepositoryError>;
    fn user_reviews_between(
        &self,
        company: &CompanyId,
        user: &UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TaskReview>, RepositoryError>;

    // Derived scores, keyed (user, parameter, period).
    fn upsert_parameter_score(&self, score: &ParameterScore) -> Result<(), RepositoryError>;
    // Derived composites, keyed (user, period).
    fn upsert_composite(&self, result: &CompositeResult) -> Result<(), RepositoryError>;
    fn fetch_composite(
        &self,
        company: &CompanyId,
        user: &UserId,
        period: Period,
    ) -> Result<Option<CompositeResult>, RepositoryError>;
    // Derived anomaly reports, keyed (company, date).
    fn upsert_report(&self, report: &AnomalyReport) -> Result<(), RepositoryError>;
    fn fetch_report(
        &self,
        company: &CompanyId,
        date: NaiveDate,
    ) -> Result<Option<AnomalyReport>, RepositoryError>;
}

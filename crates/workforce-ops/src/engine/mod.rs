//! The performance scoring and anomaly detection engine.
//!
//! Everything here is deterministic: callers pass `today`/`now` in at the
//! boundary, repositories supply the operational rows, and all derived
//! writes are natural-key upserts so passes can be re-run safely.

pub mod anomaly;
pub mod attendance;
pub mod calendar;
pub mod domain;
pub mod export;
pub mod geo;
pub mod leave;
pub mod memory;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod settings;

pub use anomaly::AnomalyService;
pub use attendance::AttendanceService;
pub use calendar::Period;
pub use leave::LeaveService;
pub use memory::{InMemoryReportPublisher, InMemoryWorkforceRepository};
pub use scoring::PerformanceService;
pub use settings::EngineSettings;

use chrono::NaiveDate;

use domain::UserId;

/// Error raised by the engine services.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Repository(#[from] repository::RepositoryError),
    #[error(transparent)]
    Leave(#[from] leave::LeaveValidationError),
    #[error(transparent)]
    Period(#[from] calendar::PeriodParseError),
    #[error(transparent)]
    Publish(#[from] anomaly::PublishError),
    #[error("attendance record for {user_id} on {date} has no check-in")]
    MissingCheckIn { user_id: UserId, date: NaiveDate },
}

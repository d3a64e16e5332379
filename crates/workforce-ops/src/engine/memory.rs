//! In-memory repository and publisher backing the service binary, demos,
//! and tests. Mutex-guarded maps keyed by the same natural identities the
//! storage layer would enforce.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use super::anomaly::{AnomalyReport, ReportPublisher};
use super::anomaly::service::PublishError;
use super::calendar::Period;
use super::domain::{
    AnomalyRule, AttendanceRecord, CompanyId, CompanySettings, EmployeeProfile, GeoFence,
    LeaveId, LeaveRequest, ScoringParameter, TaskRecord, TaskReview, UserId,
};
use super::repository::{RepositoryError, WorkforceRepository};
use super::scoring::{CompositeResult, ParameterScore};

#[derive(Default)]
struct Store {
    employees: Vec<EmployeeProfile>,
    settings: HashMap<CompanyId, CompanySettings>,
    parameters: Vec<ScoringParameter>,
    fences: Vec<GeoFence>,
    rules: Vec<AnomalyRule>,
    attendance: HashMap<(UserId, NaiveDate), AttendanceRecord>,
    leaves: HashMap<LeaveId, LeaveRequest>,
    tasks: Vec<TaskRecord>,
    reviews: Vec<TaskReview>,
    parameter_scores: HashMap<(UserId, String, Period), ParameterScore>,
    composites: HashMap<(UserId, Period), CompositeResult>,
    reports: HashMap<(CompanyId, NaiveDate), AnomalyReport>,
}

#[derive(Default, Clone)]
pub struct InMemoryWorkforceRepository {
    store: Arc<Mutex<Store>>,
}

impl InMemoryWorkforceRepository {
    fn with_store<T>(&self, f: impl FnOnce(&mut Store) -> T) -> T {
        let mut guard = self.store.lock().expect("repository mutex poisoned");
        f(&mut guard)
    }

    pub fn seed_employee(&self, employee: EmployeeProfile) {
        self.with_store(|store| store.employees.push(employee));
    }

    pub fn seed_company_settings(&self, settings: CompanySettings) {
        self.with_store(|store| {
            store.settings.insert(settings.company_id.clone(), settings);
        });
    }

    pub fn seed_parameter(&self, parameter: ScoringParameter) {
        self.with_store(|store| store.parameters.push(parameter));
    }

    pub fn seed_fence(&self, fence: GeoFence) {
        self.with_store(|store| store.fences.push(fence));
    }

    pub fn seed_rule(&self, rule: AnomalyRule) {
        self.with_store(|store| store.rules.push(rule));
    }

    pub fn seed_attendance(&self, record: AttendanceRecord) {
        self.with_store(|store| {
            store
                .attendance
                .insert((record.user_id.clone(), record.date), record);
        });
    }

    pub fn seed_leave(&self, record: LeaveRequest) {
        self.with_store(|store| {
            store.leaves.insert(record.id.clone(), record);
        });
    }

    pub fn seed_task(&self, task: TaskRecord) {
        self.with_store(|store| store.tasks.push(task));
    }

    pub fn seed_review(&self, review: TaskReview) {
        self.with_store(|store| store.reviews.push(review));
    }

    /// Stored parameter-score row count, exposed for idempotency assertions.
    pub fn parameter_score_rows(&self) -> usize {
        self.with_store(|store| store.parameter_scores.len())
    }

    /// Stored composite row count, exposed for idempotency assertions.
    pub fn composite_rows(&self) -> usize {
        self.with_store(|store| store.composites.len())
    }
}

impl WorkforceRepository for InMemoryWorkforceRepository {
    fn active_employees(
        &self,
        company: &CompanyId,
    ) -> Result<Vec<EmployeeProfile>, RepositoryError> {
        Ok(self.with_store(|store| {
            store
                .employees
                .iter()
                .filter(|employee| employee.is_active && &employee.company_id == company)
                .cloned()
                .collect()
        }))
    }

    fn company_settings(
        &self,
        company: &CompanyId,
    ) -> Result<Option<CompanySettings>, RepositoryError> {
        Ok(self.with_store(|store| store.settings.get(company).cloned()))
    }

    fn active_parameters(
        &self,
        company: &CompanyId,
    ) -> Result<Vec<ScoringParameter>, RepositoryError> {
        Ok(self.with_store(|store| {
            store
                .parameters
                .iter()
                .filter(|parameter| parameter.is_active && &parameter.company_id == company)
                .cloned()
                .collect()
        }))
    }

    fn active_fences(&self, company: &CompanyId) -> Result<Vec<GeoFence>, RepositoryError> {
        Ok(self.with_store(|store| {
            store
                .fences
                .iter()
                .filter(|fence| fence.is_active && &fence.company_id == company)
                .cloned()
                .collect()
        }))
    }

    fn active_anomaly_rules(
        &self,
        company: &CompanyId,
    ) -> Result<Vec<AnomalyRule>, RepositoryError> {
        Ok(self.with_store(|store| {
            store
                .rules
                .iter()
                .filter(|rule| rule.is_active && &rule.company_id == company)
                .cloned()
                .collect()
        }))
    }

    fn fetch_attendance(
        &self,
        company: &CompanyId,
        user: &UserId,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, RepositoryError> {
        Ok(self.with_store(|store| {
            store
                .attendance
                .get(&(user.clone(), date))
                .filter(|record| &record.company_id == company)
                .cloned()
        }))
    }

    fn insert_attendance(&self, record: &AttendanceRecord) -> Result<(), RepositoryError> {
        self.with_store(|store| {
            let key = (record.user_id.clone(), record.date);
            if store.attendance.contains_key(&key) {
                return Err(RepositoryError::Conflict);
            }
            store.attendance.insert(key, record.clone());
            Ok(())
        })
    }

    fn update_attendance(&self, record: &AttendanceRecord) -> Result<(), RepositoryError> {
        self.with_store(|store| {
            let key = (record.user_id.clone(), record.date);
            if !store.attendance.contains_key(&key) {
                return Err(RepositoryError::NotFound);
            }
            store.attendance.insert(key, record.clone());
            Ok(())
        })
    }

    fn attendance_on(
        &self,
        company: &CompanyId,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError> {
        Ok(self.with_store(|store| {
            store
                .attendance
                .values()
                .filter(|record| &record.company_id == company && record.date == date)
                .cloned()
                .collect()
        }))
    }

    fn user_attendance_between(
        &self,
        company: &CompanyId,
        user: &UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError> {
        Ok(self.with_store(|store| {
            let mut records: Vec<AttendanceRecord> = store
                .attendance
                .values()
                .filter(|record| {
                    &record.company_id == company
                        && &record.user_id == user
                        && record.date >= start
                        && record.date <= end
                })
                .cloned()
                .collect();
            records.sort_by_key(|record| record.date);
            records
        }))
    }

    fn company_attendance_between(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError> {
        Ok(self.with_store(|store| {
            let mut records: Vec<AttendanceRecord> = store
                .attendance
                .values()
                .filter(|record| {
                    &record.company_id == company && record.date >= start && record.date <= end
                })
                .cloned()
                .collect();
            records.sort_by_key(|record| record.date);
            records
        }))
    }

    fn insert_leave(&self, record: &LeaveRequest) -> Result<(), RepositoryError> {
        self.with_store(|store| {
            if store.leaves.contains_key(&record.id) {
                return Err(RepositoryError::Conflict);
            }
            store.leaves.insert(record.id.clone(), record.clone());
            Ok(())
        })
    }

    fn update_leave(&self, record: &LeaveRequest) -> Result<(), RepositoryError> {
        self.with_store(|store| {
            if !store.leaves.contains_key(&record.id) {
                return Err(RepositoryError::NotFound);
            }
            store.leaves.insert(record.id.clone(), record.clone());
            Ok(())
        })
    }

    fn fetch_leave(&self, id: &LeaveId) -> Result<Option<LeaveRequest>, RepositoryError> {
        Ok(self.with_store(|store| store.leaves.get(id).cloned()))
    }

    fn user_leaves_between(
        &self,
        company: &CompanyId,
        user: &UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LeaveRequest>, RepositoryError> {
        Ok(self.with_store(|store| {
            let mut leaves: Vec<LeaveRequest> = store
                .leaves
                .values()
                .filter(|leave| {
                    &leave.company_id == company
                        && &leave.user_id == user
                        && leave.start_date >= start
                        && leave.start_date <= end
                })
                .cloned()
                .collect();
            leaves.sort_by_key(|leave| leave.start_date);
            leaves
        }))
    }

    fn approved_leaves_covering(
        &self,
        company: &CompanyId,
        date: NaiveDate,
    ) -> Result<Vec<LeaveRequest>, RepositoryError> {
        Ok(self.with_store(|store| {
            store
                .leaves
                .values()
                .filter(|leave| {
                    &leave.company_id == company
                        && leave.status == super::domain::LeaveStatus::Approved
                        && leave.start_date <= date
                        && leave.end_date >= date
                })
                .cloned()
                .collect()
        }))
    }

    fn user_tasks(
        &self,
        company: &CompanyId,
        user: &UserId,
    ) -> Result<Vec<TaskRecord>, RepositoryError> {
        Ok(self.with_store(|store| {
            store
                .tasks
                .iter()
                .filter(|task| &task.company_id == company && &task.assignee == user)
                .cloned()
                .collect()
        }))
    }

    fn company_tasks(&self, company: &CompanyId) -> Result<Vec<TaskRecord>, RepositoryError> {
        Ok(self.with_store(|store| {
            store
                .tasks
                .iter()
                .filter(|task| &task.company_id == company)
                .cloned()
                .collect()
        }))
    }

    fn user_reviews_between(
        &self,
        company: &CompanyId,
        user: &UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TaskReview>, RepositoryError> {
        Ok(self.with_store(|store| {
            store
                .reviews
                .iter()
                .filter(|review| {
                    &review.company_id == company
                        && &review.subject == user
                        && review.reviewed_on >= start
                        && review.reviewed_on <= end
                })
                .cloned()
                .collect()
        }))
    }

    fn upsert_parameter_score(&self, score: &ParameterScore) -> Result<(), RepositoryError> {
        self.with_store(|store| {
            store.parameter_scores.insert(
                (
                    score.user_id.clone(),
                    score.parameter_id.clone(),
                    score.period,
                ),
                score.clone(),
            );
            Ok(())
        })
    }

    fn upsert_composite(&self, result: &CompositeResult) -> Result<(), RepositoryError> {
        self.with_store(|store| {
            store
                .composites
                .insert((result.user_id.clone(), result.period), result.clone());
            Ok(())
        })
    }

    fn fetch_composite(
        &self,
        company: &CompanyId,
        user: &UserId,
        period: Period,
    ) -> Result<Option<CompositeResult>, RepositoryError> {
        Ok(self.with_store(|store| {
            store
                .composites
                .get(&(user.clone(), period))
                .filter(|result| &result.company_id == company)
                .cloned()
        }))
    }

    fn upsert_report(&self, report: &AnomalyReport) -> Result<(), RepositoryError> {
        self.with_store(|store| {
            store
                .reports
                .insert((report.company_id.clone(), report.date), report.clone());
            Ok(())
        })
    }

    fn fetch_report(
        &self,
        company: &CompanyId,
        date: NaiveDate,
    ) -> Result<Option<AnomalyReport>, RepositoryError> {
        Ok(self.with_store(|store| store.reports.get(&(company.clone(), date)).cloned()))
    }
}

/// Publisher capturing reports in memory so routes and tests can assert the
/// delivery boundary.
#[derive(Default, Clone)]
pub struct InMemoryReportPublisher {
    published: Arc<Mutex<Vec<AnomalyReport>>>,
}

impl InMemoryReportPublisher {
    pub fn published(&self) -> Vec<AnomalyReport> {
        self.published.lock().expect("publisher mutex poisoned").clone()
    }
}

impl ReportPublisher for InMemoryReportPublisher {
    fn publish(&self, report: &AnomalyReport) -> Result<(), PublishError> {
        let mut guard = self.published.lock().expect("publisher mutex poisoned");
        guard.push(report.clone());
        Ok(())
    }
}

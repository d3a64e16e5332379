//! The seven detection checks. Each one queries the repository on its own
//! and returns its findings, so the sweep can capture a single check's
//! failure without losing the rest.

use chrono::{Duration, NaiveDate};
use serde_json::json;

use super::{AnomalyItem, AnomalyKind};
use crate::engine::calendar::Period;
use crate::engine::domain::{
    CompanyId, EmployeeProfile, LeaveStatus, Severity, UserId,
};
use crate::engine::repository::WorkforceRepository;
use crate::engine::settings::DetectionSettings;
use crate::engine::EngineError;

const ABSENCE_THRESHOLD: u32 = 2;
const ABSENCE_CRITICAL: u32 = 4;
const GEO_EXIT_THRESHOLD: u32 = 3;
const GEO_EXIT_SEVERE: u32 = 5;
const OVERDUE_GRACE_DAYS: i64 = 7;
const EMERGENCY_LEAVE_TOLERANCE: usize = 2;
const LOW_ATTENDANCE_MIN_ELAPSED: u32 = 5;
const LOW_ATTENDANCE_RATE: f64 = 0.8;
const LOW_ATTENDANCE_CRITICAL_RATE: f64 = 0.6;
const BACKLOG_THRESHOLD: usize = 3;
const BACKLOG_CRITICAL: usize = 5;

pub(crate) fn run_check<R: WorkforceRepository>(
    kind: AnomalyKind,
    repository: &R,
    company: &CompanyId,
    today: NaiveDate,
    settings: &DetectionSettings,
) -> Result<Vec<AnomalyItem>, EngineError> {
    match kind {
        AnomalyKind::SimultaneousAbsence => simultaneous_absence(repository, company, today),
        AnomalyKind::ExcessiveGeoExits => excessive_geo_exits(repository, company, today),
        AnomalyKind::OverdueTaskNoPermission => overdue_no_permission(repository, company, today),
        AnomalyKind::FrequentEmergencyLeaves => {
            frequent_emergency_leaves(repository, company, today)
        }
        AnomalyKind::LowAttendance => low_attendance(repository, company, today),
        AnomalyKind::HighBacklog => high_backlog(repository, company, today),
        AnomalyKind::FrequentLateArrivals => {
            frequent_late_arrivals(repository, company, today, settings)
        }
    }
}

fn staff<R: WorkforceRepository>(
    repository: &R,
    company: &CompanyId,
) -> Result<Vec<EmployeeProfile>, EngineError> {
    Ok(repository
        .active_employees(company)?
        .into_iter()
        .filter(|employee| !employee.role.is_super_admin())
        .collect())
}

fn simultaneous_absence<R: WorkforceRepository>(
    repository: &R,
    company: &CompanyId,
    today: NaiveDate,
) -> Result<Vec<AnomalyItem>, EngineError> {
    let staff = staff(repository, company)?;
    let staff_ids: Vec<&UserId> = staff.iter().map(|employee| &employee.user_id).collect();

    let present = repository
        .attendance_on(company, today)?
        .iter()
        .filter(|record| record.check_in.is_some() && staff_ids.contains(&&record.user_id))
        .count() as u32;

    let absent = (staff.len() as u32).saturating_sub(present);
    if absent < ABSENCE_THRESHOLD {
        return Ok(Vec::new());
    }

    let on_leave: Vec<UserId> = repository
        .approved_leaves_covering(company, today)?
        .into_iter()
        .map(|leave| leave.user_id)
        .collect();

    let severity = if absent >= ABSENCE_CRITICAL {
        Severity::Critical
    } else {
        Severity::High
    };

    Ok(vec![AnomalyItem {
        kind: AnomalyKind::SimultaneousAbsence,
        severity,
        title: format!("{absent} employees absent today"),
        description: format!(
            "{absent} of {} active employees are absent on {today}; {} on approved leave.",
            staff.len(),
            on_leave.len()
        ),
        affected_users: on_leave.clone(),
        data: json!({
            "absent": absent,
            "present": present,
            "active": staff.len(),
            "on_approved_leave": on_leave,
        }),
    }])
}

fn excessive_geo_exits<R: WorkforceRepository>(
    repository: &R,
    company: &CompanyId,
    today: NaiveDate,
) -> Result<Vec<AnomalyItem>, EngineError> {
    let items = repository
        .attendance_on(company, today)?
        .into_iter()
        .filter(|record| record.geo_exit_count >= GEO_EXIT_THRESHOLD)
        .map(|record| {
            let severity = if record.geo_exit_count >= GEO_EXIT_SEVERE {
                Severity::High
            } else {
                Severity::Medium
            };
            AnomalyItem {
                kind: AnomalyKind::ExcessiveGeoExits,
                severity,
                title: format!("{} left the work zone {} times", record.user_id, record.geo_exit_count),
                description: format!(
                    "Attendance for {today} shows {} geofence exits.",
                    record.geo_exit_count
                ),
                affected_users: vec![record.user_id.clone()],
                data: json!({ "geo_exit_count": record.geo_exit_count }),
            }
        })
        .collect();
    Ok(items)
}

fn overdue_no_permission<R: WorkforceRepository>(
    repository: &R,
    company: &CompanyId,
    today: NaiveDate,
) -> Result<Vec<AnomalyItem>, EngineError> {
    let cutoff = today - Duration::days(OVERDUE_GRACE_DAYS);
    let items = repository
        .company_tasks(company)?
        .into_iter()
        .filter(|task| {
            task.status.is_open() && task.deadline < cutoff && !task.special_permission
        })
        .map(|task| AnomalyItem {
            kind: AnomalyKind::OverdueTaskNoPermission,
            severity: Severity::Medium,
            title: format!("Task '{}' overdue without permission", task.title),
            description: format!(
                "Deadline {} is more than {OVERDUE_GRACE_DAYS} days past with no extension granted.",
                task.deadline
            ),
            affected_users: vec![task.assignee.clone()],
            data: json!({ "task_id": task.id, "deadline": task.deadline }),
        })
        .collect();
    Ok(items)
}

fn frequent_emergency_leaves<R: WorkforceRepository>(
    repository: &R,
    company: &CompanyId,
    today: NaiveDate,
) -> Result<Vec<AnomalyItem>, EngineError> {
    let period = Period::containing(today);
    let mut items = Vec::new();
    for employee in repository.active_employees(company)? {
        let emergencies = repository
            .user_leaves_between(
                company,
                &employee.user_id,
                period.first_day(),
                period.last_day(),
            )?
            .into_iter()
            .filter(|leave| {
                leave.is_emergency
                    && matches!(leave.status, LeaveStatus::Approved | LeaveStatus::Pending)
            })
            .count();
        if emergencies > EMERGENCY_LEAVE_TOLERANCE {
            items.push(AnomalyItem {
                kind: AnomalyKind::FrequentEmergencyLeaves,
                severity: Severity::High,
                title: format!("{} filed {emergencies} emergency leaves", employee.display_name),
                description: format!(
                    "{emergencies} emergency leaves filed in {period}, above the tolerance of {EMERGENCY_LEAVE_TOLERANCE}."
                ),
                affected_users: vec![employee.user_id.clone()],
                data: json!({ "emergency_leaves": emergencies, "period": period }),
            });
        }
    }
    Ok(items)
}

fn low_attendance<R: WorkforceRepository>(
    repository: &R,
    company: &CompanyId,
    today: NaiveDate,
) -> Result<Vec<AnomalyItem>, EngineError> {
    let period = Period::containing(today);
    let elapsed = period.working_days_through(today);
    if elapsed < LOW_ATTENDANCE_MIN_ELAPSED {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    for employee in staff(repository, company)? {
        let present = repository
            .user_attendance_between(company, &employee.user_id, period.first_day(), today)?
            .iter()
            .filter(|record| record.check_in.is_some())
            .count() as f64;
        let rate = present / elapsed as f64;
        if rate >= LOW_ATTENDANCE_RATE {
            continue;
        }
        let severity = if rate < LOW_ATTENDANCE_CRITICAL_RATE {
            Severity::Critical
        } else {
            Severity::High
        };
        items.push(AnomalyItem {
            kind: AnomalyKind::LowAttendance,
            severity,
            title: format!("{} attendance at {:.0}%", employee.display_name, rate * 100.0),
            description: format!(
                "Present {present} of {elapsed} working days so far in {period}.",
            ),
            affected_users: vec![employee.user_id.clone()],
            data: json!({ "present_days": present, "working_days": elapsed }),
        });
    }
    Ok(items)
}

fn high_backlog<R: WorkforceRepository>(
    repository: &R,
    company: &CompanyId,
    today: NaiveDate,
) -> Result<Vec<AnomalyItem>, EngineError> {
    let mut items = Vec::new();
    for employee in repository.active_employees(company)? {
        let overdue = repository
            .user_tasks(company, &employee.user_id)?
            .into_iter()
            .filter(|task| task.status.is_open() && task.deadline < today)
            .count();
        if overdue < BACKLOG_THRESHOLD {
            continue;
        }
        let severity = if overdue >= BACKLOG_CRITICAL {
            Severity::Critical
        } else {
            Severity::High
        };
        items.push(AnomalyItem {
            kind: AnomalyKind::HighBacklog,
            severity,
            title: format!("{} carries {overdue} overdue tasks", employee.display_name),
            description: format!("{overdue} assigned tasks are past their deadline."),
            affected_users: vec![employee.user_id.clone()],
            data: json!({ "overdue_tasks": overdue }),
        });
    }
    Ok(items)
}

fn frequent_late_arrivals<R: WorkforceRepository>(
    repository: &R,
    company: &CompanyId,
    today: NaiveDate,
    settings: &DetectionSettings,
) -> Result<Vec<AnomalyItem>, EngineError> {
    let threshold = repository
        .company_settings(company)?
        .map(|company_settings| company_settings.late_threshold)
        .unwrap_or(settings.default_late_threshold);
    let period = Period::containing(today);

    let mut items = Vec::new();
    for employee in staff(repository, company)? {
        let month = repository.user_attendance_between(
            company,
            &employee.user_id,
            period.first_day(),
            today,
        )?;
        let late = month.iter().filter(|record| record.is_late).count() as u32;
        if late < threshold {
            continue;
        }
        let any_half_day = month.iter().any(|record| record.is_half_day);
        let severity = if any_half_day {
            Severity::Critical
        } else {
            Severity::High
        };
        items.push(AnomalyItem {
            kind: AnomalyKind::FrequentLateArrivals,
            severity,
            title: format!("{} late {late} times this month", employee.display_name),
            description: format!(
                "{late} late arrivals in {period} meet the company threshold of {threshold}."
            ),
            affected_users: vec![employee.user_id.clone()],
            data: json!({ "late_count": late, "threshold": threshold, "half_day": any_half_day }),
        });
    }
    Ok(items)
}

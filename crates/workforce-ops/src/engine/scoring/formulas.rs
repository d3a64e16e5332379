//! The registry of per-parameter scoring formulas.
//!
//! Each configured parameter name resolves to a `ParameterKind`, and each
//! kind is a pure function of the `ScoreContext`. Unrecognized names degrade
//! to the neutral measure instead of failing the aggregation.

use chrono::NaiveDate;

use super::{MeasuredScore, ScoreContext};
use crate::engine::domain::{LeaveStatus, LeaveType, LocationType, TaskRecord, TaskStatus};

const SICK_LEAVE_PENALTY: f64 = 20.0;
const ABSENCE_VIOLATION_PENALTY: f64 = 15.0;
const OVERTIME_BASE: f64 = 30.0;
const OVERTIME_PER_HOUR: f64 = 3.5;
const BACKLOG_RATIO_MULTIPLIER: f64 = 1.5;
const LATE_ARRIVAL_PENALTY: f64 = 10.0;
const HALF_DAY_PENALTY: f64 = 20.0;
const DAYS_LATE_PENALTY: f64 = 10.0;

/// Identifiers for the built-in scoring formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    TaskCompletionSpeed,
    AttendanceConsistency,
    HealthFrequency,
    SimultaneousAbsence,
    OvertimeEffort,
    WorkAccuracy,
    BacklogManagement,
    LeaveDiscipline,
    WfhProductivity,
    Punctuality,
}

impl ParameterKind {
    pub const fn all() -> [Self; 10] {
        [
            Self::TaskCompletionSpeed,
            Self::AttendanceConsistency,
            Self::HealthFrequency,
            Self::SimultaneousAbsence,
            Self::OvertimeEffort,
            Self::WorkAccuracy,
            Self::BacklogManagement,
            Self::LeaveDiscipline,
            Self::WfhProductivity,
            Self::Punctuality,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::TaskCompletionSpeed => "Task Completion Speed",
            Self::AttendanceConsistency => "Attendance Consistency",
            Self::HealthFrequency => "Health/Sickness Frequency",
            Self::SimultaneousAbsence => "Simultaneous Absence",
            Self::OvertimeEffort => "Overtime & Extra Effort",
            Self::WorkAccuracy => "Work Accuracy",
            Self::BacklogManagement => "Backlog Management",
            Self::LeaveDiscipline => "Leave Discipline",
            Self::WfhProductivity => "WFH Productivity",
            Self::Punctuality => "Punctuality",
        }
    }

    /// Resolve a configured parameter name, ignoring case and surrounding
    /// whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim();
        Self::all()
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(wanted))
    }

    pub fn measure(self, ctx: &ScoreContext<'_>) -> MeasuredScore {
        match self {
            Self::TaskCompletionSpeed => task_completion_speed(ctx),
            Self::AttendanceConsistency => attendance_consistency(ctx),
            Self::HealthFrequency => health_frequency(ctx),
            Self::SimultaneousAbsence => simultaneous_absence(ctx),
            Self::OvertimeEffort => overtime_effort(ctx),
            Self::WorkAccuracy => work_accuracy(ctx),
            Self::BacklogManagement => backlog_management(ctx),
            Self::LeaveDiscipline => leave_discipline(ctx),
            Self::WfhProductivity => wfh_productivity(ctx),
            Self::Punctuality => punctuality(ctx),
        }
    }
}

/// Measure a configured parameter by name, degrading unrecognized names to
/// the neutral measure.
pub fn measure_parameter(name: &str, ctx: &ScoreContext<'_>) -> MeasuredScore {
    match ParameterKind::from_name(name) {
        Some(kind) => kind.measure(ctx),
        None => MeasuredScore::neutral(),
    }
}

/// Speed score assigned when a task completes: full marks on or before the
/// deadline, ten points off per day late.
pub fn task_speed_score(deadline: NaiveDate, completed_on: NaiveDate) -> f64 {
    if completed_on <= deadline {
        return 100.0;
    }
    let days_late = (completed_on - deadline).num_days() as f64;
    (100.0 - days_late * DAYS_LATE_PENALTY).max(0.0)
}

fn completed_in_period<'a>(ctx: &ScoreContext<'a>) -> impl Iterator<Item = &'a TaskRecord> + 'a {
    let period = ctx.period;
    ctx.tasks.iter().filter(move |task| {
        task.status == TaskStatus::Completed
            && task
                .completed_on
                .map(|done| period.contains(done))
                .unwrap_or(false)
    })
}

fn task_completion_speed(ctx: &ScoreContext<'_>) -> MeasuredScore {
    let speeds: Vec<f64> = completed_in_period(ctx)
        .filter_map(|task| task.speed_score)
        .collect();
    if speeds.is_empty() {
        return MeasuredScore {
            raw_value: 0.0,
            normalized_score: 50.0,
        };
    }
    let mean = speeds.iter().sum::<f64>() / speeds.len() as f64;
    MeasuredScore {
        raw_value: mean,
        normalized_score: mean.clamp(0.0, 100.0),
    }
}

fn attendance_consistency(ctx: &ScoreContext<'_>) -> MeasuredScore {
    let present = ctx
        .attendance
        .iter()
        .filter(|record| record.check_in.is_some())
        .count() as f64;
    let working_days = ctx.working_days.max(1) as f64;
    let rate = present / working_days * 100.0;
    MeasuredScore {
        raw_value: rate,
        normalized_score: rate.min(100.0),
    }
}

fn health_frequency(ctx: &ScoreContext<'_>) -> MeasuredScore {
    let sick_count = ctx
        .leaves
        .iter()
        .filter(|leave| {
            leave.leave_type == LeaveType::Sick && leave.status == LeaveStatus::Approved
        })
        .count() as f64;
    MeasuredScore {
        raw_value: sick_count,
        normalized_score: (100.0 - sick_count * SICK_LEAVE_PENALTY).max(0.0),
    }
}

fn simultaneous_absence(ctx: &ScoreContext<'_>) -> MeasuredScore {
    let violations = ctx.simultaneous_absence_violations as f64;
    MeasuredScore {
        raw_value: violations,
        normalized_score: (100.0 - violations * ABSENCE_VIOLATION_PENALTY).max(0.0),
    }
}

fn overtime_effort(ctx: &ScoreContext<'_>) -> MeasuredScore {
    let hours: f64 = ctx
        .attendance
        .iter()
        .map(|record| record.overtime_hours as f64)
        .sum();
    MeasuredScore {
        raw_value: hours,
        normalized_score: (OVERTIME_BASE + hours * OVERTIME_PER_HOUR).min(100.0),
    }
}

fn work_accuracy(ctx: &ScoreContext<'_>) -> MeasuredScore {
    let scores: Vec<f64> = ctx
        .reviews
        .iter()
        .filter(|review| ctx.period.contains(review.reviewed_on))
        .map(|review| review.accuracy_score)
        .collect();
    if scores.is_empty() {
        return MeasuredScore {
            raw_value: 0.0,
            normalized_score: 50.0,
        };
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    MeasuredScore {
        raw_value: mean,
        normalized_score: mean.clamp(0.0, 100.0),
    }
}

fn backlog_management(ctx: &ScoreContext<'_>) -> MeasuredScore {
    let created: Vec<&TaskRecord> = ctx
        .tasks
        .iter()
        .filter(|task| ctx.period.contains(task.created_on))
        .collect();
    if created.is_empty() {
        return MeasuredScore {
            raw_value: 0.0,
            normalized_score: 70.0,
        };
    }
    let overdue = created
        .iter()
        .filter(|task| task.status.is_open() && task.deadline < ctx.today)
        .count() as f64;
    let overdue_pct = overdue / created.len() as f64 * 100.0;
    MeasuredScore {
        raw_value: overdue,
        normalized_score: (100.0 - overdue_pct * BACKLOG_RATIO_MULTIPLIER).max(0.0),
    }
}

fn leave_discipline(ctx: &ScoreContext<'_>) -> MeasuredScore {
    let considered: Vec<_> = ctx
        .leaves
        .iter()
        .filter(|leave| {
            !matches!(leave.status, LeaveStatus::Rejected | LeaveStatus::Cancelled)
        })
        .collect();
    if considered.is_empty() {
        return MeasuredScore {
            raw_value: 0.0,
            normalized_score: 80.0,
        };
    }
    let advance = considered.iter().filter(|leave| leave.is_advance).count() as f64;
    let emergency = considered.iter().filter(|leave| leave.is_emergency).count() as f64;
    let impact_sum: f64 = considered
        .iter()
        .map(|leave| leave.scoring_impact as f64)
        .sum();
    let score = 80.0 + advance * 5.0 + impact_sum * 10.0 - emergency * 15.0;
    MeasuredScore {
        raw_value: emergency,
        normalized_score: score.clamp(0.0, 100.0),
    }
}

fn wfh_productivity(ctx: &ScoreContext<'_>) -> MeasuredScore {
    let wfh_days: Vec<NaiveDate> = ctx
        .attendance
        .iter()
        .filter(|record| record.location_type == LocationType::WorkFromHome)
        .map(|record| record.date)
        .collect();
    if wfh_days.is_empty() {
        return MeasuredScore {
            raw_value: 0.0,
            normalized_score: 50.0,
        };
    }
    let wfh_tasks = completed_in_period(ctx)
        .filter(|task| {
            task.completed_on
                .map(|done| wfh_days.contains(&done))
                .unwrap_or(false)
        })
        .count() as f64;
    let per_day = wfh_tasks / wfh_days.len() as f64;
    MeasuredScore {
        raw_value: per_day,
        normalized_score: (per_day * 50.0).min(100.0),
    }
}

fn punctuality(ctx: &ScoreContext<'_>) -> MeasuredScore {
    let late = ctx.attendance.iter().filter(|record| record.is_late).count() as f64;
    let half_days = ctx
        .attendance
        .iter()
        .filter(|record| record.is_half_day)
        .count() as f64;
    MeasuredScore {
        raw_value: late + half_days * 2.0,
        normalized_score: (100.0 - late * LATE_ARRIVAL_PENALTY - half_days * HALF_DAY_PENALTY)
            .max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::calendar::Period;
    use crate::engine::domain::{
        AttendanceRecord, CompanyId, LeaveId, LeaveRequest, ProofStatus, TaskId, TaskReview,
        UserId,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn period() -> Period {
        "2026-06".parse().expect("valid period")
    }

    fn empty_ctx<'a>() -> ScoreContext<'a> {
        ScoreContext {
            period: period(),
            today: date(2026, 6, 30),
            working_days: 22,
            attendance: &[],
            leaves: &[],
            tasks: &[],
            reviews: &[],
            simultaneous_absence_violations: 0,
        }
    }

    fn attendance(day: u32) -> AttendanceRecord {
        AttendanceRecord {
            user_id: UserId("u1".to_string()),
            company_id: CompanyId("acme".to_string()),
            date: date(2026, 6, day),
            check_in: date(2026, 6, day).and_hms_opt(9, 0, 0),
            check_out: None,
            check_in_latitude: None,
            check_in_longitude: None,
            is_late: false,
            late_by_minutes: 0,
            is_half_day: false,
            overtime_hours: 0.0,
            geo_exit_count: 0,
            location_type: LocationType::Office,
        }
    }

    fn task(id: &str, deadline: NaiveDate, status: TaskStatus) -> TaskRecord {
        TaskRecord {
            id: TaskId(id.to_string()),
            company_id: CompanyId("acme".to_string()),
            assignee: UserId("u1".to_string()),
            title: format!("task {id}"),
            created_on: date(2026, 6, 1),
            deadline,
            status,
            completed_on: None,
            speed_score: None,
            backlog_weeks: 0.0,
            special_permission: false,
        }
    }

    fn leave(is_advance: bool, impact: f32, leave_type: LeaveType) -> LeaveRequest {
        LeaveRequest {
            id: LeaveId("l1".to_string()),
            user_id: UserId("u1".to_string()),
            company_id: CompanyId("acme".to_string()),
            leave_type,
            start_date: date(2026, 6, 10),
            end_date: date(2026, 6, 10),
            duration_days: 1,
            is_advance,
            is_emergency: !is_advance,
            scoring_impact: impact,
            proof_status: ProofStatus::NotRequired,
            status: LeaveStatus::Approved,
        }
    }

    #[test]
    fn unrecognized_parameter_degrades_to_neutral() {
        let ctx = empty_ctx();
        let measured = measure_parameter("Quantum Throughput", &ctx);
        assert_eq!(measured, MeasuredScore::neutral());
    }

    #[test]
    fn parameter_names_resolve_case_insensitively() {
        assert_eq!(
            ParameterKind::from_name("attendance consistency"),
            Some(ParameterKind::AttendanceConsistency)
        );
        assert_eq!(
            ParameterKind::from_name("  Punctuality "),
            Some(ParameterKind::Punctuality)
        );
        assert_eq!(ParameterKind::from_name("Velocity"), None);
    }

    #[test]
    fn speed_score_rewards_on_time_completion() {
        assert_eq!(task_speed_score(date(2026, 6, 10), date(2026, 6, 10)), 100.0);
        assert_eq!(task_speed_score(date(2026, 6, 10), date(2026, 6, 13)), 70.0);
        assert_eq!(task_speed_score(date(2026, 6, 10), date(2026, 7, 10)), 0.0);
    }

    #[test]
    fn attendance_consistency_caps_at_100() {
        let records: Vec<AttendanceRecord> = (1..=20)
            .map(|day| attendance(day))
            .collect();
        let mut ctx = empty_ctx();
        ctx.working_days = 20;
        ctx.attendance = &records;
        let measured = ParameterKind::AttendanceConsistency.measure(&ctx);
        assert_eq!(measured.normalized_score, 100.0);

        ctx.working_days = 10;
        let capped = ParameterKind::AttendanceConsistency.measure(&ctx);
        assert_eq!(capped.raw_value, 200.0);
        assert_eq!(capped.normalized_score, 100.0);
    }

    #[test]
    fn sick_leaves_erode_health_score() {
        let leaves = vec![
            leave(true, 0.0, LeaveType::Sick),
            leave(true, 0.0, LeaveType::Sick),
            leave(true, 0.0, LeaveType::Casual),
        ];
        let mut ctx = empty_ctx();
        ctx.leaves = &leaves;
        let measured = ParameterKind::HealthFrequency.measure(&ctx);
        assert_eq!(measured.raw_value, 2.0);
        assert_eq!(measured.normalized_score, 60.0);
    }

    #[test]
    fn absence_violations_floor_at_zero() {
        let mut ctx = empty_ctx();
        ctx.simultaneous_absence_violations = 8;
        let measured = ParameterKind::SimultaneousAbsence.measure(&ctx);
        assert_eq!(measured.normalized_score, 0.0);
    }

    #[test]
    fn overtime_scales_from_base_and_caps() {
        let mut records = vec![attendance(1), attendance(2)];
        records[0].overtime_hours = 4.0;
        records[1].overtime_hours = 6.0;
        let mut ctx = empty_ctx();
        ctx.attendance = &records;
        let measured = ParameterKind::OvertimeEffort.measure(&ctx);
        assert_eq!(measured.raw_value, 10.0);
        assert_eq!(measured.normalized_score, 65.0);

        let mut heavy = vec![attendance(1), attendance(2)];
        heavy[0].overtime_hours = 4.0;
        heavy[1].overtime_hours = 30.0;
        ctx.attendance = &heavy;
        let capped = ParameterKind::OvertimeEffort.measure(&ctx);
        assert_eq!(capped.normalized_score, 100.0);
    }

    #[test]
    fn no_reviews_defaults_to_neutral_accuracy() {
        let ctx = empty_ctx();
        let measured = ParameterKind::WorkAccuracy.measure(&ctx);
        assert_eq!(measured.normalized_score, 50.0);
    }

    #[test]
    fn review_scores_average_into_accuracy() {
        let reviews = vec![
            TaskReview {
                task_id: TaskId("t1".to_string()),
                company_id: CompanyId("acme".to_string()),
                subject: UserId("u1".to_string()),
                reviewer: UserId("mgr".to_string()),
                accuracy_score: 90.0,
                staff_agreed: true,
                reviewed_on: date(2026, 6, 5),
            },
            TaskReview {
                task_id: TaskId("t2".to_string()),
                company_id: CompanyId("acme".to_string()),
                subject: UserId("u1".to_string()),
                reviewer: UserId("mgr".to_string()),
                accuracy_score: 70.0,
                staff_agreed: false,
                reviewed_on: date(2026, 6, 12),
            },
        ];
        let mut ctx = empty_ctx();
        ctx.reviews = &reviews;
        let measured = ParameterKind::WorkAccuracy.measure(&ctx);
        assert_eq!(measured.raw_value, 80.0);
        assert_eq!(measured.normalized_score, 80.0);
    }

    #[test]
    fn backlog_defaults_without_tasks_and_penalizes_overdue() {
        let ctx = empty_ctx();
        assert_eq!(
            ParameterKind::BacklogManagement.measure(&ctx).normalized_score,
            70.0
        );

        // Two of four created tasks still open past their deadline:
        // 50% overdue, scaled by 1.5 -> 25.
        let tasks = vec![
            task("t1", date(2026, 6, 10), TaskStatus::Pending),
            task("t2", date(2026, 6, 12), TaskStatus::InProgress),
            task("t3", date(2026, 6, 20), TaskStatus::Completed),
            task("t4", date(2026, 7, 10), TaskStatus::Pending),
        ];
        let mut ctx = empty_ctx();
        ctx.tasks = &tasks;
        let measured = ParameterKind::BacklogManagement.measure(&ctx);
        assert_eq!(measured.raw_value, 2.0);
        assert_eq!(measured.normalized_score, 25.0);
    }

    #[test]
    fn leave_discipline_balances_advance_and_emergency() {
        let ctx = empty_ctx();
        assert_eq!(
            ParameterKind::LeaveDiscipline.measure(&ctx).normalized_score,
            80.0
        );

        // One advance, one penalized emergency:
        // 80 + 5 - 20 - 15 = 50.
        let leaves = vec![
            leave(true, 0.0, LeaveType::Casual),
            leave(false, -2.0, LeaveType::Casual),
        ];
        let mut ctx = empty_ctx();
        ctx.leaves = &leaves;
        let measured = ParameterKind::LeaveDiscipline.measure(&ctx);
        assert_eq!(measured.raw_value, 1.0);
        assert_eq!(measured.normalized_score, 50.0);

        // Proof approval zeroes the impact: 80 + 5 - 15 = 70.
        let neutralized = vec![
            leave(true, 0.0, LeaveType::Casual),
            leave(false, 0.0, LeaveType::Casual),
        ];
        ctx.leaves = &neutralized;
        let measured = ParameterKind::LeaveDiscipline.measure(&ctx);
        assert_eq!(measured.normalized_score, 70.0);
    }

    #[test]
    fn wfh_productivity_counts_tasks_per_wfh_day() {
        let ctx = empty_ctx();
        assert_eq!(
            ParameterKind::WfhProductivity.measure(&ctx).normalized_score,
            50.0
        );

        let mut records = vec![attendance(8), attendance(9)];
        records[0].location_type = LocationType::WorkFromHome;
        records[1].location_type = LocationType::WorkFromHome;

        let mut done = task("t1", date(2026, 6, 10), TaskStatus::Completed);
        done.completed_on = Some(date(2026, 6, 8));
        done.speed_score = Some(100.0);

        let tasks = vec![done];
        let mut ctx = empty_ctx();
        ctx.attendance = &records;
        ctx.tasks = &tasks;
        let measured = ParameterKind::WfhProductivity.measure(&ctx);
        assert_eq!(measured.raw_value, 0.5);
        assert_eq!(measured.normalized_score, 25.0);
    }

    #[test]
    fn punctuality_penalizes_late_and_half_days() {
        let mut records = vec![attendance(1), attendance(2), attendance(3)];
        records[0].is_late = true;
        records[1].is_late = true;
        records[2].is_half_day = true;
        let mut ctx = empty_ctx();
        ctx.attendance = &records;
        let measured = ParameterKind::Punctuality.measure(&ctx);
        assert_eq!(measured.raw_value, 4.0);
        assert_eq!(measured.normalized_score, 60.0);
    }

    #[test]
    fn task_completion_speed_averages_completed_tasks() {
        let ctx = empty_ctx();
        assert_eq!(
            ParameterKind::TaskCompletionSpeed.measure(&ctx).normalized_score,
            50.0
        );

        let mut early = task("t1", date(2026, 6, 10), TaskStatus::Completed);
        early.completed_on = Some(date(2026, 6, 9));
        early.speed_score = Some(100.0);
        let mut late = task("t2", date(2026, 6, 10), TaskStatus::Completed);
        late.completed_on = Some(date(2026, 6, 13));
        late.speed_score = Some(70.0);

        let tasks = vec![early, late];
        let mut ctx = empty_ctx();
        ctx.tasks = &tasks;
        let measured = ParameterKind::TaskCompletionSpeed.measure(&ctx);
        assert_eq!(measured.raw_value, 85.0);
        assert_eq!(measured.normalized_score, 85.0);
    }
}

//! CLI demos over a deterministic seeded company: attendance and leave
//! write paths exercised through the services, then a scoring pass and an
//! anomaly sweep rendered to stdout.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime, Weekday};
use clap::Args;
use workforce_ops::engine::anomaly::AnomalyReport;
use workforce_ops::engine::domain::{
    AnomalyRule, CompanyId, CompanySettings, EmployeeProfile, EmployeeRole, FenceId, FenceKind,
    GeoFence, LeaveStatus, LeaveType, ScoringFormula, ScoringParameter, Severity, TaskId,
    TaskRecord, TaskReview, TaskStatus, UserId,
};
use workforce_ops::engine::export::write_composite_csv;
use workforce_ops::engine::leave::LeaveSubmission;
use workforce_ops::engine::repository::WorkforceRepository;
use workforce_ops::engine::router::EngineState;
use workforce_ops::engine::scoring::{task_speed_score, CompositeResult, ParameterKind};
use workforce_ops::engine::{
    InMemoryReportPublisher, InMemoryWorkforceRepository, Period,
};
use workforce_ops::error::AppError;

use crate::infra::{build_engine_state, default_engine_settings, parse_date, parse_period};

const HQ_LAT: f64 = 12.9716;
const HQ_LNG: f64 = 77.5946;
const CLIENT_LAT: f64 = 12.9352;
const CLIENT_LNG: f64 = 77.6245;
const HOME_LAT: f64 = 12.9760;
const HOME_LNG: f64 = 77.5946;
const FAR_LAT: f64 = 13.0500;
const FAR_LNG: f64 = 77.7000;

type DemoState = EngineState<InMemoryWorkforceRepository, InMemoryReportPublisher>;

#[derive(Args, Debug, Default)]
pub(crate) struct PerformanceReportArgs {
    /// Scoring period (YYYY-MM). Defaults to the current month.
    #[arg(long, value_parser = parse_period)]
    pub(crate) period: Option<Period>,
    /// Write the composite table to a CSV file as well.
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Include the per-parameter breakdown for every employee.
    #[arg(long)]
    pub(crate) breakdown: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct AnomalySweepArgs {
    /// Detection date (YYYY-MM-DD). Defaults to the last seeded working day.
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Scoring period (YYYY-MM). Defaults to the current month.
    #[arg(long, value_parser = parse_period)]
    pub(crate) period: Option<Period>,
    /// Include the per-parameter breakdown in the scoring section.
    #[arg(long)]
    pub(crate) breakdown: bool,
    /// Skip the anomaly sweep portion of the demo.
    #[arg(long)]
    pub(crate) skip_anomalies: bool,
}

struct DemoCompany {
    company: CompanyId,
    period: Period,
    evaluation_date: NaiveDate,
    detection_date: NaiveDate,
}

pub(crate) fn run_performance_report(args: PerformanceReportArgs) -> Result<(), AppError> {
    let (repository, state) = demo_engine();
    let seed = seed_demo_company(&repository, &state, args.period)?;

    let results = state.performance.calculate_company(
        &seed.company,
        seed.period,
        seed.evaluation_date,
    )?;
    render_composite_results(&seed, &results, args.breakdown);

    if let Some(path) = args.csv {
        let file = std::fs::File::create(&path)?;
        write_composite_csv(file, &results)?;
        println!("\nComposite table written to {}", path.display());
    }
    Ok(())
}

pub(crate) fn run_anomaly_sweep(args: AnomalySweepArgs) -> Result<(), AppError> {
    let (repository, state) = demo_engine();
    let seed = seed_demo_company(&repository, &state, None)?;

    let date = args.date.unwrap_or(seed.detection_date);
    let report = state
        .anomalies
        .run_detection(&seed.company, date, Local::now().naive_local())?;
    render_anomaly_report(&report);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let (repository, state) = demo_engine();
    let seed = seed_demo_company(&repository, &state, args.period)?;

    println!("Workforce performance demo");
    println!(
        "Company {} scored for {} (evaluated {})",
        seed.company, seed.period, seed.evaluation_date
    );

    let results = state.performance.calculate_company(
        &seed.company,
        seed.period,
        seed.evaluation_date,
    )?;
    render_composite_results(&seed, &results, args.breakdown);

    // A second read comes from the persisted composite, not a recompute.
    let cached = state.performance.get_or_calculate(
        &seed.company,
        &UserId("ava".to_string()),
        seed.period,
        seed.evaluation_date,
    )?;
    println!(
        "\nCached lookup for ava returns the stored composite ({:.2}).",
        cached.total_score
    );

    if !args.skip_anomalies {
        let report = state.anomalies.run_detection(
            &seed.company,
            seed.detection_date,
            Local::now().naive_local(),
        )?;
        println!();
        render_anomaly_report(&report);
    }
    Ok(())
}

fn demo_engine() -> (Arc<InMemoryWorkforceRepository>, DemoState) {
    let repository = Arc::new(InMemoryWorkforceRepository::default());
    let publisher = Arc::new(InMemoryReportPublisher::default());
    let state = build_engine_state(repository.clone(), publisher, default_engine_settings());
    (repository, state)
}

fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn working_day_on_or_after(date: NaiveDate) -> NaiveDate {
    let mut day = date;
    while !is_working_day(day) {
        day += Duration::days(1);
    }
    day
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// Build the deterministic sample company: reference data seeded directly,
/// attendance and leaves routed through the engine's write paths.
fn seed_demo_company(
    repository: &Arc<InMemoryWorkforceRepository>,
    state: &DemoState,
    period: Option<Period>,
) -> Result<DemoCompany, AppError> {
    let today = Local::now().date_naive();
    let period = period.unwrap_or_else(|| Period::containing(today));
    let evaluation_date = if period.contains(today) {
        today
    } else {
        period.last_day()
    };

    let company = CompanyId("acme-consulting".to_string());

    for (user, name, role) in [
        ("ava", "Ava Iyer", EmployeeRole::Staff),
        ("noah", "Noah Fernandes", EmployeeRole::Staff),
        ("mia", "Mia Kapoor", EmployeeRole::Staff),
        ("liam", "Liam D'Souza", EmployeeRole::Manager),
        ("priya", "Priya Nair", EmployeeRole::SuperAdmin),
    ] {
        repository.seed_employee(EmployeeProfile {
            user_id: UserId(user.to_string()),
            company_id: company.clone(),
            display_name: name.to_string(),
            email: format!("{user}@acme-consulting.example"),
            role,
            is_active: true,
        });
    }

    repository.seed_company_settings(CompanySettings {
        company_id: company.clone(),
        workday_start: time(9, 0),
        workday_end: time(18, 0),
        standard_work_hours: 8.0,
        late_threshold: 3,
    });

    repository.seed_fence(GeoFence {
        id: FenceId("hq".to_string()),
        company_id: company.clone(),
        latitude: HQ_LAT,
        longitude: HQ_LNG,
        radius_m: 250.0,
        kind: FenceKind::Office,
        is_active: true,
    });
    repository.seed_fence(GeoFence {
        id: FenceId("client-alpha".to_string()),
        company_id: company.clone(),
        latitude: CLIENT_LAT,
        longitude: CLIENT_LNG,
        radius_m: 150.0,
        kind: FenceKind::ClientSite,
        is_active: true,
    });

    for (id, name, condition, severity, recipients) in [
        (
            "rule-attendance",
            "Attendance watchdog",
            "Flag low attendance and repeated late arrivals",
            Severity::High,
            vec!["ops@acme-consulting.example"],
        ),
        (
            "rule-digest",
            "Operations daily digest",
            "Send the daily anomaly digest to operations and HR",
            Severity::Medium,
            vec!["ops@acme-consulting.example", "hr@acme-consulting.example"],
        ),
    ] {
        repository.seed_rule(AnomalyRule {
            id: id.to_string(),
            company_id: company.clone(),
            name: name.to_string(),
            condition: condition.to_string(),
            severity,
            is_active: true,
            recipients: recipients.into_iter().map(str::to_string).collect(),
        });
    }

    let weights: [(ParameterKind, f32); 10] = [
        (ParameterKind::TaskCompletionSpeed, 15.0),
        (ParameterKind::AttendanceConsistency, 15.0),
        (ParameterKind::HealthFrequency, 10.0),
        (ParameterKind::SimultaneousAbsence, 5.0),
        (ParameterKind::OvertimeEffort, 10.0),
        (ParameterKind::WorkAccuracy, 10.0),
        (ParameterKind::BacklogManagement, 10.0),
        (ParameterKind::LeaveDiscipline, 5.0),
        (ParameterKind::WfhProductivity, 5.0),
        (ParameterKind::Punctuality, 15.0),
    ];
    for (index, (kind, weight)) in weights.into_iter().enumerate() {
        repository.seed_parameter(ScoringParameter {
            id: format!("param-{:02}", index + 1),
            company_id: company.clone(),
            name: kind.label().to_string(),
            weight,
            formula: ScoringFormula::HigherIsBetter,
            data_source: "operational".to_string(),
            is_active: true,
            sort_order: index as u32 + 1,
        });
    }

    // Attendance through the write path, one pattern per employee.
    let mut mia_wfh_days: Vec<NaiveDate> = Vec::new();
    let mut day = period.first_day();
    while day <= evaluation_date {
        if !is_working_day(day) {
            day += Duration::days(1);
            continue;
        }
        let dom = day.day();

        // ava: punctual, long days, an occasional client visit.
        let (lat, lng) = if dom % 9 == 0 {
            (CLIENT_LAT, CLIENT_LNG)
        } else {
            (HQ_LAT, HQ_LNG)
        };
        state
            .attendance
            .check_in(&company, &UserId("ava".to_string()), day, time(8, 55), lat, lng)?;
        state
            .attendance
            .check_out(&company, &UserId("ava".to_string()), day, time(18, 10))?;

        // noah: repeatedly late.
        let noah_in = if dom % 5 == 0 { time(9, 20) } else { time(9, 10) };
        state
            .attendance
            .check_in(&company, &UserId("noah".to_string()), day, noah_in, HQ_LAT, HQ_LNG)?;
        state
            .attendance
            .check_out(&company, &UserId("noah".to_string()), day, time(18, 0))?;

        // mia: absent some days, works from home some days, one half day.
        if dom % 7 != 0 {
            let (lat, lng) = if dom % 3 == 0 {
                (HOME_LAT, HOME_LNG)
            } else {
                (HQ_LAT, HQ_LNG)
            };
            state
                .attendance
                .check_in(&company, &UserId("mia".to_string()), day, time(9, 0), lat, lng)?;
            let out = if dom % 11 == 0 { time(12, 30) } else { time(17, 30) };
            state
                .attendance
                .check_out(&company, &UserId("mia".to_string()), day, out)?;
            if dom % 3 == 0 {
                mia_wfh_days.push(day);
            }
        }

        // liam: steady manager hours.
        state
            .attendance
            .check_in(&company, &UserId("liam".to_string()), day, time(9, 0), HQ_LAT, HQ_LNG)?;
        state
            .attendance
            .check_out(&company, &UserId("liam".to_string()), day, time(17, 0))?;

        day += Duration::days(1);
    }

    // The last seeded working day doubles as the detection date; noah's
    // tracker drops out of the fence three times that afternoon.
    let detection_date = last_working_day_on_or_before(evaluation_date, period);
    if repository
        .fetch_attendance(&company, &UserId("noah".to_string()), detection_date)
        .map_err(workforce_ops::engine::EngineError::from)?
        .is_some()
    {
        for _ in 0..3 {
            state.attendance.location_ping(
                &company,
                &UserId("noah".to_string()),
                detection_date,
                FAR_LAT,
                FAR_LNG,
            )?;
        }
    }

    seed_leaves(state, &company, period)?;
    seed_tasks_and_reviews(repository, &company, period, evaluation_date, &mia_wfh_days);

    Ok(DemoCompany {
        company,
        period,
        evaluation_date,
        detection_date,
    })
}

fn last_working_day_on_or_before(date: NaiveDate, period: Period) -> NaiveDate {
    let mut day = date;
    while !is_working_day(day) && day > period.first_day() {
        day -= Duration::days(1);
    }
    day
}

fn seed_leaves(
    state: &DemoState,
    company: &CompanyId,
    period: Period,
) -> Result<(), AppError> {
    // ava books a vacation three weeks out: advance, no penalty.
    let vacation_start = working_day_on_or_after(period.first_day() + Duration::days(20));
    let ava_leave = state.leaves.file(
        LeaveSubmission {
            company_id: company.clone(),
            user_id: UserId("ava".to_string()),
            leave_type: LeaveType::Vacation,
            start_date: vacation_start,
            end_date: vacation_start + Duration::days(2),
        },
        period.first_day(),
    )?;
    state.leaves.set_status(&ava_leave.id, LeaveStatus::Approved)?;

    // mia falls sick on two days' notice: emergency, later neutralized by proof.
    let sick_start = working_day_on_or_after(period.first_day() + Duration::days(9));
    let mia_leave = state.leaves.file(
        LeaveSubmission {
            company_id: company.clone(),
            user_id: UserId("mia".to_string()),
            leave_type: LeaveType::Sick,
            start_date: sick_start,
            end_date: sick_start,
        },
        sick_start - Duration::days(2),
    )?;
    state.leaves.set_status(&mia_leave.id, LeaveStatus::Approved)?;
    state.leaves.approve_proof(&mia_leave.id)?;

    // noah takes a next-day casual leave: emergency, penalty stands.
    let casual_start = working_day_on_or_after(period.first_day() + Duration::days(15));
    let noah_leave = state.leaves.file(
        LeaveSubmission {
            company_id: company.clone(),
            user_id: UserId("noah".to_string()),
            leave_type: LeaveType::Casual,
            start_date: casual_start,
            end_date: casual_start,
        },
        casual_start - Duration::days(1),
    )?;
    state.leaves.set_status(&noah_leave.id, LeaveStatus::Approved)?;
    Ok(())
}

fn seed_tasks_and_reviews(
    repository: &Arc<InMemoryWorkforceRepository>,
    company: &CompanyId,
    period: Period,
    evaluation_date: NaiveDate,
    mia_wfh_days: &[NaiveDate],
) {
    let start = period.first_day();
    let mut task_counter = 0;
    let mut task = |assignee: &str,
                    title: &str,
                    created: NaiveDate,
                    deadline: NaiveDate,
                    status: TaskStatus,
                    completed_on: Option<NaiveDate>,
                    special_permission: bool| {
        task_counter += 1;
        repository.seed_task(TaskRecord {
            id: TaskId(format!("task-{task_counter:03}")),
            company_id: company.clone(),
            assignee: UserId(assignee.to_string()),
            title: title.to_string(),
            created_on: created,
            deadline,
            status,
            completed_on,
            speed_score: completed_on.map(|done| task_speed_score(deadline, done)),
            backlog_weeks: 0.0,
            special_permission,
        });
    };

    // ava: everything shipped on time.
    for offset in [2i64, 6, 10] {
        let deadline = start + Duration::days(offset + 4);
        task(
            "ava",
            "Quarterly payroll reconciliation",
            start + Duration::days(offset),
            deadline,
            TaskStatus::Completed,
            Some(deadline - Duration::days(1)),
            false,
        );
    }

    // noah: delivered late, one task still open past its deadline.
    let noah_deadline = start + Duration::days(5);
    task(
        "noah",
        "Client onboarding checklist",
        start,
        noah_deadline,
        TaskStatus::Completed,
        Some(noah_deadline + Duration::days(2)),
        false,
    );
    task(
        "noah",
        "Expense audit follow-up",
        start + Duration::days(3),
        start + Duration::days(8),
        TaskStatus::Completed,
        Some(start + Duration::days(13)),
        false,
    );
    task(
        "noah",
        "Vendor contract renewal",
        start + Duration::days(4),
        evaluation_date - Duration::days(2),
        TaskStatus::InProgress,
        None,
        false,
    );

    // mia: wraps tasks up on her work-from-home days.
    for (index, wfh_day) in mia_wfh_days.iter().take(2).enumerate() {
        task(
            "mia",
            "Remote support rotation",
            start + Duration::days(index as i64),
            *wfh_day + Duration::days(2),
            TaskStatus::Completed,
            Some(*wfh_day),
            false,
        );
    }
    task(
        "mia",
        "Knowledge base refresh",
        start + Duration::days(6),
        period.last_day() + Duration::days(10),
        TaskStatus::Pending,
        None,
        false,
    );

    // liam: a backlog that trips the detector, one extension granted.
    for (index, permitted) in [(0i64, false), (1, false), (2, true)] {
        task(
            "liam",
            "Regional compliance review",
            start - Duration::days(20),
            evaluation_date - Duration::days(10 + index),
            TaskStatus::Pending,
            None,
            permitted,
        );
    }

    for (task_id, subject, score, agreed, offset) in [
        ("task-001", "ava", 92.0, true, 7i64),
        ("task-002", "ava", 88.0, true, 11),
        ("task-004", "noah", 75.0, false, 9),
    ] {
        repository.seed_review(TaskReview {
            task_id: TaskId(task_id.to_string()),
            company_id: company.clone(),
            subject: UserId(subject.to_string()),
            reviewer: UserId("liam".to_string()),
            accuracy_score: score,
            staff_agreed: agreed,
            reviewed_on: start + Duration::days(offset),
        });
    }
}

fn render_composite_results(
    seed: &DemoCompany,
    results: &[CompositeResult],
    breakdown: bool,
) {
    println!("\nComposite scores for {}", seed.period);
    let mut ordered: Vec<&CompositeResult> = results.iter().collect();
    ordered.sort_by(|a, b| {
        b.total_score
            .partial_cmp(&a.total_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for result in ordered {
        println!(
            "- {}: {:.2} -> {} (bonus {}%)",
            result.user_id, result.total_score, result.tier, result.bonus_percentage
        );
        if breakdown {
            for score in &result.breakdown {
                println!(
                    "    {} raw {:.2}, normalized {:.2}, weight {:.0}",
                    score.parameter_name, score.raw_value, score.normalized_score, score.weight
                );
            }
        }
    }
}

fn render_anomaly_report(report: &AnomalyReport) {
    println!("Anomaly report for {} on {}", report.company_id, report.date);
    println!("{}", report.summary);

    if report.details.is_empty() {
        println!("No findings.");
    } else {
        for item in &report.details {
            let affected: Vec<&str> = item
                .affected_users
                .iter()
                .map(|user| user.0.as_str())
                .collect();
            println!(
                "- [{}] {} ({})",
                item.severity.label(),
                item.title,
                if affected.is_empty() {
                    "company-wide".to_string()
                } else {
                    affected.join(", ")
                }
            );
        }
    }

    if !report.check_failures.is_empty() {
        println!("\nChecks with captured failures:");
        for failure in &report.check_failures {
            println!("- {}: {}", failure.kind.label(), failure.error);
        }
    }

    if report.sent_to.is_empty() {
        println!("No recipients configured.");
    } else {
        println!("Recipients: {}", report.sent_to.join(", "));
    }
}

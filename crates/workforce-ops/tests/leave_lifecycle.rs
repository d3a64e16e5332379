use std::sync::Arc;

use chrono::NaiveDate;
use workforce_ops::engine::domain::{
    CompanyId, LeaveId, LeaveStatus, LeaveType, ProofStatus, UserId,
};
use workforce_ops::engine::leave::{LeaveSubmission, LeaveValidationError};
use workforce_ops::engine::repository::WorkforceRepository;
use workforce_ops::engine::{
    EngineError, EngineSettings, InMemoryWorkforceRepository, LeaveService,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn company() -> CompanyId {
    CompanyId("acme".to_string())
}

fn submission(start: NaiveDate, end: NaiveDate) -> LeaveSubmission {
    LeaveSubmission {
        company_id: company(),
        user_id: UserId("ava".to_string()),
        leave_type: LeaveType::Casual,
        start_date: start,
        end_date: end,
    }
}

fn service(
    repository: &Arc<InMemoryWorkforceRepository>,
) -> LeaveService<InMemoryWorkforceRepository> {
    LeaveService::new(repository.clone(), Arc::new(EngineSettings::default()))
}

#[test]
fn seven_days_notice_files_as_advance_without_penalty() {
    let repository = Arc::new(InMemoryWorkforceRepository::default());
    let record = service(&repository)
        .file(
            submission(date(2026, 6, 8), date(2026, 6, 8)),
            date(2026, 6, 1),
        )
        .expect("filing succeeds");

    assert!(record.is_advance);
    assert!(!record.is_emergency);
    assert_eq!(record.scoring_impact, 0.0);
    assert_eq!(record.proof_status, ProofStatus::NotRequired);
    assert_eq!(record.status, LeaveStatus::Pending);
}

#[test]
fn six_days_notice_is_an_emergency_with_duration_scaled_penalty() {
    let repository = Arc::new(InMemoryWorkforceRepository::default());
    let service = service(&repository);

    // Three working days on six days' notice.
    let long = service
        .file(
            submission(date(2026, 6, 8), date(2026, 6, 10)),
            date(2026, 6, 2),
        )
        .expect("filing succeeds");
    assert!(long.is_emergency);
    assert_eq!(long.duration_days, 3);
    assert_eq!(long.scoring_impact, -2.0);
    assert_eq!(long.proof_status, ProofStatus::Pending);

    // One working day on the same notice.
    let short = service
        .file(
            submission(date(2026, 6, 9), date(2026, 6, 9)),
            date(2026, 6, 3),
        )
        .expect("filing succeeds");
    assert_eq!(short.scoring_impact, -1.0);
}

#[test]
fn invalid_ranges_are_rejected_before_persistence() {
    let repository = Arc::new(InMemoryWorkforceRepository::default());
    let service = service(&repository);

    let inverted = service.file(
        submission(date(2026, 6, 10), date(2026, 6, 8)),
        date(2026, 6, 1),
    );
    assert!(matches!(
        inverted,
        Err(EngineError::Leave(LeaveValidationError::EndBeforeStart { .. }))
    ));

    // June 6-7 2026 is a weekend.
    let weekend = service.file(
        submission(date(2026, 6, 6), date(2026, 6, 7)),
        date(2026, 6, 1),
    );
    assert!(matches!(
        weekend,
        Err(EngineError::Leave(LeaveValidationError::NoWorkingDays { .. }))
    ));
}

#[test]
fn proof_approval_neutralizes_the_penalty_but_not_the_classification() {
    let repository = Arc::new(InMemoryWorkforceRepository::default());
    let service = service(&repository);

    let filed = service
        .file(
            submission(date(2026, 6, 8), date(2026, 6, 10)),
            date(2026, 6, 5),
        )
        .expect("filing succeeds");
    assert_eq!(filed.scoring_impact, -2.0);

    let neutralized = service
        .approve_proof(&filed.id)
        .expect("proof approval succeeds");
    assert_eq!(neutralized.scoring_impact, 0.0);
    assert!(neutralized.is_emergency);
    assert!(!neutralized.is_advance);
    assert_eq!(neutralized.proof_status, ProofStatus::Approved);

    let stored = repository
        .fetch_leave(&filed.id)
        .expect("fetch succeeds")
        .expect("leave stored");
    assert_eq!(stored, neutralized);
}

#[test]
fn proof_approval_is_rejected_for_advance_leaves() {
    let repository = Arc::new(InMemoryWorkforceRepository::default());
    let service = service(&repository);

    let advance = service
        .file(
            submission(date(2026, 6, 22), date(2026, 6, 23)),
            date(2026, 6, 1),
        )
        .expect("filing succeeds");

    let result = service.approve_proof(&advance.id);
    assert!(matches!(
        result,
        Err(EngineError::Leave(LeaveValidationError::ProofNotApplicable))
    ));
}

#[test]
fn status_moves_from_pending_to_a_terminal_state_once() {
    let repository = Arc::new(InMemoryWorkforceRepository::default());
    let service = service(&repository);

    let filed = service
        .file(
            submission(date(2026, 6, 22), date(2026, 6, 23)),
            date(2026, 6, 1),
        )
        .expect("filing succeeds");

    let approved = service
        .set_status(&filed.id, LeaveStatus::Approved)
        .expect("approval succeeds");
    assert_eq!(approved.status, LeaveStatus::Approved);

    let second_transition = service.set_status(&filed.id, LeaveStatus::Cancelled);
    assert!(matches!(
        second_transition,
        Err(EngineError::Leave(LeaveValidationError::InvalidTransition { .. }))
    ));
}

#[test]
fn unknown_leave_ids_surface_not_found() {
    let repository = Arc::new(InMemoryWorkforceRepository::default());
    let result = service(&repository).approve_proof(&LeaveId("leave-999999".to_string()));
    assert!(matches!(
        result,
        Err(EngineError::Repository(
            workforce_ops::engine::repository::RepositoryError::NotFound
        ))
    ));
}

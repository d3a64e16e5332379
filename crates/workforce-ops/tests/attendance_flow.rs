use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use workforce_ops::engine::domain::{
    CompanyId, FenceId, FenceKind, GeoFence, LocationType, UserId,
};
use workforce_ops::engine::repository::RepositoryError;
use workforce_ops::engine::{
    AttendanceService, EngineError, EngineSettings, InMemoryWorkforceRepository,
};

const HQ_LAT: f64 = 12.9716;
const HQ_LNG: f64 = 77.5946;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

fn company() -> CompanyId {
    CompanyId("acme".to_string())
}

fn user() -> UserId {
    UserId("ava".to_string())
}

fn repository_with_hq_fence() -> Arc<InMemoryWorkforceRepository> {
    let repository = Arc::new(InMemoryWorkforceRepository::default());
    repository.seed_fence(GeoFence {
        id: FenceId("hq".to_string()),
        company_id: company(),
        latitude: HQ_LAT,
        longitude: HQ_LNG,
        radius_m: 250.0,
        kind: FenceKind::Office,
        is_active: true,
    });
    repository
}

fn service(
    repository: &Arc<InMemoryWorkforceRepository>,
) -> AttendanceService<InMemoryWorkforceRepository> {
    AttendanceService::new(repository.clone(), Arc::new(EngineSettings::default()))
}

#[test]
fn check_in_inside_the_fence_classifies_as_office_and_tracks_lateness() {
    let repository = repository_with_hq_fence();
    let record = service(&repository)
        .check_in(&company(), &user(), date(2026, 6, 8), time(9, 30), HQ_LAT, HQ_LNG)
        .expect("check-in succeeds");

    assert_eq!(record.location_type, LocationType::Office);
    assert!(record.is_late);
    assert_eq!(record.late_by_minutes, 30);
    assert_eq!(record.geo_exit_count, 0);
}

#[test]
fn early_check_in_is_not_late() {
    let repository = repository_with_hq_fence();
    let record = service(&repository)
        .check_in(&company(), &user(), date(2026, 6, 8), time(8, 45), HQ_LAT, HQ_LNG)
        .expect("check-in succeeds");

    assert!(!record.is_late);
    assert_eq!(record.late_by_minutes, 0);
}

#[test]
fn second_check_in_for_the_same_day_conflicts() {
    let repository = repository_with_hq_fence();
    let service = service(&repository);
    service
        .check_in(&company(), &user(), date(2026, 6, 8), time(9, 0), HQ_LAT, HQ_LNG)
        .expect("first check-in succeeds");

    let duplicate =
        service.check_in(&company(), &user(), date(2026, 6, 8), time(9, 5), HQ_LAT, HQ_LNG);
    assert!(matches!(
        duplicate,
        Err(EngineError::Repository(RepositoryError::Conflict))
    ));
}

#[test]
fn near_the_fence_is_work_from_home_and_far_away_is_unknown() {
    let repository = repository_with_hq_fence();
    let service = service(&repository);

    // ~490 m from the fence center: outside the 250 m radius, inside the
    // default 1 km work-from-home threshold.
    let wfh = service
        .check_in(&company(), &user(), date(2026, 6, 8), time(9, 0), 12.9760, HQ_LNG)
        .expect("check-in succeeds");
    assert_eq!(wfh.location_type, LocationType::WorkFromHome);

    let far = service
        .check_in(
            &company(),
            &UserId("noah".to_string()),
            date(2026, 6, 8),
            time(9, 0),
            13.05,
            77.70,
        )
        .expect("check-in succeeds");
    assert_eq!(far.location_type, LocationType::Unknown);
}

#[test]
fn check_out_derives_overtime_and_half_days() {
    let repository = repository_with_hq_fence();
    let service = service(&repository);

    service
        .check_in(&company(), &user(), date(2026, 6, 8), time(9, 0), HQ_LAT, HQ_LNG)
        .expect("check-in succeeds");
    let full_day = service
        .check_out(&company(), &user(), date(2026, 6, 8), time(19, 30))
        .expect("check-out succeeds");
    assert!((full_day.overtime_hours - 2.5).abs() < 1e-6);
    assert!(!full_day.is_half_day);

    service
        .check_in(&company(), &user(), date(2026, 6, 9), time(9, 0), HQ_LAT, HQ_LNG)
        .expect("check-in succeeds");
    let short_day = service
        .check_out(&company(), &user(), date(2026, 6, 9), time(12, 0))
        .expect("check-out succeeds");
    assert_eq!(short_day.overtime_hours, 0.0);
    assert!(short_day.is_half_day);
}

#[test]
fn check_out_without_a_record_is_not_found() {
    let repository = repository_with_hq_fence();
    let result = service(&repository).check_out(&company(), &user(), date(2026, 6, 8), time(18, 0));
    assert!(matches!(
        result,
        Err(EngineError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn pings_outside_every_zone_count_geofence_exits() {
    let repository = repository_with_hq_fence();
    let service = service(&repository);

    service
        .check_in(&company(), &user(), date(2026, 6, 8), time(9, 0), HQ_LAT, HQ_LNG)
        .expect("check-in succeeds");

    let first_exit = service
        .location_ping(&company(), &user(), date(2026, 6, 8), 13.05, 77.70)
        .expect("ping succeeds");
    assert_eq!(first_exit.geo_exit_count, 1);
    // The record keeps its last known zone.
    assert_eq!(first_exit.location_type, LocationType::Office);

    let second_exit = service
        .location_ping(&company(), &user(), date(2026, 6, 8), 13.05, 77.70)
        .expect("ping succeeds");
    assert_eq!(second_exit.geo_exit_count, 2);

    let back_inside = service
        .location_ping(&company(), &user(), date(2026, 6, 8), HQ_LAT, HQ_LNG)
        .expect("ping succeeds");
    assert_eq!(back_inside.geo_exit_count, 2);
    assert_eq!(back_inside.location_type, LocationType::Office);
}

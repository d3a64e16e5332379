//! HTTP surface for the engine's triggers, mounted by the service binary.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::json;

use super::anomaly::{AnomalyService, ReportPublisher};
use super::attendance::AttendanceService;
use super::calendar::Period;
use super::domain::{CompanyId, LeaveId, LeaveType, UserId};
use super::leave::{LeaveService, LeaveSubmission};
use super::repository::{RepositoryError, WorkforceRepository};
use super::scoring::PerformanceService;
use super::EngineError;

/// Shared handler state: the four engine services over one repository.
pub struct EngineState<R, P> {
    pub attendance: Arc<AttendanceService<R>>,
    pub leaves: Arc<LeaveService<R>>,
    pub performance: Arc<PerformanceService<R>>,
    pub anomalies: Arc<AnomalyService<R, P>>,
}

impl<R, P> Clone for EngineState<R, P> {
    fn clone(&self) -> Self {
        Self {
            attendance: self.attendance.clone(),
            leaves: self.leaves.clone(),
            performance: self.performance.clone(),
            anomalies: self.anomalies.clone(),
        }
    }
}

/// Router builder exposing the engine's triggers.
pub fn engine_router<R, P>(state: EngineState<R, P>) -> Router
where
    R: WorkforceRepository + 'static,
    P: ReportPublisher + 'static,
{
    Router::new()
        .route("/api/v1/attendance/check-in", post(check_in_handler::<R, P>))
        .route(
            "/api/v1/attendance/check-out",
            post(check_out_handler::<R, P>),
        )
        .route("/api/v1/attendance/ping", post(ping_handler::<R, P>))
        .route("/api/v1/leaves", post(file_leave_handler::<R, P>))
        .route(
            "/api/v1/leaves/:leave_id/proof-approval",
            post(approve_proof_handler::<R, P>),
        )
        .route(
            "/api/v1/companies/:company_id/performance/calculate",
            post(calculate_handler::<R, P>),
        )
        .route(
            "/api/v1/companies/:company_id/performance/:user_id/:period",
            get(performance_handler::<R, P>),
        )
        .route(
            "/api/v1/companies/:company_id/anomalies/run",
            post(anomaly_run_handler::<R, P>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckInRequest {
    company_id: String,
    user_id: String,
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    time: Option<NaiveTime>,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckOutRequest {
    company_id: String,
    user_id: String,
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    time: Option<NaiveTime>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PingRequest {
    company_id: String,
    user_id: String,
    #[serde(default)]
    date: Option<NaiveDate>,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileLeaveRequest {
    company_id: String,
    user_id: String,
    leave_type: LeaveType,
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(default)]
    today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CalculateRequest {
    period: Period,
    #[serde(default)]
    today: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AnomalyRunRequest {
    #[serde(default)]
    date: Option<NaiveDate>,
}

fn today_or_now(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

fn time_or_now(time: Option<NaiveTime>) -> NaiveTime {
    time.unwrap_or_else(|| Local::now().time())
}

fn engine_error_response(error: EngineError) -> Response {
    let status = match &error {
        EngineError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        EngineError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        EngineError::Leave(_) | EngineError::MissingCheckIn { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EngineError::Period(_) => StatusCode::BAD_REQUEST,
        EngineError::Repository(RepositoryError::Unavailable(_)) | EngineError::Publish(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

pub(crate) async fn check_in_handler<R, P>(
    State(state): State<EngineState<R, P>>,
    Json(payload): Json<CheckInRequest>,
) -> Response
where
    R: WorkforceRepository + 'static,
    P: ReportPublisher + 'static,
{
    let result = state.attendance.check_in(
        &CompanyId(payload.company_id),
        &UserId(payload.user_id),
        today_or_now(payload.date),
        time_or_now(payload.time),
        payload.latitude,
        payload.longitude,
    );
    match result {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => engine_error_response(error),
    }
}

pub(crate) async fn check_out_handler<R, P>(
    State(state): State<EngineState<R, P>>,
    Json(payload): Json<CheckOutRequest>,
) -> Response
where
    R: WorkforceRepository + 'static,
    P: ReportPublisher + 'static,
{
    let result = state.attendance.check_out(
        &CompanyId(payload.company_id),
        &UserId(payload.user_id),
        today_or_now(payload.date),
        time_or_now(payload.time),
    );
    match result {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => engine_error_response(error),
    }
}

pub(crate) async fn ping_handler<R, P>(
    State(state): State<EngineState<R, P>>,
    Json(payload): Json<PingRequest>,
) -> Response
where
    R: WorkforceRepository + 'static,
    P: ReportPublisher + 'static,
{
    let result = state.attendance.location_ping(
        &CompanyId(payload.company_id),
        &UserId(payload.user_id),
        today_or_now(payload.date),
        payload.latitude,
        payload.longitude,
    );
    match result {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => engine_error_response(error),
    }
}

pub(crate) async fn file_leave_handler<R, P>(
    State(state): State<EngineState<R, P>>,
    Json(payload): Json<FileLeaveRequest>,
) -> Response
where
    R: WorkforceRepository + 'static,
    P: ReportPublisher + 'static,
{
    let submission = LeaveSubmission {
        company_id: CompanyId(payload.company_id),
        user_id: UserId(payload.user_id),
        leave_type: payload.leave_type,
        start_date: payload.start_date,
        end_date: payload.end_date,
    };
    match state.leaves.file(submission, today_or_now(payload.today)) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => engine_error_response(error),
    }
}

pub(crate) async fn approve_proof_handler<R, P>(
    State(state): State<EngineState<R, P>>,
    Path(leave_id): Path<String>,
) -> Response
where
    R: WorkforceRepository + 'static,
    P: ReportPublisher + 'static,
{
    match state.leaves.approve_proof(&LeaveId(leave_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => engine_error_response(error),
    }
}

pub(crate) async fn calculate_handler<R, P>(
    State(state): State<EngineState<R, P>>,
    Path(company_id): Path<String>,
    Json(payload): Json<CalculateRequest>,
) -> Response
where
    R: WorkforceRepository + 'static,
    P: ReportPublisher + 'static,
{
    let result = state.performance.calculate_company(
        &CompanyId(company_id),
        payload.period,
        today_or_now(payload.today),
    );
    match result {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(error) => engine_error_response(error),
    }
}

pub(crate) async fn performance_handler<R, P>(
    State(state): State<EngineState<R, P>>,
    Path((company_id, user_id, period)): Path<(String, String, String)>,
) -> Response
where
    R: WorkforceRepository + 'static,
    P: ReportPublisher + 'static,
{
    let period: Period = match period.parse() {
        Ok(period) => period,
        Err(error) => return engine_error_response(EngineError::Period(error)),
    };
    let result = state.performance.get_or_calculate(
        &CompanyId(company_id),
        &UserId(user_id),
        period,
        today_or_now(None),
    );
    match result {
        Ok(composite) => (StatusCode::OK, Json(composite)).into_response(),
        Err(error) => engine_error_response(error),
    }
}

pub(crate) async fn anomaly_run_handler<R, P>(
    State(state): State<EngineState<R, P>>,
    Path(company_id): Path<String>,
    Json(payload): Json<AnomalyRunRequest>,
) -> Response
where
    R: WorkforceRepository + 'static,
    P: ReportPublisher + 'static,
{
    let today = today_or_now(payload.date);
    let now = Local::now().naive_local();
    match state
        .anomalies
        .run_detection(&CompanyId(company_id), today, now)
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => engine_error_response(error),
    }
}

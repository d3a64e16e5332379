use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use workforce_ops::engine::anomaly::ReportPublisher;
use workforce_ops::engine::repository::WorkforceRepository;
use workforce_ops::engine::router::EngineState;
use workforce_ops::engine::{
    AnomalyService, AttendanceService, EngineSettings, LeaveService, Period, PerformanceService,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Engine tuning used by the service and the CLI demos. Deployment-specific
/// overrides would be threaded through here.
pub(crate) fn default_engine_settings() -> EngineSettings {
    EngineSettings::default()
}

/// Wire the four engine services over a shared repository and publisher.
pub(crate) fn build_engine_state<R, P>(
    repository: Arc<R>,
    publisher: Arc<P>,
    settings: EngineSettings,
) -> EngineState<R, P>
where
    R: WorkforceRepository + 'static,
    P: ReportPublisher + 'static,
{
    let settings = Arc::new(settings);
    EngineState {
        attendance: Arc::new(AttendanceService::new(repository.clone(), settings.clone())),
        leaves: Arc::new(LeaveService::new(repository.clone(), settings.clone())),
        performance: Arc::new(PerformanceService::new(repository.clone(), settings.clone())),
        anomalies: Arc::new(AnomalyService::new(repository, publisher, settings)),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_period(raw: &str) -> Result<Period, String> {
    raw.parse::<Period>()
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM ({err})"))
}

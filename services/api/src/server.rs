use crate::cli::ServeArgs;
use crate::infra::{build_engine_state, default_engine_settings, AppState};
use crate::routes::with_engine_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use workforce_ops::config::AppConfig;
use workforce_ops::engine::{InMemoryReportPublisher, InMemoryWorkforceRepository};
use workforce_ops::error::AppError;
use workforce_ops::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryWorkforceRepository::default());
    let publisher = Arc::new(InMemoryReportPublisher::default());
    let engine_state = build_engine_state(repository, publisher, default_engine_settings());

    let app = with_engine_routes(engine_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "workforce performance engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}

use crate::cli::ServeArgs;
use crate::infra::{load_criteria, retrieval_service, AppState};
use crate::routes::with_dashboard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use kyg::config::AppConfig;
use kyg::dashboard::{start_dashboard, CsvReportGenerator, DashboardState};
use kyg::error::AppError;
use kyg::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let criteria = load_criteria(&config)?;
    let (handle, runtime) = start_dashboard(
        criteria,
        retrieval_service(config.retrieval.mock_latency),
        config.retrieval.timeout,
    );
    let dashboard = DashboardState {
        handle,
        reports: Arc::new(CsvReportGenerator),
        upload_limit: config.retrieval.max_upload_bytes,
    };

    let app = with_dashboard_routes(dashboard)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        timeout_ms = config.retrieval.timeout.as_millis() as u64,
        "know-your-grantee dashboard ready"
    );

    let served = axum::serve(listener, app).await;
    runtime.abort();
    served?;
    Ok(())
}

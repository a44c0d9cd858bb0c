use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use kyg::dashboard::{dashboard_router, DashboardState};
use serde_json::json;
use std::sync::atomic::Ordering;

pub(crate) fn with_dashboard_routes(state: DashboardState) -> Router {
    dashboard_router(state)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::retrieval_service;
    use axum::body::Body;
    use axum::http::Request;
    use kyg::dashboard::{start_dashboard, CriteriaDataset, CsvReportGenerator};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(ready: bool) -> Router {
        let criteria = Arc::new(CriteriaDataset::builtin().expect("builtin criteria"));
        let (handle, _join) = start_dashboard(
            criteria,
            retrieval_service(Duration::from_millis(10)),
            Duration::from_secs(1),
        );
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };

        with_dashboard_routes(DashboardState {
            handle,
            reports: Arc::new(CsvReportGenerator),
            upload_limit: 1024 * 1024,
        })
        .layer(Extension(state))
    }

    async fn get_status(router: Router, path: &str) -> StatusCode {
        router
            .oneshot(Request::get(path).body(Body::empty()).expect("request"))
            .await
            .expect("response")
            .status()
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        assert_eq!(get_status(app(false), "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_tracks_the_flag() {
        assert_eq!(
            get_status(app(false), "/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(get_status(app(true), "/ready").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn dashboard_routes_are_merged() {
        assert_eq!(get_status(app(true), "/").await, StatusCode::OK);
        assert_eq!(get_status(app(true), "/metrics").await, StatusCode::OK);
        assert_eq!(
            get_status(app(true), "/report/download").await,
            StatusCode::CONFLICT
        );
    }
}

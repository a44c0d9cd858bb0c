use kyg::config::AppConfig;
use kyg::dashboard::{CriteriaDataset, MockRetrievalService, RetrievalService};
use kyg::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Criteria from `KYG_CRITERIA_PATH`, or the bundled dataset.
pub(crate) fn load_criteria(config: &AppConfig) -> Result<Arc<CriteriaDataset>, AppError> {
    let dataset = CriteriaDataset::load(config.criteria_path.as_deref())?;
    Ok(Arc::new(dataset))
}

pub(crate) fn retrieval_service(latency: Duration) -> Arc<dyn RetrievalService> {
    Arc::new(MockRetrievalService::new(latency))
}

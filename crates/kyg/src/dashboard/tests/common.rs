use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::config::RetrievalConfig;
use crate::dashboard::app::{Action, RootApp};
use crate::dashboard::artifact::CsvReportGenerator;
use crate::dashboard::components::{ComponentRegistry, CriteriaDataset};
use crate::dashboard::domain::{DashboardPayload, RetrievalRequest};
use crate::dashboard::markup::{Element, Node};
use crate::dashboard::retrieval::{
    demo_payload, MockRetrievalService, RetrievalClient, RetrievalError, RetrievalService,
};
use crate::dashboard::router::DashboardState;
use crate::dashboard::runtime::{DashboardHandle, DashboardRuntime};

pub(super) const LATENCY: Duration = Duration::from_millis(2_000);
pub(super) const TIMEOUT: Duration = Duration::from_millis(10_000);

pub(super) fn registry() -> ComponentRegistry {
    let dataset = CriteriaDataset::builtin().expect("builtin criteria parse");
    ComponentRegistry::standard(Arc::new(dataset))
}

pub(super) fn app() -> RootApp {
    RootApp::new(registry())
}

pub(super) fn request() -> RetrievalRequest {
    RetrievalRequest::new("ABC Charity")
}

pub(super) fn loaded_app() -> RootApp {
    let mut app = app();
    let ticket = app.submit(request()).expect("submit accepted");
    assert!(app.resolve(ticket.generation, Ok(demo_payload())));
    app
}

pub(super) fn submit_button(app: &RootApp) -> &Element {
    app.tree()
        .find_by_id(crate::dashboard::app::SUBMIT_ID)
        .expect("submit button rendered")
}

pub(super) fn assert_submit_enabled(app: &RootApp) {
    assert!(app.submit_enabled());
    assert_eq!(app.handlers().count(Action::Submit), 1);
    assert!(!submit_button(app).has_attr("disabled"));
}

pub(super) fn element_text(element: &Element) -> String {
    Node::Element(element.clone()).text_content()
}

/// Mock service that counts how many retrievals were started.
#[derive(Default)]
pub(super) struct CountingService {
    pub(super) calls: AtomicUsize,
    inner: MockRetrievalService,
}

impl CountingService {
    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RetrievalService for CountingService {
    async fn retrieve(
        &self,
        request: RetrievalRequest,
    ) -> Result<DashboardPayload, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.retrieve(request).await
    }
}

pub(super) struct RejectingService;

#[async_trait]
impl RetrievalService for RejectingService {
    async fn retrieve(
        &self,
        _request: RetrievalRequest,
    ) -> Result<DashboardPayload, RetrievalError> {
        Err(RetrievalError::Unavailable("registry offline".to_string()))
    }
}

/// Keeps every request it receives and never resolves.
#[derive(Default)]
pub(super) struct RecordingService {
    requests: Mutex<Vec<RetrievalRequest>>,
}

impl RecordingService {
    pub(super) fn requests(&self) -> Vec<RetrievalRequest> {
        self.requests.lock().expect("requests mutex poisoned").clone()
    }
}

#[async_trait]
impl RetrievalService for RecordingService {
    async fn retrieve(
        &self,
        request: RetrievalRequest,
    ) -> Result<DashboardPayload, RetrievalError> {
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push(request);
        std::future::pending().await
    }
}

pub(super) struct HangingService;

#[async_trait]
impl RetrievalService for HangingService {
    async fn retrieve(
        &self,
        _request: RetrievalRequest,
    ) -> Result<DashboardPayload, RetrievalError> {
        std::future::pending().await
    }
}

pub(super) fn spawn_runtime(
    service: Arc<dyn RetrievalService>,
    timeout: Duration,
) -> (DashboardHandle, JoinHandle<()>) {
    DashboardRuntime::spawn(app(), RetrievalClient::new(service, timeout))
}

pub(super) fn dashboard_state(service: Arc<dyn RetrievalService>) -> DashboardState {
    dashboard_state_with_limit(service, RetrievalConfig::default().max_upload_bytes)
}

pub(super) fn dashboard_state_with_limit(
    service: Arc<dyn RetrievalService>,
    upload_limit: usize,
) -> DashboardState {
    let (handle, _join) = spawn_runtime(service, TIMEOUT);
    DashboardState {
        handle,
        reports: Arc::new(CsvReportGenerator),
        upload_limit,
    }
}

pub(super) async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

pub(super) async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

//! Know-Your-Grantee dashboard: component tree, boundary channel and the
//! retrieval state machine coordinating them.

pub mod app;
pub mod artifact;
pub mod channel;
pub mod components;
pub mod domain;
pub mod format;
pub mod markup;
pub mod retrieval;
pub mod router;
pub mod runtime;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

pub use app::{Action, Command, DashboardSnapshot, RetrievalState, RootApp};
pub use artifact::{ArtifactError, CsvReportGenerator, ReportArtifact, ReportGenerator};
pub use channel::{decode, encode, Decoded, OrderedMap};
pub use components::{
    AssessmentEngine, Component, ComponentRegistry, CriteriaDataset, CriteriaError,
    CriteriaGuide, Reporting,
};
pub use domain::{
    AssessmentItem, AssessmentTracks, CharityProfile, DashboardPayload, DetailValue,
    DocumentHandle, QaItem, Recommendation, Report, RetrievalRequest, RiskAlert, Status,
    TrackKind,
};
pub use retrieval::{
    demo_payload, MockRetrievalService, RetrievalClient, RetrievalError, RetrievalService,
};
pub use router::{dashboard_router, DashboardState};
pub use runtime::{DashboardHandle, DashboardRuntime, RuntimeError};

/// Builds the root app over the standard registry and starts its event loop.
pub fn start_dashboard(
    criteria: Arc<CriteriaDataset>,
    service: Arc<dyn RetrievalService>,
    timeout: Duration,
) -> (DashboardHandle, JoinHandle<()>) {
    let app = RootApp::new(ComponentRegistry::standard(criteria));
    let client = RetrievalClient::new(service, timeout);
    DashboardRuntime::spawn(app, client)
}

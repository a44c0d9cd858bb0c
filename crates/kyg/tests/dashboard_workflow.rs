use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kyg::dashboard::channel::{decode, encode, Decoded};
use kyg::dashboard::{
    demo_payload, start_dashboard, AssessmentTracks, ComponentRegistry, CriteriaDataset,
    DashboardPayload, MockRetrievalService, Recommendation, Report, RetrievalError,
    RetrievalRequest, RetrievalService, RetrievalState, RootApp, Status,
};

fn criteria() -> Arc<CriteriaDataset> {
    Arc::new(CriteriaDataset::builtin().expect("bundled criteria parse"))
}

struct UnknownCharity;

#[async_trait]
impl RetrievalService for UnknownCharity {
    async fn retrieve(
        &self,
        request: RetrievalRequest,
    ) -> Result<DashboardPayload, RetrievalError> {
        Err(RetrievalError::Rejected(format!(
            "no registry entry for {}",
            request.charity_identifier
        )))
    }
}

#[test]
fn root_app_walks_idle_pending_loaded() {
    let mut app = RootApp::new(ComponentRegistry::standard(criteria()));
    assert_eq!(app.state(), &RetrievalState::Idle);

    let ticket = app
        .submit(RetrievalRequest::new("ABC Charity"))
        .expect("submit accepted while idle");
    assert!(app.state().is_pending());
    assert!(!app.submit_enabled());
    assert!(app.submit(RetrievalRequest::new("ABC Charity")).is_none());

    assert!(app.resolve(ticket.generation, Ok(demo_payload())));
    let report = app.report().expect("report loaded");
    assert_eq!(report.recommendation, Recommendation::Proceed);
    assert!(app.submit_enabled());

    let html = app.document();
    assert!(html.contains("Registered"));
    assert!(html.contains("31/12/2024"));
    assert!(html.contains("Final KYG Score"));
}

#[tokio::test(start_paused = true)]
async fn running_dashboard_loads_the_mock_payload() {
    let service = Arc::new(MockRetrievalService::new(Duration::from_millis(2_000)));
    let (handle, _join) = start_dashboard(criteria(), service, Duration::from_secs(10));

    assert!(handle
        .submit(RetrievalRequest::new("ABC Charity"))
        .await
        .expect("runtime alive"));
    assert_eq!(handle.snapshot().await.expect("snapshot").state, "pending");

    tokio::time::sleep(Duration::from_millis(2_500)).await;

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.state, "loaded");
    assert!(snapshot.html.contains("kyg-assessment-engine"));
    assert!(snapshot.html.contains("Total Income: $520,000"));
}

#[tokio::test(start_paused = true)]
async fn rejected_retrieval_leaves_the_form_usable() {
    let (handle, _join) = start_dashboard(criteria(), Arc::new(UnknownCharity), Duration::from_secs(10));

    assert!(handle
        .submit(RetrievalRequest::new("Nobody Ltd"))
        .await
        .expect("runtime alive"));
    tokio::time::sleep(Duration::from_millis(10)).await;

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.state, "failed");
    assert!(snapshot.submit_enabled);
    assert_eq!(
        snapshot.error.as_deref(),
        Some("retrieval rejected: no registry entry for Nobody Ltd")
    );
    assert!(handle
        .submit(RetrievalRequest::new("ABC Charity"))
        .await
        .expect("runtime alive"));
}

#[test]
fn boundary_preserves_track_and_detail_order() {
    let payload = demo_payload();
    let decoded = decode::<AssessmentTracks>(Some(&encode(&payload.assessment_engine)));
    assert!(decoded.is_complete());

    let tracks = decoded.into_value().expect("tracks decoded");
    let keys: Vec<_> = tracks.keys().collect();
    let expected: Vec<_> = payload.assessment_engine.keys().collect();
    assert_eq!(keys, expected);
    assert_eq!(tracks, payload.assessment_engine);
}

#[test]
fn boundary_degrades_malformed_reports() {
    let partial = decode::<Report>(Some(
        r#"{"score": 12, "recommendation": "Escalate", "riskAlerts": [{"message": "x", "status": "error"}, 5]}"#,
    ));
    let report = partial.value().expect("report survives");
    assert_eq!(report.score, Report::MAX_SCORE);
    assert_eq!(report.recommendation, Recommendation::Review);
    assert_eq!(report.risk_alerts.len(), 1);
    assert_eq!(report.risk_alerts[0].status, Status::Error);
    assert_eq!(partial.issues().len(), 3);

    assert!(matches!(decode::<Report>(Some("null")), Decoded::Empty { .. }));
    assert!(matches!(decode::<Report>(None), Decoded::Empty { .. }));
}

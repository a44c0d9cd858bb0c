use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{RetrievalError, RetrievalService};
use crate::dashboard::channel::OrderedMap;
use crate::dashboard::domain::{
    AssessmentItem, AssessmentTracks, CharityProfile, DashboardPayload, DetailValue, QaItem,
    Recommendation, Report, RetrievalRequest, RiskAlert, Status, TrackKind,
};

/// Stand-in Retrieval Service resolving with a fixed payload after `latency`.
#[derive(Debug, Clone)]
pub struct MockRetrievalService {
    latency: Duration,
}

impl MockRetrievalService {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for MockRetrievalService {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

#[async_trait]
impl RetrievalService for MockRetrievalService {
    async fn retrieve(
        &self,
        request: RetrievalRequest,
    ) -> Result<DashboardPayload, RetrievalError> {
        if request.charity_identifier.trim().is_empty() {
            return Err(RetrievalError::Rejected(
                "a charity name or UEN is required".to_string(),
            ));
        }

        tracing::debug!(
            charity = %request.charity_identifier,
            documents = request.documents.len(),
            links = request.link_list().len(),
            "mock retrieval started"
        );
        tokio::time::sleep(self.latency).await;
        Ok(demo_payload())
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn item(label: &str, value: &str, status: Status, justification: &str) -> AssessmentItem {
    AssessmentItem {
        label: label.to_string(),
        value: value.to_string(),
        status,
        justification: justification.to_string(),
        details: None,
    }
}

fn details<const N: usize>(entries: [(&str, DetailValue); N]) -> Option<OrderedMap<DetailValue>> {
    Some(entries.into_iter().collect())
}

/// The canonical demonstration payload.
pub fn demo_payload() -> DashboardPayload {
    let qa_dashboard = [
        ("Registry Data", Status::Success),
        ("Financials", Status::Success),
        ("News Scan", Status::Warning),
        ("Website Scrape", Status::Success),
    ]
    .into_iter()
    .map(|(label, status)| QaItem {
        label: label.to_string(),
        status,
    })
    .collect();

    let mut tracks = AssessmentTracks::new();
    tracks.insert(
        TrackKind::Governance.key(),
        vec![
            item(
                "IPC Validity",
                "Pass",
                Status::Success,
                "IPC status is active and the expiry date has not passed.",
            ),
            item(
                "Negative News",
                "Review",
                Status::Warning,
                "Adverse media found that needs analyst confirmation.",
            ),
        ],
    );
    tracks.insert(
        TrackKind::FinancialCapability.key(),
        vec![
            AssessmentItem {
                details: details([
                    ("Total Income", DetailValue::from(520_000)),
                    ("Total Expenditure", DetailValue::from(500_000)),
                ]),
                ..item(
                    "Financial Adequacy",
                    "Pass",
                    Status::Success,
                    "Total income covers total expenditure for the latest financial year.",
                )
            },
            AssessmentItem {
                details: details([
                    ("Unrestricted Reserves", DetailValue::from(375_000)),
                    ("Monthly Expenditure", DetailValue::from(41_667)),
                    ("Ratio", DetailValue::from(9)),
                ]),
                ..item(
                    "Unrestricted Reserves",
                    "Pass",
                    Status::Success,
                    "Unrestricted reserves cover at least 3 months of operating expenditure.",
                )
            },
        ],
    );
    tracks.insert(
        TrackKind::OrganisationalCapability.key(),
        vec![
            item(
                "Board Competency",
                "Pass",
                Status::Success,
                "Board includes finance, legal and sector expertise.",
            ),
            item(
                "Staff Turnover",
                "Low",
                Status::Success,
                "Annual staff turnover is below 20%.",
            ),
        ],
    );
    tracks.insert(
        TrackKind::DonorEngagement.key(),
        vec![item(
            "Acknowledgement",
            "Found",
            Status::Success,
            "Donors are publicly acknowledged in the annual report.",
        )],
    );

    DashboardPayload {
        charity_profile: CharityProfile {
            registration_date: date(2012, 3, 15),
            charity_status: "Registered".to_string(),
            ipc_status: "Active".to_string(),
            ipc_expiry: date(2024, 12, 31),
        },
        qa_dashboard,
        assessment_engine: tracks,
        reporting: Report {
            score: 9.1,
            recommendation: Recommendation::Proceed,
            risk_alerts: vec![RiskAlert {
                message: "Negative news requires review".to_string(),
                status: Status::Warning,
            }],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn blank_identifier_is_rejected() {
        let service = MockRetrievalService::default();
        let outcome = service.retrieve(RetrievalRequest::new("   ")).await;
        assert!(matches!(outcome, Err(RetrievalError::Rejected(_))));
    }

    #[test]
    fn demo_payload_covers_every_track_in_order() {
        let payload = demo_payload();
        let keys: Vec<&str> = payload.assessment_engine.keys().collect();
        let expected: Vec<&str> = TrackKind::ordered().iter().map(|kind| kind.key()).collect();
        assert_eq!(keys, expected);
        assert_eq!(payload.qa_dashboard.len(), 4);
    }
}

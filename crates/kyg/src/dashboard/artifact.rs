//! Downloadable document for the current report.

use super::domain::{CharityProfile, Report};
use super::format::{format_date, format_score};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub file_name: String,
    pub content_type: mime::Mime,
    pub body: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("unable to write report row: {0}")]
    Csv(#[from] csv::Error),
    #[error("unable to finish report: {0}")]
    Io(#[from] std::io::Error),
}

/// External collaborator producing the report document.
pub trait ReportGenerator: Send + Sync {
    fn generate(
        &self,
        report: &Report,
        profile: Option<&CharityProfile>,
    ) -> Result<ReportArtifact, ArtifactError>;
}

/// Flat `section,label,value,status` export.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReportGenerator;

impl ReportGenerator for CsvReportGenerator {
    fn generate(
        &self,
        report: &Report,
        profile: Option<&CharityProfile>,
    ) -> Result<ReportArtifact, ArtifactError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["section", "label", "value", "status"])?;

        if let Some(profile) = profile {
            let registered = format_date(profile.registration_date);
            let expiry = format_date(profile.ipc_expiry);
            writer.write_record(["profile", "Registration Date", registered.as_str(), ""])?;
            writer.write_record(["profile", "Charity Status", profile.charity_status.as_str(), ""])?;
            writer.write_record(["profile", "IPC Status", profile.ipc_status.as_str(), ""])?;
            writer.write_record(["profile", "IPC Expiry", expiry.as_str(), ""])?;
        }

        let score = format!("{} / {}", format_score(report.score), format_score(Report::MAX_SCORE));
        writer.write_record(["summary", "Score", score.as_str(), ""])?;
        writer.write_record([
            "summary",
            "Recommendation",
            report.recommendation.label(),
            report.recommendation.style_key(),
        ])?;
        for alert in &report.risk_alerts {
            writer.write_record(["risk_alert", alert.message.as_str(), "", alert.status.class()])?;
        }

        let body = writer.into_inner().map_err(|err| err.into_error())?;
        Ok(ReportArtifact {
            file_name: "kyg-report.csv".to_string(),
            content_type: mime::TEXT_CSV,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::retrieval::demo_payload;

    #[test]
    fn csv_export_lists_summary_and_alerts() {
        let payload = demo_payload();
        let artifact = CsvReportGenerator
            .generate(&payload.reporting, Some(&payload.charity_profile))
            .expect("artifact generated");

        let body = String::from_utf8(artifact.body).expect("utf8 body");
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], "section,label,value,status");
        assert!(lines.contains(&"profile,IPC Expiry,31/12/2024,"));
        assert!(lines.contains(&"summary,Recommendation,Proceed,proceed"));
        assert!(lines.contains(&"risk_alert,Negative news requires review,,warning"));
        assert_eq!(artifact.content_type, mime::TEXT_CSV);
        assert!(lines.contains(&"summary,Score,9.1 / 10,"));
    }
}

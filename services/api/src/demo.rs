use crate::infra::{load_criteria, retrieval_service};
use clap::Args;
use kyg::config::AppConfig;
use kyg::dashboard::format::{display_track_key, format_date, format_detail, format_score};
use kyg::dashboard::{
    start_dashboard, CriteriaDataset, DashboardPayload, DashboardSnapshot, Report,
    RetrievalRequest,
};
use kyg::error::AppError;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Charity name or UEN to retrieve
    #[arg(long)]
    pub(crate) charity: String,
    /// Simulated Retrieval Service latency in milliseconds
    #[arg(long)]
    pub(crate) latency_ms: Option<u64>,
    /// Retrieval timeout in milliseconds; must be positive
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) timeout_ms: Option<u64>,
    /// Print the rendered HTML document instead of the text summary
    #[arg(long)]
    pub(crate) html: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CriteriaArgs {
    /// Criteria JSON file; defaults to KYG_CRITERIA_PATH or the bundled set
    #[arg(long)]
    pub(crate) path: Option<PathBuf>,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let latency = args
        .latency_ms
        .map(Duration::from_millis)
        .unwrap_or(config.retrieval.mock_latency);
    let timeout = args
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or(config.retrieval.timeout);

    let criteria = load_criteria(&config)?;
    let (handle, runtime) = start_dashboard(criteria, retrieval_service(latency), timeout);

    println!("Know-Your-Grantee demo");
    println!(
        "Charity: {} (latency {}ms, timeout {}ms)",
        args.charity,
        latency.as_millis(),
        timeout.as_millis()
    );

    let mut last = handle.snapshot().await?.state;
    println!("- state: {last}");

    if !handle.submit(RetrievalRequest::new(args.charity.as_str())).await? {
        println!("- submit ignored: a retrieval is already pending");
    }

    let snapshot = loop {
        let snapshot = handle.snapshot().await?;
        if snapshot.state != last {
            println!("- state: {}", snapshot.state);
            last = snapshot.state;
        }
        if snapshot.state != "pending" {
            break snapshot;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    };
    runtime.abort();

    if args.html {
        println!("{}", snapshot.html);
    } else {
        print!("{}", render_snapshot(&snapshot));
    }
    Ok(())
}

pub(crate) fn run_criteria(args: CriteriaArgs) -> Result<(), AppError> {
    let dataset = match args.path {
        Some(path) => CriteriaDataset::from_path(path)?,
        None => {
            let config = AppConfig::load()?;
            CriteriaDataset::load(config.criteria_path.as_deref())?
        }
    };
    print!("{}", render_criteria(&dataset));
    Ok(())
}

pub(crate) fn render_snapshot(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "\nRetrieval failed: {error}");
        let _ = writeln!(out, "Submit re-enabled: {}", snapshot.submit_enabled);
    }
    if let Some(payload) = &snapshot.payload {
        out.push_str(&render_payload(payload));
    }
    out
}

pub(crate) fn render_payload(payload: &DashboardPayload) -> String {
    let mut out = String::new();
    let profile = &payload.charity_profile;

    let _ = writeln!(out, "\nCharity profile");
    let _ = writeln!(
        out,
        "- Registration Date: {}",
        format_date(profile.registration_date)
    );
    let _ = writeln!(out, "- Charity Status: {}", profile.charity_status);
    let _ = writeln!(out, "- IPC Status: {}", profile.ipc_status);
    let _ = writeln!(out, "- IPC Expiry: {}", format_date(profile.ipc_expiry));

    let _ = writeln!(out, "\nAutomated data QA");
    for item in &payload.qa_dashboard {
        let _ = writeln!(out, "- {}: {}", item.label, item.status.label());
    }

    let _ = writeln!(out, "\nAssessment engine");
    for (track, items) in payload.assessment_engine.iter() {
        let _ = writeln!(out, "{}", display_track_key(track));
        for item in items {
            let _ = writeln!(
                out,
                "  - {}: {} [{}]",
                item.label,
                item.value,
                item.status.class()
            );
            for (label, value) in item.details.iter().flat_map(|details| details.iter()) {
                let _ = writeln!(out, "      {}", format_detail(label, value));
            }
        }
    }

    out.push_str(&render_report(&payload.reporting));
    out
}

fn render_report(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nReport");
    let _ = writeln!(
        out,
        "- Score: {} / {}",
        format_score(report.score),
        format_score(Report::MAX_SCORE)
    );
    let _ = writeln!(out, "- Recommendation: {}", report.recommendation.label());
    if report.risk_alerts.is_empty() {
        let _ = writeln!(out, "- No risk alerts");
    }
    for alert in &report.risk_alerts {
        let _ = writeln!(out, "- [{}] {}", alert.status.class(), alert.message);
    }
    out
}

pub(crate) fn render_criteria(dataset: &CriteriaDataset) -> String {
    let mut out = String::from("Assessment criteria\n");
    for (track, entries) in dataset.tracks() {
        let _ = writeln!(out, "\n{}", display_track_key(track));
        for entry in entries {
            let _ = writeln!(out, "- {}: {}", entry.label, entry.logic);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyg::dashboard::demo_payload;

    #[test]
    fn payload_summary_lists_profile_details_and_score() {
        let text = render_payload(&demo_payload());
        assert!(text.contains("- IPC Expiry: 31/12/2024"));
        assert!(text.contains("Financial Capability"));
        assert!(text.contains("Total Income: $520,000"));
        assert!(text.contains("- Score: 9.1 / 10"));
        assert!(text.contains("- Recommendation: Proceed"));
    }

    #[test]
    fn criteria_listing_uses_display_track_names() {
        let dataset = CriteriaDataset::builtin().expect("builtin criteria");
        let text = render_criteria(&dataset);
        assert!(text.starts_with("Assessment criteria\n"));
        assert!(text.contains("\nOrganisational Capability\n"));
    }

    #[tokio::test]
    async fn failed_snapshot_reports_the_error() {
        let criteria = std::sync::Arc::new(CriteriaDataset::builtin().expect("builtin criteria"));
        let (handle, _join) = start_dashboard(
            criteria,
            retrieval_service(Duration::from_millis(1)),
            Duration::from_secs(1),
        );
        assert!(handle
            .submit(RetrievalRequest::new("  "))
            .await
            .expect("runtime alive"));

        let snapshot = loop {
            let snapshot = handle.snapshot().await.expect("snapshot");
            if snapshot.state != "pending" {
                break snapshot;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        };

        let text = render_snapshot(&snapshot);
        assert!(text.contains("Retrieval failed: retrieval rejected: a charity name or UEN is required"));
        assert!(text.contains("Submit re-enabled: true"));
    }
}

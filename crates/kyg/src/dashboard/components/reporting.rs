use super::TypedComponent;
use crate::dashboard::channel::Decoded;
use crate::dashboard::domain::Report;
use crate::dashboard::format::format_score;
use crate::dashboard::markup::{div, span, Element, Node};

/// Route serving the generated report artifact.
pub const DOWNLOAD_PATH: &str = "/report/download";

#[derive(Debug, Clone, Copy, Default)]
pub struct Reporting;

impl Reporting {
    fn score_section(report: &Report) -> Element {
        let score = span("score").text(format_score(report.score));
        let denominator = span("score-label").text(format!("/ {}", Report::MAX_SCORE as u8));

        div("reporting-section")
            .child(Element::new("h3").text("Final KYG Score"))
            .child(
                div("score-circle")
                    .child(score)
                    .child(Node::text(" "))
                    .child(denominator),
            )
            .child(
                div(&format!(
                    "recommendation recommendation-{}",
                    report.recommendation.style_key()
                ))
                .text(report.recommendation.label()),
            )
    }

    fn alerts_section(report: &Report) -> Element {
        let section = div("reporting-section").child(Element::new("h3").text("Risk Alerts"));
        if report.risk_alerts.is_empty() {
            return section.child(div("risk-alert none").text("No risk alerts"));
        }

        section.children(report.risk_alerts.iter().map(|alert| {
            div(&format!("risk-alert {}", alert.status.class())).text(alert.message.as_str())
        }))
    }

    fn download_section() -> Element {
        div("reporting-section")
            .child(Element::new("h3").text("Download Report"))
            .child(
                Element::new("a")
                    .with_class("btn")
                    .with_attr("href", DOWNLOAD_PATH)
                    .with_flag("download", true)
                    .text("Download Report"),
            )
    }
}

impl TypedComponent for Reporting {
    const TAG: &'static str = "kyg-reporting";
    type Input = Report;

    fn render_decoded(&self, input: &Decoded<Report>) -> Vec<Node> {
        let Some(report) = input.value() else {
            return Vec::new();
        };

        vec![div("reporting-grid")
            .child(Self::score_section(report))
            .child(Self::alerts_section(report))
            .child(Self::download_section())
            .into()]
    }
}

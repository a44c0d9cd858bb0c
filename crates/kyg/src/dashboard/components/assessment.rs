use super::TypedComponent;
use crate::dashboard::channel::{Decoded, OrderedMap};
use crate::dashboard::domain::{AssessmentItem, AssessmentTracks, DetailValue};
use crate::dashboard::format::{display_track_key, format_detail};
use crate::dashboard::markup::{div, span, Element, Node};

/// Per-track list of evaluated items. Pure function of its payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssessmentEngine;

impl AssessmentEngine {
    fn render_track(key: &str, items: &[AssessmentItem]) -> Element {
        div("assessment-track")
            .with_attr("data-track", key)
            .child(Element::new("h3").text(display_track_key(key)))
            .children(items.iter().map(Self::render_item))
    }

    fn render_item(item: &AssessmentItem) -> Element {
        let mut label = span("assessment-label").text(item.label.as_str());
        if !item.justification.is_empty() {
            label = label.child(
                span("justification")
                    .with_attr("tabindex", "0")
                    .with_attr("aria-label", "Show justification")
                    .child(
                        span("justification-text")
                            .with_attr("role", "tooltip")
                            .text(item.justification.as_str()),
                    ),
            );
        }

        let value = span(&format!("assessment-value status {}", item.status.class()))
            .text(item.value.as_str());

        let mut row = div("assessment-item").child(label).child(value);
        if let Some(details) = item.details.as_ref().filter(|details| !details.is_empty()) {
            row = row.child(Self::render_details(details));
        }
        row
    }

    fn render_details(details: &OrderedMap<DetailValue>) -> Element {
        div("assessment-details").children(
            details
                .iter()
                .map(|(label, value)| span("detail-line").text(format_detail(label, value))),
        )
    }
}

impl TypedComponent for AssessmentEngine {
    const TAG: &'static str = "kyg-assessment-engine";
    type Input = AssessmentTracks;

    fn render_decoded(&self, input: &Decoded<AssessmentTracks>) -> Vec<Node> {
        let Some(tracks) = input.value() else {
            return Vec::new();
        };

        let grid = div("assessment-grid")
            .with_attr(
                "data-decode",
                if input.is_complete() { "complete" } else { "partial" },
            )
            .children(
                tracks
                    .iter()
                    .map(|(key, items)| Self::render_track(key, items)),
            );
        vec![grid.into()]
    }
}

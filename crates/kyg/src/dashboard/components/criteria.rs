use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Component;
use crate::dashboard::channel::OrderedMap;
use crate::dashboard::format::display_track_key;
use crate::dashboard::markup::{div, span, Element, Node};

const BUILTIN_CRITERIA: &str = include_str!("../../../assets/criteria.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaEntry {
    pub label: String,
    pub logic: String,
}

/// Per-track pass/fail explanations, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriteriaDataset {
    tracks: OrderedMap<Vec<CriteriaEntry>>,
}

impl CriteriaDataset {
    /// Dataset compiled into the binary.
    pub fn builtin() -> Result<Self, CriteriaError> {
        Self::from_json(BUILTIN_CRITERIA)
    }

    pub fn from_json(raw: &str) -> Result<Self, CriteriaError> {
        let dataset: Self = serde_json::from_str(raw)?;
        if dataset.tracks.is_empty() {
            return Err(CriteriaError::Empty);
        }
        Ok(dataset)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CriteriaError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Loads `path` when given, otherwise the built-in dataset.
    pub fn load(path: Option<&Path>) -> Result<Self, CriteriaError> {
        match path {
            Some(path) => {
                let dataset = Self::from_path(path)?;
                tracing::info!(path = %path.display(), tracks = dataset.tracks.len(), "criteria dataset loaded");
                Ok(dataset)
            }
            None => Self::builtin(),
        }
    }

    pub fn tracks(&self) -> impl Iterator<Item = (&str, &[CriteriaEntry])> {
        self.tracks
            .iter()
            .map(|(key, entries)| (key, entries.as_slice()))
    }

    pub fn entries(&self, track: &str) -> Option<&[CriteriaEntry]> {
        self.tracks.get(track).map(Vec::as_slice)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CriteriaError {
    #[error("unable to read criteria dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("criteria dataset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("criteria dataset defines no tracks")]
    Empty,
}

/// Read-only reference of the pass/fail logic per track.
#[derive(Debug, Clone)]
pub struct CriteriaGuide {
    dataset: Arc<CriteriaDataset>,
}

impl CriteriaGuide {
    pub const TAG: &'static str = "kyg-criteria-guide";

    pub fn new(dataset: Arc<CriteriaDataset>) -> Self {
        Self { dataset }
    }

    fn render_track(key: &str, entries: &[CriteriaEntry]) -> Element {
        let items = entries.iter().map(|entry| {
            div("criteria-item")
                .child(span("criteria-label").text(entry.label.as_str()))
                .child(Element::new("p").with_class("criteria-logic").text(entry.logic.as_str()))
        });

        div("criteria-track")
            .with_attr("data-track", key)
            .child(Element::new("h3").text(display_track_key(key)))
            .children(items)
    }
}

impl Component for CriteriaGuide {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    /// The payload is ignored: the dataset is injected at construction.
    fn render(&self, _payload: Option<&str>) -> Vec<Node> {
        let tracks = self
            .dataset
            .tracks()
            .map(|(key, entries)| Self::render_track(key, entries));

        vec![div("criteria-guide")
            .child(Element::new("h2").text("Assessment Criteria"))
            .children(tracks)
            .into()]
    }
}

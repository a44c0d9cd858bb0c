use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::channel::OrderedMap;

/// Outcome vocabulary shared by QA items, assessment items and risk alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Warning,
    Error,
    /// Any value outside the known vocabulary; rendered structurally.
    #[serde(other)]
    Unknown,
}

impl Status {
    pub const fn ordered() -> [Self; 3] {
        [Self::Success, Self::Warning, Self::Error]
    }

    /// Styling key used as the element class.
    pub const fn class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Unknown => "Unknown",
        }
    }
}

/// The four assessment tracks known at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Governance,
    FinancialCapability,
    OrganisationalCapability,
    DonorEngagement,
}

impl TrackKind {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Governance,
            Self::FinancialCapability,
            Self::OrganisationalCapability,
            Self::DonorEngagement,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Governance => "governance",
            Self::FinancialCapability => "financialCapability",
            Self::OrganisationalCapability => "organisationalCapability",
            Self::DonorEngagement => "donorEngagement",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ordered().into_iter().find(|kind| kind.key() == key)
    }
}

/// Registry facts returned by the Retrieval Service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharityProfile {
    #[serde(with = "display_date")]
    pub registration_date: NaiveDate,
    pub charity_status: String,
    pub ipc_status: String,
    #[serde(with = "display_date")]
    pub ipc_expiry: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaItem {
    pub label: String,
    pub status: Status,
}

/// Value carried by a detail entry: a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    Number(serde_json::Number),
    Text(String),
}

impl DetailValue {
    pub fn number(value: f64) -> Option<Self> {
        serde_json::Number::from_f64(value).map(Self::Number)
    }
}

impl From<i64> for DetailValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for DetailValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentItem {
    pub label: String,
    pub value: String,
    pub status: Status,
    #[serde(default)]
    pub justification: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<OrderedMap<DetailValue>>,
}

/// Track key to ordered items, in payload order.
pub type AssessmentTracks = OrderedMap<Vec<AssessmentItem>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Proceed,
    Review,
    Reject,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Proceed => "Proceed",
            Self::Review => "Review",
            Self::Reject => "Reject",
        }
    }

    /// Lower-cased value used as the badge styling key.
    pub const fn style_key(self) -> &'static str {
        match self {
            Self::Proceed => "proceed",
            Self::Review => "review",
            Self::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAlert {
    pub message: String,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub score: f64,
    pub recommendation: Recommendation,
    #[serde(default)]
    pub risk_alerts: Vec<RiskAlert>,
}

impl Report {
    pub const MAX_SCORE: f64 = 10.0;
}

/// Everything one retrieval produces; replaced wholesale on the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    pub charity_profile: CharityProfile,
    pub qa_dashboard: Vec<QaItem>,
    pub assessment_engine: AssessmentTracks,
    pub reporting: Report,
}

/// Reference to a supporting document supplied with the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHandle {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub size: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalRequest {
    pub charity_identifier: String,
    #[serde(default)]
    pub documents: Vec<DocumentHandle>,
    #[serde(default)]
    pub links: String,
}

impl RetrievalRequest {
    pub fn new(charity_identifier: impl Into<String>) -> Self {
        Self {
            charity_identifier: charity_identifier.into(),
            ..Self::default()
        }
    }

    /// Non-blank lines of the free-text links field.
    pub fn link_list(&self) -> Vec<&str> {
        self.links
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

pub(crate) mod display_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) const FORMAT: &str = "%d/%m/%Y";

    pub(crate) fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(raw.trim(), FORMAT).map_err(|err| {
            serde::de::Error::custom(format!("failed to parse '{raw}' as DD/MM/YYYY ({err})"))
        })
    }
}

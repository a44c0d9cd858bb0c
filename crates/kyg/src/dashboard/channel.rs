//! Serialized data passing across component boundaries.
//!
//! A parent attaches a JSON text payload to a child's instantiation point;
//! the child decodes it here. Decoding never fails the render pass: absent or
//! unparsable payloads yield [`Decoded::Empty`], element-level schema gaps are
//! dropped or degraded and reported through [`Decoded::Partial`].

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::domain::{
    AssessmentItem, AssessmentTracks, Recommendation, Report, RiskAlert, Status,
};

/// JSON object whose key order is kept in both directions.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces, keeping the original position of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedMap<V>
where
    K: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = OrderedMap::new();
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

/// Result of decoding a boundary payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    Complete(T),
    Partial { value: T, issues: Vec<String> },
    Empty { reason: String },
}

impl<T> Decoded<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Complete(value) | Self::Partial { value, .. } => Some(value),
            Self::Empty { .. } => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Complete(value) | Self::Partial { value, .. } => Some(value),
            Self::Empty { .. } => None,
        }
    }

    pub fn issues(&self) -> &[String] {
        match self {
            Self::Partial { issues, .. } => issues,
            _ => &[],
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    fn from_parts(value: T, issues: Vec<String>) -> Self {
        if issues.is_empty() {
            Self::Complete(value)
        } else {
            Self::Partial { value, issues }
        }
    }
}

/// Payload types that can cross a component boundary.
pub trait BoundaryPayload: Serialize + Sized {
    /// Lenient decode of an already parsed JSON document.
    fn decode_value(value: Value) -> Decoded<Self>;
}

/// Encodes a payload as the text attached to a child's instantiation point.
pub fn encode<T: Serialize>(payload: &T) -> String {
    // Serializing plain data with string keys cannot fail.
    serde_json::to_string(payload).unwrap_or_else(|_| "null".to_string())
}

/// Decodes an attribute payload; `None` models a missing attribute.
pub fn decode<T: BoundaryPayload>(raw: Option<&str>) -> Decoded<T> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Decoded::Empty {
            reason: "payload missing".to_string(),
        };
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) => Decoded::Empty {
            reason: "payload is null".to_string(),
        },
        Ok(value) => {
            let decoded = T::decode_value(value);
            if let Decoded::Partial { issues, .. } = &decoded {
                tracing::warn!(issues = issues.len(), "component payload partially decoded");
            }
            decoded
        }
        Err(err) => {
            tracing::warn!(error = %err, "component payload unparsable");
            Decoded::Empty {
                reason: format!("payload unparsable: {err}"),
            }
        }
    }
}

impl BoundaryPayload for AssessmentTracks {
    fn decode_value(value: Value) -> Decoded<Self> {
        let Value::Object(object) = value else {
            return Decoded::Empty {
                reason: "assessment payload is not an object".to_string(),
            };
        };

        let mut issues = Vec::new();
        let mut tracks = AssessmentTracks::new();
        for (key, items) in object {
            let Value::Array(items) = items else {
                issues.push(format!("track '{key}' is not a list"));
                continue;
            };

            let mut decoded_items = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                let raw_status = raw_status(&item);
                match serde_json::from_value::<AssessmentItem>(item) {
                    Ok(item) => {
                        if item.status == Status::Unknown {
                            issues.push(format!(
                                "track '{key}' item {index} has unrecognised status {raw_status}"
                            ));
                        }
                        decoded_items.push(item);
                    }
                    Err(err) => issues.push(format!("track '{key}' item {index} dropped: {err}")),
                }
            }
            tracks.insert(key, decoded_items);
        }

        Decoded::from_parts(tracks, issues)
    }
}

impl BoundaryPayload for Report {
    fn decode_value(value: Value) -> Decoded<Self> {
        let Value::Object(mut object) = value else {
            return Decoded::Empty {
                reason: "report payload is not an object".to_string(),
            };
        };

        let mut issues = Vec::new();

        let score = match object.remove("score").as_ref().and_then(Value::as_f64) {
            Some(score) if (0.0..=Report::MAX_SCORE).contains(&score) => score,
            Some(score) => {
                issues.push(format!("score {score} outside 0-10, clamped"));
                score.clamp(0.0, Report::MAX_SCORE)
            }
            None => {
                return Decoded::Empty {
                    reason: "report score missing".to_string(),
                }
            }
        };

        let recommendation = match object.remove("recommendation") {
            Some(value) => match serde_json::from_value::<Recommendation>(value.clone()) {
                Ok(recommendation) => recommendation,
                Err(_) => {
                    issues.push(format!("unrecognised recommendation {value}, shown as Review"));
                    Recommendation::Review
                }
            },
            None => {
                issues.push("recommendation missing, shown as Review".to_string());
                Recommendation::Review
            }
        };

        let mut risk_alerts = Vec::new();
        match object.remove("riskAlerts") {
            Some(Value::Array(alerts)) => {
                for (index, alert) in alerts.into_iter().enumerate() {
                    let raw_status = raw_status(&alert);
                    match serde_json::from_value::<RiskAlert>(alert) {
                        Ok(alert) => {
                            if alert.status == Status::Unknown {
                                issues.push(format!(
                                    "risk alert {index} has unrecognised status {raw_status}"
                                ));
                            }
                            risk_alerts.push(alert);
                        }
                        Err(err) => issues.push(format!("risk alert {index} dropped: {err}")),
                    }
                }
            }
            Some(Value::Null) | None => {}
            Some(_) => issues.push("riskAlerts is not a list".to_string()),
        }

        Decoded::from_parts(
            Report {
                score,
                recommendation,
                risk_alerts,
            },
            issues,
        )
    }
}

/// Status text as received, for issue messages.
fn raw_status(value: &Value) -> String {
    value
        .get("status")
        .map(Value::to_string)
        .unwrap_or_else(|| "null".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::domain::DetailValue;
    use serde_json::json;

    fn sample_tracks() -> AssessmentTracks {
        let details: OrderedMap<DetailValue> = [
            ("Total Income", DetailValue::from(520_000)),
            ("Total Expenditure", DetailValue::from(500_000)),
            ("Ratio", DetailValue::number(1.04).expect("finite")),
            ("Source", DetailValue::from("Audited FY2023")),
        ]
        .into_iter()
        .collect();

        [
            (
                "financialCapability",
                vec![AssessmentItem {
                    label: "Financial Adequacy".to_string(),
                    value: "Pass".to_string(),
                    status: Status::Success,
                    justification: "Income covers expenditure".to_string(),
                    details: Some(details),
                }],
            ),
            ("governance", Vec::new()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn ordered_map_keeps_document_order() {
        let map: OrderedMap<i32> =
            serde_json::from_str(r#"{"zeta":1,"alpha":2,"mid":3}"#).expect("map parses");
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(
            serde_json::to_string(&map).expect("map encodes"),
            r#"{"zeta":1,"alpha":2,"mid":3}"#
        );
    }

    #[test]
    fn tracks_survive_the_boundary_unchanged() {
        let tracks = sample_tracks();
        let decoded = decode::<AssessmentTracks>(Some(&encode(&tracks)));
        assert_eq!(decoded, Decoded::Complete(tracks));
    }

    #[test]
    fn report_survives_the_boundary_unchanged() {
        let report = Report {
            score: 9.1,
            recommendation: Recommendation::Proceed,
            risk_alerts: vec![RiskAlert {
                message: "Negative news requires review".to_string(),
                status: Status::Warning,
            }],
        };
        let decoded = decode::<Report>(Some(&encode(&report)));
        assert_eq!(decoded, Decoded::Complete(report));
    }

    #[test]
    fn missing_or_broken_payloads_decode_empty() {
        assert!(decode::<Report>(None).is_empty());
        assert!(decode::<Report>(Some("  ")).is_empty());
        assert!(decode::<Report>(Some("null")).is_empty());
        assert!(decode::<Report>(Some("{\"score\": 9.1")).is_empty());
        assert!(decode::<AssessmentTracks>(Some("[1,2,3]")).is_empty());
    }

    #[test]
    fn malformed_items_are_dropped_and_reported() {
        let raw = json!({
            "governance": [
                { "label": "IPC Validity", "value": "Pass", "status": "success" },
                { "label": "Broken" }
            ],
            "donorEngagement": "not a list"
        })
        .to_string();

        let decoded = decode::<AssessmentTracks>(Some(&raw));
        let Decoded::Partial { value, issues } = decoded else {
            panic!("expected partial decode");
        };
        assert_eq!(value.len(), 1);
        assert_eq!(value.get("governance").map(Vec::len), Some(1));
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn out_of_range_score_is_clamped_with_issue() {
        let raw = json!({ "score": 14.5, "recommendation": "Proceed", "riskAlerts": [] });
        let decoded = decode::<Report>(Some(&raw.to_string()));
        assert_eq!(decoded.value().map(|report| report.score), Some(10.0));
        assert_eq!(decoded.issues().len(), 1);
    }

    #[test]
    fn unknown_recommendation_degrades_to_review() {
        let raw = json!({ "score": 5.0, "recommendation": "Escalate" });
        let decoded = decode::<Report>(Some(&raw.to_string()));
        let report = decoded.value().expect("report present");
        assert_eq!(report.recommendation, Recommendation::Review);
        assert!(report.risk_alerts.is_empty());
        assert!(!decoded.is_complete());
    }

    #[test]
    fn unrecognised_item_status_is_reported() {
        let raw = json!({
            "governance": [
                { "label": "IPC Validity", "value": "Pass", "status": "stale" }
            ]
        })
        .to_string();

        let decoded = decode::<AssessmentTracks>(Some(&raw));
        assert!(!decoded.is_complete());
        assert_eq!(
            decoded.issues(),
            ["track 'governance' item 0 has unrecognised status \"stale\"".to_string()]
        );
        let tracks = decoded.value().expect("tracks present");
        assert_eq!(tracks.get("governance").expect("track kept")[0].status, Status::Unknown);
    }

    #[test]
    fn unrecognised_alert_status_is_reported() {
        let raw = json!({
            "score": 6.0,
            "recommendation": "Review",
            "riskAlerts": [{ "message": "Adverse filing", "status": "critical" }]
        });
        let decoded = decode::<Report>(Some(&raw.to_string()));
        assert_eq!(
            decoded.issues(),
            ["risk alert 0 has unrecognised status \"critical\"".to_string()]
        );
        let report = decoded.value().expect("report present");
        assert_eq!(report.risk_alerts[0].status, Status::Unknown);
    }
}

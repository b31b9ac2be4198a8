use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

pub type JsonObject = Map<String, Value>;

pub const ANOMALY_CURVE: &str = "anomaly_curve";
pub const EVENT_TIMELINE: &str = "event_timeline";
pub const DRAFT_REPORT: &str = "draft_report";
pub const CONSISTENCY_CHECK: &str = "consistency_check";
pub const FINAL_REPORT: &str = "final_report";

pub const RESULT_KEYS: [&str; 5] = [
    ANOMALY_CURVE,
    EVENT_TIMELINE,
    DRAFT_REPORT,
    CONSISTENCY_CHECK,
    FINAL_REPORT,
];

#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyPoint {
    pub t: String,
    pub score: f64,
}

impl AnomalyPoint {
    fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_object()?;
        Some(Self {
            t: label_of(record.get("t")?)?,
            score: record.get("score")?.as_f64()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEvent {
    pub t: String,
    pub event: String,
    pub confidence: f64,
}

impl TimelineEvent {
    fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_object()?;
        Some(Self {
            t: label_of(record.get("t")?)?,
            event: record.get("event")?.as_str()?.to_string(),
            confidence: record.get("confidence")?.as_f64()?,
        })
    }
}

fn label_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `null` counts as missing. A value of the wrong shape is kept verbatim in
/// `Malformed` so the renderer can still show it.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Missing,
    Present(T),
    Malformed(Value),
}

impl<T> Field<T> {
    pub fn present(&self) -> Option<&T> {
        match self {
            Field::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Field::Missing)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    document: JsonObject,
    anomaly_curve: Field<Vec<AnomalyPoint>>,
    event_timeline: Field<Vec<TimelineEvent>>,
    draft_report: Field<String>,
    consistency_check: Field<String>,
    final_report: Field<String>,
}

impl AnalysisResult {
    pub fn from_object(document: JsonObject) -> Self {
        let anomaly_curve = records_field(document.get(ANOMALY_CURVE), AnomalyPoint::from_value);
        let event_timeline =
            records_field(document.get(EVENT_TIMELINE), TimelineEvent::from_value);
        let draft_report = text_field(document.get(DRAFT_REPORT));
        let consistency_check = text_field(document.get(CONSISTENCY_CHECK));
        let final_report = text_field(document.get(FINAL_REPORT));
        Self {
            document,
            anomaly_curve,
            event_timeline,
            draft_report,
            consistency_check,
            final_report,
        }
    }

    pub fn document(&self) -> &JsonObject {
        &self.document
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.document.clone())
    }

    pub fn anomaly_curve(&self) -> &Field<Vec<AnomalyPoint>> {
        &self.anomaly_curve
    }

    pub fn event_timeline(&self) -> &Field<Vec<TimelineEvent>> {
        &self.event_timeline
    }

    pub fn draft_report(&self) -> &Field<String> {
        &self.draft_report
    }

    pub fn consistency_check(&self) -> &Field<String> {
        &self.consistency_check
    }

    pub fn final_report(&self) -> &Field<String> {
        &self.final_report
    }

    pub fn extra_keys(&self) -> Vec<&str> {
        self.document
            .keys()
            .map(String::as_str)
            .filter(|key| !RESULT_KEYS.contains(key))
            .collect()
    }

    /// Highest-scoring point of the curve; the earliest one wins a tie.
    pub fn peak_anomaly(&self) -> Option<&AnomalyPoint> {
        self.anomaly_curve
            .present()?
            .iter()
            .fold(None, |best: Option<&AnomalyPoint>, point| match best {
                Some(current) if current.score >= point.score => Some(current),
                _ => Some(point),
            })
    }
}

fn records_field<T>(value: Option<&Value>, parse: fn(&Value) -> Option<T>) -> Field<Vec<T>> {
    match value {
        None | Some(Value::Null) => Field::Missing,
        Some(Value::Array(items)) => items
            .iter()
            .map(parse)
            .collect::<Option<Vec<T>>>()
            .map(Field::Present)
            .unwrap_or_else(|| Field::Malformed(Value::Array(items.clone()))),
        Some(other) => Field::Malformed(other.clone()),
    }
}

fn text_field(value: Option<&Value>) -> Field<String> {
    match value {
        None | Some(Value::Null) => Field::Missing,
        Some(Value::String(s)) => Field::Present(s.clone()),
        Some(other) => Field::Malformed(other.clone()),
    }
}

impl Serialize for AnalysisResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.document.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AnalysisResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        JsonObject::deserialize(deserializer).map(Self::from_object)
    }
}

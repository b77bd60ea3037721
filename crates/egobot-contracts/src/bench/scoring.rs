use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One labeled benchmark input, as stored in a dataset file.
///
/// Field decoding never rejects a case: a bad `mode` or `image` surfaces
/// later as that case's error row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default, deserialize_with = "optional_text")]
    pub test_id: Option<String>,
    #[serde(default = "default_mode", deserialize_with = "lenient_text")]
    pub mode: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub image: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub expected: Map<String, Value>,
}

impl TestCase {
    pub fn id_or_index(&self, index: usize) -> String {
        self.test_id
            .clone()
            .unwrap_or_else(|| format!("test_{index}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Pass,
    Fail,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMatch {
    pub expected: Value,
    pub actual: Value,
    #[serde(rename = "match")]
    pub matched: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub all_match: bool,
    pub details: IndexMap<String, KeyMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaseDetail {
    Scored {
        matches: Comparison,
        elapsed_sec: f64,
        parsed: Option<Map<String, Value>>,
        expected: Map<String, Value>,
    },
    Errored {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    pub test_id: String,
    pub mode: String,
    pub status: CaseStatus,
    #[serde(flatten)]
    pub detail: CaseDetail,
}

impl CaseResult {
    pub fn scored(
        test_id: impl Into<String>,
        mode: impl Into<String>,
        matches: Comparison,
        elapsed_sec: f64,
        parsed: Option<Map<String, Value>>,
        expected: Map<String, Value>,
    ) -> Self {
        let status = if matches.all_match {
            CaseStatus::Pass
        } else {
            CaseStatus::Fail
        };
        Self {
            test_id: test_id.into(),
            mode: mode.into(),
            status,
            detail: CaseDetail::Scored {
                matches,
                elapsed_sec: round_to(elapsed_sec, 2),
                parsed,
                expected,
            },
        }
    }

    pub fn errored(
        test_id: impl Into<String>,
        mode: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            mode: mode.into(),
            status: CaseStatus::Error,
            detail: CaseDetail::Errored {
                error: error.into(),
            },
        }
    }

    pub fn elapsed_sec(&self) -> Option<f64> {
        match &self.detail {
            CaseDetail::Scored { elapsed_sec, .. } => Some(*elapsed_sec),
            CaseDetail::Errored { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub accuracy: f64,
    pub avg_latency_sec: f64,
}

/// Scores a structured payload against the expected key/value pairs.
///
/// With no payload (or an empty one) or no expectations, the case matches
/// only when nothing was expected.
pub fn compare(parsed: Option<&Map<String, Value>>, expected: &Map<String, Value>) -> Comparison {
    let parsed = match parsed {
        Some(parsed) if !parsed.is_empty() && !expected.is_empty() => parsed,
        _ => {
            return Comparison {
                all_match: expected.is_empty(),
                details: IndexMap::new(),
            }
        }
    };

    let mut details = IndexMap::new();
    let mut all_match = true;
    for (key, expected_value) in expected {
        let actual = parsed.get(key).cloned().unwrap_or(Value::Null);
        let matched = values_match(expected_value, &actual);
        if !matched {
            all_match = false;
        }
        details.insert(
            key.clone(),
            KeyMatch {
                expected: expected_value.clone(),
                actual,
                matched,
            },
        );
    }
    Comparison { all_match, details }
}

fn values_match(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Bool(want), Value::Bool(got)) => want == got,
        (Value::Bool(_), _) => false,
        (Value::String(want), _) => {
            normalize_text(&value_text(actual)) == normalize_text(want)
        }
        (Value::Number(want), Value::Number(got)) => match (want.as_f64(), got.as_f64()) {
            (Some(want), Some(got)) => want == got,
            _ => want == got,
        },
        _ => expected == actual,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "none".to_string(),
        other => other.to_string(),
    }
}

fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

pub fn summarize(results: &[CaseResult]) -> BenchmarkSummary {
    let total = results.len();
    let count = |status: CaseStatus| results.iter().filter(|row| row.status == status).count();
    let passed = count(CaseStatus::Pass);
    let failed = count(CaseStatus::Fail);
    let errors = count(CaseStatus::Error);

    let elapsed: Vec<f64> = results.iter().filter_map(CaseResult::elapsed_sec).collect();
    let avg_latency_sec = if elapsed.is_empty() {
        0.0
    } else {
        elapsed.iter().sum::<f64>() / elapsed.len() as f64
    };
    let accuracy = if total > 0 {
        passed as f64 / total as f64
    } else {
        0.0
    };

    BenchmarkSummary {
        total,
        passed,
        failed,
        errors,
        accuracy: round_to(accuracy, 4),
        avg_latency_sec: round_to(avg_latency_sec, 2),
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn default_mode() -> String {
    "social".to_string()
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        other => Some(value_text(&other)),
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(&Value::deserialize(deserializer)?))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

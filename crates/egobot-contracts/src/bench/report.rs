use std::path::Path;

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::scoring::{BenchmarkSummary, CaseResult};

pub const REPORT_FILE_NAME: &str = "benchmark_results.json";

pub fn write_report(
    path: &Path,
    summary: &BenchmarkSummary,
    results: &[CaseResult],
) -> anyhow::Result<Value> {
    let mut payload = Map::new();
    payload.insert(
        "run_id".to_string(),
        Value::String(uuid::Uuid::new_v4().to_string()),
    );
    payload.insert("ts".to_string(), Value::String(now_utc_iso()));
    payload.insert("summary".to_string(), serde_json::to_value(summary)?);
    payload.insert("results".to_string(), serde_json::to_value(results)?);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let payload = Value::Object(payload);
    std::fs::write(path, serde_json::to_string_pretty(&payload)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(payload)
}

fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use super::{write_report, REPORT_FILE_NAME};
    use crate::bench::{compare, summarize, CaseResult};

    #[test]
    fn write_report_generates_expected_payload() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join(REPORT_FILE_NAME);

        let mut parsed = Map::new();
        parsed.insert("intent".to_string(), json!("handover"));
        let mut expected = Map::new();
        expected.insert("intent".to_string(), json!("Handover"));
        let results = vec![
            CaseResult::scored(
                "wave",
                "social",
                compare(Some(&parsed), &expected),
                0.5,
                Some(parsed.clone()),
                expected,
            ),
            CaseResult::errored("test_1", "safety", "image not found"),
        ];
        let summary = summarize(&results);
        let written = write_report(&path, &summary, &results)?;

        let parsed_file: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(parsed_file, written);
        assert_eq!(parsed_file["summary"]["total"], json!(2));
        assert_eq!(parsed_file["summary"]["passed"], json!(1));
        assert_eq!(parsed_file["results"][0]["status"], json!("pass"));
        assert_eq!(
            parsed_file["results"][0]["matches"]["details"]["intent"]["match"],
            json!(true)
        );
        assert_eq!(parsed_file["results"][1]["error"], json!("image not found"));
        assert!(parsed_file.get("ts").and_then(Value::as_str).is_some());
        assert!(parsed_file.get("run_id").and_then(Value::as_str).is_some());
        Ok(())
    }
}

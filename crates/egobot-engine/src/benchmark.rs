use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use egobot_contracts::bench::{
    compare, summarize, write_report, BenchmarkSummary, CaseResult, TestCase, REPORT_FILE_NAME,
};
use tracing::{info, warn};

use crate::config::Config;
use crate::engine::ReasoningEngine;
use crate::error::{EgobotError, Result};

pub struct BenchmarkRunner {
    engine: ReasoningEngine,
}

impl BenchmarkRunner {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::from_engine(ReasoningEngine::new(config)?))
    }

    pub fn from_engine(engine: ReasoningEngine) -> Self {
        Self { engine }
    }

    pub fn load_test_cases(dataset_path: &Path) -> Result<Vec<TestCase>> {
        if !dataset_path.exists() {
            return Err(EgobotError::DatasetNotFound(dataset_path.to_path_buf()));
        }
        let raw = fs::read_to_string(dataset_path).map_err(|err| EgobotError::Dataset {
            path: dataset_path.to_path_buf(),
            message: err.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|err| EgobotError::Dataset {
            path: dataset_path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Runs every case in order and scores it. A failing case becomes an
    /// error row and the loop moves on.
    pub fn run_cases(&self, cases: &[TestCase]) -> Vec<CaseResult> {
        cases
            .iter()
            .enumerate()
            .map(|(idx, case)| self.run_case(idx, case))
            .collect()
    }

    pub fn run(&self, cases: &[TestCase], output_dir: &Path) -> Result<BenchmarkSummary> {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("failed to create {}", output_dir.display()))
            .map_err(EgobotError::Report)?;

        let results = self.run_cases(cases);
        let summary = summarize(&results);
        let report_path = output_dir.join(REPORT_FILE_NAME);
        write_report(&report_path, &summary, &results).map_err(EgobotError::Report)?;
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            errors = summary.errors,
            report = %report_path.display(),
            "benchmark finished"
        );
        Ok(summary)
    }

    fn run_case(&self, idx: usize, case: &TestCase) -> CaseResult {
        let test_id = case.id_or_index(idx);
        let started = Instant::now();
        match self.engine.analyze_image(Path::new(&case.image), &case.mode) {
            Ok(result) => {
                let elapsed = started.elapsed().as_secs_f64();
                let matches = compare(result.parsed.as_ref(), &case.expected);
                CaseResult::scored(
                    test_id,
                    case.mode.clone(),
                    matches,
                    elapsed,
                    result.parsed,
                    case.expected.clone(),
                )
            }
            Err(err) => {
                warn!(test_id = %test_id, mode = %case.mode, error = %err, "benchmark case failed");
                CaseResult::errored(test_id, case.mode.clone(), err.chain_text())
            }
        }
    }
}

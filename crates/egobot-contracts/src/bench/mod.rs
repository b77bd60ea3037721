mod report;
mod scoring;

pub use report::{write_report, REPORT_FILE_NAME};
pub use scoring::{
    compare, summarize, BenchmarkSummary, CaseDetail, CaseResult, CaseStatus, Comparison,
    KeyMatch, TestCase,
};

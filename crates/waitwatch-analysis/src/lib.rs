pub mod error;
pub mod merged;
pub mod preprocess;
pub mod report;

pub use error::AnalysisError;
pub use merged::MergedRow;
pub use preprocess::{
    preprocess, read_processed, run_preprocessing, summary_stats, write_processed,
    CleaningReport, Preprocessed, SummaryStats,
};
pub use report::{generate_report, run_report, AnalysisSummary, ChartOutcome, Report};

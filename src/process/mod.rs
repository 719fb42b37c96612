// src/process/mod.rs
pub mod header;
pub mod reorder;
pub mod utils;

pub use header::HeaderReplacer;
pub use reorder::ColumnReorderer;

/// Raw school export read by the reorder step.
pub const RAW_SCHOOL_CSV: &str = "src/data/school.csv";
/// Output of the reorder step, input of the header step.
pub const FIXED_SCHOOL_CSV: &str = "fixed-school.csv";
/// Final file, ready for upload.
pub const UPLOAD_READY_CSV: &str = "school-upload-ready.csv";

/// Row counts for one transform run. The header row is counted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransformStats {
    pub rows_read: u64,
    pub rows_written: u64,
    pub rows_skipped: u64,
}

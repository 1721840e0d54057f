use codemap_chunker::SourceFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics about a parse run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParseSummary {
    /// Number of files scanned
    pub total_files: usize,

    /// Files whose text was extracted
    pub parsed: usize,

    /// Files that failed to parse
    pub failed: usize,

    /// Non-blank lines across parsed files
    pub total_lines: usize,

    /// File count per extension
    pub by_type: BTreeMap<String, usize>,

    /// Parse failures as `filename: reason`
    pub errors: Vec<String>,
}

impl ParseSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, file: &SourceFile) {
        self.total_files += 1;
        let file_type = file.file_type.clone().unwrap_or_else(|| "unknown".to_string());
        *self.by_type.entry(file_type).or_insert(0) += 1;

        if file.success {
            self.parsed += 1;
            self.total_lines += file.stats.lines;
        } else {
            self.failed += 1;
            self.errors.push(format!(
                "{}: {}",
                file.filename,
                file.error.as_deref().unwrap_or("unknown error")
            ));
        }
    }

    pub fn from_files(files: &[SourceFile]) -> Self {
        let mut summary = Self::new();
        for file in files {
            summary.add_file(file);
        }
        summary
    }
}

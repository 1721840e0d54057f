use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Structured analysis of one file, as returned by the completion service.
///
/// Only `fileDescription` and `mainPurpose` are required; omitted `dependencies`,
/// `keyFunctionality` and `technicalDetails` parse as empty values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub file_description: String,
    pub main_purpose: String,
    #[serde(default)]
    pub dependencies: Dependencies,
    #[serde(default)]
    pub key_functionality: Vec<String>,
    #[serde(default)]
    pub technical_details: TechnicalDetails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Dependencies {
    /// Imported packages and modules
    pub imports: Vec<String>,
    /// Other project files this file uses
    pub referenced_files: Vec<String>,
    /// External services or APIs
    pub external_dependencies: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TechnicalDetails {
    pub language: String,
    pub framework: Option<String>,
    /// Role of the file (component, utility, route, ...)
    #[serde(rename = "type")]
    pub kind: String,
}

/// Why a file did not get an analysis
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ParsingFailed,
    NoChunks,
    AnalysisFailed,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::ParsingFailed => "parsing_failed",
            SkipReason::NoChunks => "no_chunks",
            SkipReason::AnalysisFailed => "analysis_failed",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file that could not be analysed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: SkipReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SkippedFile {
    pub fn new(filename: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            filename: filename.into(),
            reason,
            error: None,
        }
    }

    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn detail(&self) -> SkipDetail {
        SkipDetail {
            reason: self.reason,
            error: self.error.clone(),
        }
    }
}

/// Value of the `skippedFiles` map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkipDetail {
    pub reason: SkipReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A successfully analysed file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileAnalysis {
    pub filename: String,
    pub analysis: AnalysisResult,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub total_files: usize,
    pub analyzed_files: usize,
    pub skipped_files: usize,
}

/// Project-level report of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnalysis {
    pub summary: ProjectSummary,
    pub files: BTreeMap<String, AnalysisResult>,
    pub skipped_files: BTreeMap<String, SkipDetail>,
    pub timestamp: DateTime<Utc>,
}

impl ProjectAnalysis {
    /// One `references` edge per referenced file of every analysed file
    pub fn relationships(&self) -> Vec<FileRelationship> {
        self.files
            .iter()
            .flat_map(|(source, analysis)| {
                analysis
                    .dependencies
                    .referenced_files
                    .iter()
                    .map(move |target| FileRelationship::references(source, target))
            })
            .collect()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.files.contains_key(filename) || self.skipped_files.contains_key(filename)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    References,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct FileRelationship {
    pub source_file: String,
    pub target_file: String,
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
}

impl FileRelationship {
    pub fn references(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_file: source.into(),
            target_file: target.into(),
            kind: RelationshipKind::References,
        }
    }
}

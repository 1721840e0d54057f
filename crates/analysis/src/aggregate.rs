use crate::types::{
    FileAnalysis, FileRelationship, ProjectAnalysis, ProjectSummary, SkippedFile,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Folds per-file outcomes into one project report
pub struct ProjectAggregator;

impl ProjectAggregator {
    /// Build the project report, stamped with the current time
    pub fn aggregate(
        unique_files: usize,
        successes: Vec<FileAnalysis>,
        skips: Vec<SkippedFile>,
    ) -> ProjectAnalysis {
        Self::aggregate_at(unique_files, successes, skips, Utc::now())
    }

    pub fn aggregate_at(
        unique_files: usize,
        successes: Vec<FileAnalysis>,
        skips: Vec<SkippedFile>,
        timestamp: DateTime<Utc>,
    ) -> ProjectAnalysis {
        let summary = ProjectSummary {
            total_files: unique_files,
            analyzed_files: successes.len(),
            skipped_files: skips.len(),
        };

        let skipped_files = skips
            .iter()
            .map(|skip| (skip.filename.clone(), skip.detail()))
            .collect();
        let files: BTreeMap<_, _> = successes
            .into_iter()
            .map(|success| (success.filename, success.analysis))
            .collect();

        log::info!(
            "Project analysis: {} files, {} analyzed, {} skipped",
            summary.total_files,
            summary.analyzed_files,
            summary.skipped_files
        );

        ProjectAnalysis {
            summary,
            files,
            skipped_files,
            timestamp,
        }
    }

    /// `references` edges derived from the successes' referenced files
    pub fn relationships(successes: &[FileAnalysis]) -> Vec<FileRelationship> {
        successes
            .iter()
            .flat_map(|success| {
                success
                    .analysis
                    .dependencies
                    .referenced_files
                    .iter()
                    .map(|target| FileRelationship::references(&success.filename, target))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalysisResult, SkipReason};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn success(filename: &str, references: &[&str]) -> FileAnalysis {
        let mut analysis = AnalysisResult {
            file_description: format!("{filename} description"),
            main_purpose: "purpose".to_string(),
            ..Default::default()
        };
        analysis.dependencies.referenced_files =
            references.iter().map(|r| r.to_string()).collect();
        FileAnalysis {
            filename: filename.to_string(),
            analysis,
        }
    }

    #[test]
    fn test_aggregate_partitions_files() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let project = ProjectAggregator::aggregate_at(
            3,
            vec![success("a.js", &[]), success("c.js", &["a.js"])],
            vec![SkippedFile::new("b.bin", SkipReason::ParsingFailed)],
            at,
        );

        assert_eq!(
            project.summary,
            ProjectSummary {
                total_files: 3,
                analyzed_files: 2,
                skipped_files: 1
            }
        );
        assert_eq!(project.files.len(), 2);
        assert_eq!(project.skipped_files["b.bin"].reason, SkipReason::ParsingFailed);
        assert!(["a.js", "b.bin", "c.js"].iter().all(|f| project.contains(f)));

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["timestamp"], "2024-05-01T12:00:00Z");
        assert_eq!(json["summary"]["analyzedFiles"], 2);
        assert_eq!(json["skippedFiles"]["b.bin"]["reason"], "parsing_failed");
    }

    #[test]
    fn test_empty_run() {
        let project = ProjectAggregator::aggregate(0, Vec::new(), Vec::new());
        assert_eq!(project.summary, ProjectSummary::default());
        assert!(project.files.is_empty());
    }

    #[test]
    fn test_relationships_match_project_view() {
        let successes = vec![
            success("pages/index.js", &["lib/api.js", "components/Nav.js"]),
            success("lib/api.js", &[]),
        ];
        let edges = ProjectAggregator::relationships(&successes);
        let project = ProjectAggregator::aggregate(2, successes, Vec::new());

        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0], FileRelationship::references("pages/index.js", "lib/api.js"));
        assert_eq!(project.relationships().len(), 2);
    }
}

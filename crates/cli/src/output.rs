use codemap_analysis::{FileRelationship, ProjectAnalysis};
use codemap_chunker::{Chunk, ChunkingStats, SourceFile};
use codemap_graph::{DependencyMap, FileTreeNode};
use codemap_scanner::ParseSummary;
use serde::{Deserialize, Serialize};

/// Input of `analyze --payload`: parsed files, optionally with pre-computed chunks
#[derive(Debug, Deserialize)]
pub struct AnalyzePayload {
    pub files: Vec<SourceFile>,
    #[serde(default)]
    pub chunks: Option<Vec<Chunk>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkOutput {
    pub summary: ParseSummary,
    pub stats: ChunkingStats,
    pub chunks: Vec<Chunk>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOutput {
    #[serde(flatten)]
    pub analysis: ProjectAnalysis,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Vec<FileRelationship>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_tree: Option<FileTreeNode>,
}

impl AnalyzeOutput {
    pub fn new(analysis: ProjectAnalysis, with_relationships: bool) -> Self {
        if !with_relationships {
            return Self {
                analysis,
                relationships: None,
                dependency_tree: None,
            };
        }

        let map = DependencyMap::from_analysis(&analysis);
        let external = map.external_files();
        if !external.is_empty() {
            log::debug!("Unresolved references: {}", external.join(", "));
        }
        Self {
            relationships: Some(map.relationships()),
            dependency_tree: Some(map.forest()),
            analysis,
        }
    }
}

//! # Codemap Analysis
//!
//! Drives a language-model completion service over a project's chunked files and folds the
//! per-file answers into one [`ProjectAnalysis`].
//!
//! ## Pipeline
//!
//! ```text
//! files + chunks
//!     │
//!     ├──> ChunkIndex (chunks per filename)
//!     │
//!     ├──> BatchScheduler
//!     │      ├─> dedup by filename, pre-filter (parsing_failed / no_chunks)
//!     │      └─> batches of `batch_size` concurrent FileAnalyzer calls
//!     │             └─> CompletionService + retry/backoff (deadline aware)
//!     │
//!     └──> ProjectAggregator
//!            └─> ProjectAnalysis { summary, files, skippedFiles, timestamp }
//! ```
//!
//! Per-file failures become skipped entries; only a timeout or an unreachable service fails a
//! whole run.
//!
//! ## Example
//!
//! ```no_run
//! use codemap_analysis::{AnalysisConfig, AnalysisPipeline, OpenAiCompletionService, OpenAiConfig};
//! use codemap_chunker::SourceFile;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = OpenAiCompletionService::new(OpenAiConfig {
//!         api_key: std::env::var("OPENAI_API_KEY").ok(),
//!         ..OpenAiConfig::default()
//!     })?;
//!     let pipeline = AnalysisPipeline::new(AnalysisConfig::default(), Arc::new(service))?;
//!
//!     let files = vec![SourceFile::new("1", "src/app.js", "JavaScript", "run();\n")];
//!     let analysis = pipeline.run_files(&files).await?;
//!     println!("{}", serde_json::to_string_pretty(&analysis)?);
//!     Ok(())
//! }
//! ```

mod aggregate;
mod analyzer;
mod completion;
mod error;
mod openai;
mod pipeline;
mod prompt;
mod retry;
mod scheduler;
mod types;

pub use aggregate::ProjectAggregator;
pub use analyzer::{join_chunks, FileAnalyzer};
pub use completion::{
    CompletionError, CompletionRequest, CompletionService, ErrorKind, TerminalKind,
    TransientKind,
};
pub use error::{AnalysisError, PipelineError, Result};
pub use openai::{OpenAiCompletionService, OpenAiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use pipeline::{AnalysisConfig, AnalysisPipeline, PipelineState, DEFAULT_TIMEOUT_SECS};
pub use prompt::{render_prompt, RESPONSE_FORMAT};
pub use retry::RetryPolicy;
pub use scheduler::{dedup_by_filename, BatchOutcome, BatchScheduler, SchedulingMode, DEFAULT_BATCH_SIZE};
pub use types::{
    AnalysisResult, Dependencies, FileAnalysis, FileRelationship, ProjectAnalysis,
    ProjectSummary, RelationshipKind, SkipDetail, SkipReason, SkippedFile, TechnicalDetails,
};

use crate::aggregate::ProjectAggregator;
use crate::analyzer::FileAnalyzer;
use crate::completion::CompletionService;
use crate::error::{PipelineError, Result};
use crate::retry::RetryPolicy;
use crate::scheduler::{dedup_by_filename, BatchScheduler, SchedulingMode, DEFAULT_BATCH_SIZE};
use crate::types::ProjectAnalysis;
use codemap_chunker::{Chunk, ChunkIndex, Chunker, ChunkerConfig, SourceFile};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Tunables of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub chunker: ChunkerConfig,
    /// Files analysed concurrently
    pub batch_size: usize,
    /// Overall deadline for a run
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
    pub mode: SchedulingMode,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            chunker: ChunkerConfig::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
            mode: SchedulingMode::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        self.chunker.validate()?;
        self.retry.validate()?;
        if self.batch_size == 0 {
            return Err("batch_size must be > 0".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}

/// Where a pipeline run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Chunking,
    Analyzing { batch: usize, batches: usize },
    Aggregated,
    Failed,
}

impl PipelineState {
    pub fn is_running(self) -> bool {
        matches!(self, PipelineState::Chunking | PipelineState::Analyzing { .. })
    }
}

/// Holds the running state of one run; dropping it unsettled marks the run failed
struct RunGuard<'a> {
    state: &'a watch::Sender<PipelineState>,
    settled: bool,
}

impl RunGuard<'_> {
    fn finish(mut self, result: Result<ProjectAnalysis>) -> Result<ProjectAnalysis> {
        match &result {
            Ok(_) => self.state.send_replace(PipelineState::Aggregated),
            Err(e) => {
                log::error!("Project analysis failed: {e}");
                self.state.send_replace(PipelineState::Failed)
            }
        };
        self.settled = true;
        result
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            log::warn!("Project analysis cancelled");
            self.state.send_replace(PipelineState::Failed);
        }
    }
}

/// Chunk → analyse → aggregate, under one overall deadline
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    chunker: Chunker,
    service: Arc<dyn CompletionService>,
    state: watch::Sender<PipelineState>,
}

impl AnalysisPipeline {
    pub fn new(config: AnalysisConfig, service: Arc<dyn CompletionService>) -> Result<Self> {
        config.validate().map_err(PipelineError::InvalidConfig)?;
        let chunker = Chunker::new(config.chunker.clone())?;
        let (state, _) = watch::channel(PipelineState::Idle);
        Ok(Self {
            config,
            chunker,
            service,
            state,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    /// Watch state transitions of every run
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Chunk `files` with the configured chunker, then analyse them.
    ///
    /// Only the last occurrence of a duplicated filename is chunked.
    pub async fn run_files(&self, files: &[SourceFile]) -> Result<ProjectAnalysis> {
        let guard = self.begin()?;
        let unique: Vec<SourceFile> = dedup_by_filename(files).into_iter().cloned().collect();
        let chunks = self.chunker.chunk_files(&unique);
        guard.finish(self.analyze(files, chunks).await)
    }

    /// Analyse `files` using pre-computed `chunks`
    pub async fn run(&self, files: &[SourceFile], chunks: Vec<Chunk>) -> Result<ProjectAnalysis> {
        let guard = self.begin()?;
        guard.finish(self.analyze(files, chunks).await)
    }

    fn begin(&self) -> Result<RunGuard<'_>> {
        let mut started = false;
        self.state.send_if_modified(|state| {
            if state.is_running() {
                return false;
            }
            *state = PipelineState::Chunking;
            started = true;
            true
        });
        if started {
            Ok(RunGuard {
                state: &self.state,
                settled: false,
            })
        } else {
            Err(PipelineError::Busy)
        }
    }

    async fn analyze(&self, files: &[SourceFile], chunks: Vec<Chunk>) -> Result<ProjectAnalysis> {
        let timeout = self.config.timeout();
        let deadline = Instant::now() + timeout;
        let index = ChunkIndex::build(chunks);
        log::info!(
            "Starting project analysis: {} files, {} chunks, deadline {timeout:?}",
            files.len(),
            index.chunk_count()
        );

        let analyzer = Arc::new(FileAnalyzer::new(
            Arc::clone(&self.service),
            self.config.retry,
        ));
        let scheduler =
            BatchScheduler::new(analyzer, self.config.batch_size).with_mode(self.config.mode);

        let run = async {
            self.service
                .ready()
                .await
                .map_err(PipelineError::ServiceUnavailable)?;
            scheduler
                .run_with_progress(files, &index, Some(deadline), |batch, batches| {
                    self.state
                        .send_replace(PipelineState::Analyzing { batch, batches });
                })
                .await
                .map_err(|e| {
                    if e.is_deadline() {
                        PipelineError::Timeout(timeout)
                    } else {
                        PipelineError::Scheduler(e)
                    }
                })
        };

        // Dropping the scheduler future on expiry aborts its in-flight tasks.
        let outcome = tokio::time::timeout_at(deadline, run)
            .await
            .map_err(|_| PipelineError::Timeout(timeout))??;

        Ok(ProjectAggregator::aggregate(
            outcome.unique_files,
            outcome.successes,
            outcome.skips,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.batch_size, 15);
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert_eq!(config.chunker.chunk_size, 800);
        assert_eq!(config.chunker.chunk_overlap, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_partial_toml_like_json() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"batch_size": 4, "mode": "pooled"}"#).unwrap();
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.mode, SchedulingMode::Pooled);
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig {
            batch_size: 0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            chunker: ChunkerConfig::with_size(10, 20),
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_state_serializes_tagged() {
        let value = serde_json::to_value(PipelineState::Analyzing {
            batch: 2,
            batches: 3,
        })
        .unwrap();
        assert_eq!(
            value,
            serde_json::json!({"state": "analyzing", "batch": 2, "batches": 3})
        );
        assert!(!PipelineState::Aggregated.is_running());
    }
}

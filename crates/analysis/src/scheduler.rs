use crate::analyzer::FileAnalyzer;
use crate::error::AnalysisError;
use crate::types::{AnalysisResult, FileAnalysis, SkipReason, SkippedFile};
use codemap_chunker::{Chunk, ChunkIndex, SourceFile};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

pub const DEFAULT_BATCH_SIZE: usize = 15;

/// How eligible files are fanned out to the analyzer
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingMode {
    /// Fixed batches; a batch fully settles before the next one starts
    #[default]
    Batched,
    /// One pool bounded by a semaphore of `batch_size` permits
    Pooled,
}

/// Everything a scheduler run produced
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Number of distinct filenames in the input
    pub unique_files: usize,
    pub successes: Vec<FileAnalysis>,
    pub skips: Vec<SkippedFile>,
}

type TaskOutput = (String, Result<AnalysisResult, AnalysisError>);

/// Deduplicates files, pre-filters them and runs their analyses with bounded concurrency
pub struct BatchScheduler {
    analyzer: Arc<FileAnalyzer>,
    batch_size: usize,
    mode: SchedulingMode,
}

impl BatchScheduler {
    pub fn new(analyzer: Arc<FileAnalyzer>, batch_size: usize) -> Self {
        Self {
            analyzer,
            batch_size: batch_size.max(1),
            mode: SchedulingMode::Batched,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: SchedulingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Analyse `files` using the chunks in `index`
    pub async fn run(
        &self,
        files: &[SourceFile],
        index: &ChunkIndex,
        deadline: Option<Instant>,
    ) -> Result<BatchOutcome, AnalysisError> {
        self.run_with_progress(files, index, deadline, |_, _| {})
            .await
    }

    /// Like [`run`](Self::run), calling `on_batch(batch, batches)` before each batch starts.
    ///
    /// A [`AnalysisError::DeadlineExceeded`] from any file aborts the whole run; in-flight tasks
    /// are cancelled and nothing is returned.
    pub async fn run_with_progress<F>(
        &self,
        files: &[SourceFile],
        index: &ChunkIndex,
        deadline: Option<Instant>,
        mut on_batch: F,
    ) -> Result<BatchOutcome, AnalysisError>
    where
        F: FnMut(usize, usize) + Send,
    {
        let unique = dedup_by_filename(files);
        log::info!(
            "Analyzing project: {} files, {} unique",
            files.len(),
            unique.len()
        );

        let mut outcome = BatchOutcome {
            unique_files: unique.len(),
            ..BatchOutcome::default()
        };

        let mut eligible: Vec<(SourceFile, Vec<Chunk>)> = Vec::new();
        for file in unique {
            if !file.success {
                log::debug!("Skipping {} - parsing was not successful", file.filename);
                outcome
                    .skips
                    .push(SkippedFile::new(&file.filename, SkipReason::ParsingFailed));
                continue;
            }

            let chunks = chunks_of(index, file);
            if chunks.is_empty() {
                log::debug!("Skipping {} - no chunks found", file.filename);
                outcome
                    .skips
                    .push(SkippedFile::new(&file.filename, SkipReason::NoChunks));
                continue;
            }

            eligible.push((file.clone(), chunks));
        }

        match self.mode {
            SchedulingMode::Batched => {
                let batches = eligible.len().div_ceil(self.batch_size);
                let mut remaining = eligible.into_iter();
                for batch in 1..=batches {
                    on_batch(batch, batches);
                    log::info!("Processing batch {batch} of {batches}");
                    let work: Vec<_> = remaining.by_ref().take(self.batch_size).collect();
                    self.settle(work, None, deadline, &mut outcome).await?;
                    log::info!(
                        "Completed batch {batch}: {} analyzed, {} skipped so far",
                        outcome.successes.len(),
                        outcome.skips.len()
                    );
                }
            }
            SchedulingMode::Pooled => {
                if !eligible.is_empty() {
                    on_batch(1, 1);
                    let permits = Arc::new(Semaphore::new(self.batch_size));
                    self.settle(eligible, Some(permits), deadline, &mut outcome)
                        .await?;
                }
            }
        }

        log::info!(
            "Analysis finished: {} analyzed, {} skipped",
            outcome.successes.len(),
            outcome.skips.len()
        );
        Ok(outcome)
    }

    /// Run every item of `work` concurrently and wait for all of them
    async fn settle(
        &self,
        work: Vec<(SourceFile, Vec<Chunk>)>,
        permits: Option<Arc<Semaphore>>,
        deadline: Option<Instant>,
        outcome: &mut BatchOutcome,
    ) -> Result<(), AnalysisError> {
        let mut pending: HashSet<String> = HashSet::with_capacity(work.len());
        let mut tasks: JoinSet<TaskOutput> = JoinSet::new();

        for (file, chunks) in work {
            pending.insert(file.filename.clone());
            let analyzer = Arc::clone(&self.analyzer);
            let permits = permits.clone();
            tasks.spawn(async move {
                let _permit = match permits {
                    Some(permits) => match permits.acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(_) => return (file.filename, Err(AnalysisError::Cancelled)),
                    },
                    None => None,
                };
                let result = analyzer.analyze(&file, &chunks, deadline).await;
                (file.filename, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (filename, result) = match joined {
                Ok(output) => output,
                Err(e) => {
                    log::warn!("Analysis task failed: {e}");
                    continue;
                }
            };
            pending.remove(&filename);

            match result {
                Ok(analysis) => outcome.successes.push(FileAnalysis { filename, analysis }),
                Err(e) if e.is_deadline() => return Err(e),
                Err(e) => {
                    log::warn!("Failed to analyze {filename}: {e}");
                    outcome.skips.push(
                        SkippedFile::new(filename, SkipReason::AnalysisFailed)
                            .with_error(e.to_string()),
                    );
                }
            }
        }

        // Whatever is still pending belongs to a task that panicked.
        let mut lost: Vec<String> = pending.into_iter().collect();
        lost.sort();
        for filename in lost {
            outcome.skips.push(
                SkippedFile::new(filename, SkipReason::AnalysisFailed)
                    .with_error("analysis task panicked"),
            );
        }
        Ok(())
    }
}

/// Chunks of `file` in index order. Chunks carrying another file id belong to a
/// superseded copy of the same filename; chunks without one are matched by filename alone.
fn chunks_of(index: &ChunkIndex, file: &SourceFile) -> Vec<Chunk> {
    index
        .get(&file.filename)
        .iter()
        .filter(|chunk| chunk.metadata.file_id.is_empty() || chunk.metadata.file_id == file.id)
        .cloned()
        .collect()
}

/// One entry per filename: first-seen position, last-seen value
pub fn dedup_by_filename(files: &[SourceFile]) -> Vec<&SourceFile> {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(files.len());
    let mut unique: Vec<&SourceFile> = Vec::with_capacity(files.len());

    for file in files {
        match positions.get(file.filename.as_str()) {
            Some(&pos) => unique[pos] = file,
            None => {
                positions.insert(file.filename.as_str(), unique.len());
                unique.push(file);
            }
        }
    }
    unique
}

use crate::completion::{CompletionError, CompletionRequest, CompletionService};
use crate::error::AnalysisError;
use crate::prompt::render_prompt;
use crate::retry::RetryPolicy;
use crate::types::AnalysisResult;
use codemap_chunker::{Chunk, SourceFile};
use std::sync::Arc;
use tokio::time::{sleep, Instant};

/// Why one attempt did not produce an analysis
#[derive(Debug)]
enum AttemptFailure {
    Completion(CompletionError),
    Parse(serde_json::Error),
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptFailure::Completion(e) => write!(f, "{e}"),
            AttemptFailure::Parse(e) => write!(f, "unparseable analysis response: {e}"),
        }
    }
}

/// Runs the completion service over one file, retrying transient failures
pub struct FileAnalyzer {
    service: Arc<dyn CompletionService>,
    policy: RetryPolicy,
}

impl FileAnalyzer {
    pub fn new(service: Arc<dyn CompletionService>, policy: RetryPolicy) -> Self {
        Self { service, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Analyse `file` from its chunks.
    ///
    /// Transient completion errors and unparseable responses are retried with backoff. A backoff
    /// that would end after `deadline` is not slept; the call fails with
    /// [`AnalysisError::DeadlineExceeded`] instead.
    pub async fn analyze(
        &self,
        file: &SourceFile,
        chunks: &[Chunk],
        deadline: Option<Instant>,
    ) -> Result<AnalysisResult, AnalysisError> {
        if !file.success {
            return Err(AnalysisError::Precondition {
                filename: file.filename.clone(),
                reason: "file was not parsed".to_string(),
            });
        }
        if chunks.is_empty() {
            return Err(AnalysisError::Precondition {
                filename: file.filename.clone(),
                reason: "file has no chunks".to_string(),
            });
        }

        let request = CompletionRequest {
            filename: file.filename.clone(),
            language: file.language.clone(),
            content: join_chunks(chunks),
        };
        let prompt = render_prompt(&request);

        let mut retry = 0u32;
        loop {
            let attempt = retry + 1;
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(AnalysisError::DeadlineExceeded {
                    attempts: attempt - 1,
                });
            }

            log::debug!(
                "Analyzing {} (attempt {attempt}/{})",
                file.filename,
                self.policy.max_attempts()
            );

            let failure = match self.attempt(&request, &prompt).await {
                Ok(result) => {
                    log::info!("Analysis complete for {}", file.filename);
                    return Ok(result);
                }
                Err(failure) => failure,
            };

            if let AttemptFailure::Completion(e) = &failure {
                if !e.is_transient() {
                    log::warn!("Analysis of {} failed: {e}", file.filename);
                    return Err(AnalysisError::Terminal(e.clone()));
                }
            }

            if retry >= self.policy.max_retries {
                log::warn!(
                    "Analysis of {} failed after {attempt} attempts: {failure}",
                    file.filename
                );
                return Err(AnalysisError::RetriesExhausted {
                    attempts: attempt,
                    last_error: failure.to_string(),
                });
            }

            let delay = self.policy.delay_for(retry);
            if deadline.is_some_and(|deadline| Instant::now() + delay > deadline) {
                log::warn!(
                    "Not retrying {}: backoff of {delay:?} would pass the deadline",
                    file.filename
                );
                return Err(AnalysisError::DeadlineExceeded { attempts: attempt });
            }

            log::warn!(
                "Retrying analysis for {} in {delay:?} (retry {}/{}): {failure}",
                file.filename,
                retry + 1,
                self.policy.max_retries
            );
            sleep(delay).await;
            retry += 1;
        }
    }

    async fn attempt(
        &self,
        request: &CompletionRequest,
        prompt: &str,
    ) -> Result<AnalysisResult, AttemptFailure> {
        let raw = self
            .service
            .complete(request, prompt)
            .await
            .map_err(AttemptFailure::Completion)?;
        serde_json::from_str(raw.trim()).map_err(AttemptFailure::Parse)
    }
}

/// Rebuild the text sent for analysis: chunks in index order joined with newlines
pub fn join_chunks(chunks: &[Chunk]) -> String {
    let mut ordered: Vec<&Chunk> = chunks.iter().collect();
    ordered.sort_by_key(|chunk| chunk.index());
    ordered
        .iter()
        .map(|chunk| chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

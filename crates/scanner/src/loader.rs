use crate::error::{Result, ScannerError};
use crate::language::extension_of;
use crate::parser::{is_binary_extension, parse_file_content, ParsedFile};
use crate::scanner::{FileScanner, ScanOptions};
use crate::stats::ParseSummary;
use codemap_chunker::SourceFile;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;

pub const NOT_UTF8: &str = "File is not valid UTF-8 text";
pub const READ_TASK_PANICKED: &str = "File read task panicked";

/// Parsed files of one project directory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFiles {
    pub root: PathBuf,
    pub files: Vec<SourceFile>,
    pub summary: ParseSummary,
}

/// Stable file id derived from the project-relative name
pub fn file_id(relative_name: &str) -> String {
    let digest = Sha256::digest(relative_name.as_bytes());
    digest[..8].iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Scan `root` and parse every file found, reading in bounded concurrent batches
pub async fn load_project(root: impl AsRef<Path>, options: ScanOptions) -> Result<ProjectFiles> {
    let root = root.as_ref().to_path_buf();
    if !root.is_dir() {
        return Err(ScannerError::InvalidPath(root.display().to_string()));
    }
    options.validate().map_err(ScannerError::Other)?;

    let read_concurrency = options.read_concurrency;
    let scanner = FileScanner::new(&root).with_options(options);
    let (scanner, paths) = tokio::task::spawn_blocking(move || {
        let paths = scanner.scan();
        (scanner, paths)
    })
    .await
    .map_err(|e| ScannerError::Other(format!("Scan task failed: {e}")))?;
    let paths = paths?;

    let mut files = Vec::with_capacity(paths.len());
    for batch in paths.chunks(read_concurrency) {
        let work = batch
            .iter()
            .map(|path| (path.clone(), scanner.relative_name(path)))
            .collect();
        files.extend(read_batch(work, read_source_file).await);
    }

    let summary = ParseSummary::from_files(&files);
    log::info!(
        "Parsed {} of {} files ({} failed, {} lines of code)",
        summary.parsed,
        summary.total_files,
        summary.failed,
        summary.total_lines
    );

    Ok(ProjectFiles {
        root,
        files,
        summary,
    })
}

/// Read every `(path, name)` concurrently, keeping input order.
/// A read task that panics yields a failed file rather than losing it.
async fn read_batch<F, Fut>(work: Vec<(PathBuf, String)>, read: F) -> Vec<SourceFile>
where
    F: Fn(PathBuf, String) -> Fut,
    Fut: Future<Output = SourceFile> + Send + 'static,
{
    let names: Vec<String> = work.iter().map(|(_, name)| name.clone()).collect();
    let mut tasks = JoinSet::new();
    for (offset, (path, name)) in work.into_iter().enumerate() {
        let read = read(path, name);
        tasks.spawn(async move { (offset, read.await) });
    }

    let mut slots: Vec<Option<SourceFile>> = vec![None; names.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((offset, file)) => slots[offset] = Some(file),
            Err(e) => log::warn!("Read task panicked: {e}"),
        }
    }

    slots
        .into_iter()
        .zip(names)
        .map(|(slot, name)| {
            slot.unwrap_or_else(|| {
                let id = file_id(&name);
                ParsedFile::failed(&name, READ_TASK_PANICKED).into_source_file(id, name)
            })
        })
        .collect()
}

async fn read_source_file(path: PathBuf, name: String) -> SourceFile {
    let id = file_id(&name);

    let parsed = if is_binary_extension(&extension_of(&name)) {
        parse_file_content(&name, "")
    } else {
        match tokio::fs::read(&path).await {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => parse_file_content(&name, &text),
                Err(_) => ParsedFile::failed(&name, NOT_UTF8),
            },
            Err(e) => {
                log::warn!("Failed to read {}: {e}", path.display());
                ParsedFile::failed(&name, format!("Failed to read file: {e}"))
            }
        }
    };

    parsed.into_source_file(id, name)
}

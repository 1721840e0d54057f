//! # Codemap Scanner
//!
//! Turns a project directory into parsed [`SourceFile`]s for the chunking and analysis pipeline.
//!
//! ```text
//! Directory
//!     │
//!     ├──> FileScanner (.gitignore aware, exclusion rules, size cap)
//!     │      └─> Paths
//!     │
//!     └──> Loader (bounded concurrent reads)
//!            └─> parse_file_content: language, binary detection, stats
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use codemap_scanner::{load_project, ScanOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let project = load_project("/path/to/project", ScanOptions::default()).await?;
//!     println!("Parsed {} files", project.summary.parsed);
//!     Ok(())
//! }
//! ```
//!
//! [`SourceFile`]: codemap_chunker::SourceFile

mod error;
mod language;
mod loader;
mod parser;
mod scanner;
mod stats;

pub use error::{Result, ScannerError};
pub use language::{detect_language, extension_of, language_for_extension, UNKNOWN_LANGUAGE};
pub use loader::{file_id, load_project, ProjectFiles, NOT_UTF8, READ_TASK_PANICKED};
pub use parser::{is_binary_extension, parse_file_content, ParsedFile, BINARY_NOT_SUPPORTED};
pub use scanner::{FileScanner, ScanOptions};
pub use stats::ParseSummary;

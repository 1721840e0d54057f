//! # Codemap Chunker
//!
//! Splits a project file's text into ordered, overlapping windows sized for language-model
//! consumption.
//!
//! ## Strategy
//!
//! ```text
//! File text
//!     │
//!     ├──> Recursive split (coarsest separator first)
//!     │      "\n\n" → "\n" → ". " → " " → characters
//!     │
//!     ├──> Greedy merge up to chunk_size characters
//!     │
//!     └──> Trailing overlap (≤ chunk_overlap characters)
//!            └─> Chunk[] with chunkIndex / totalChunks / offsets
//! ```
//!
//! Separators stay attached to the piece they terminate, so chunks are exact slices of the
//! input and the text can be rebuilt from them.
//!
//! ## Example
//!
//! ```rust
//! use codemap_chunker::{Chunker, ChunkerConfig, SourceFile};
//!
//! let chunker = Chunker::new(ChunkerConfig::with_size(40, 10)).unwrap();
//! let file = SourceFile::new("1", "src/app.js", "JavaScript", "const a = 1;\n\nconst b = 2;\n\nexport { a, b };\n");
//!
//! let chunks = chunker.chunk_file(&file).unwrap();
//! assert_eq!(Chunker::reassemble(&chunks), file.text);
//! ```

mod chunker;
mod config;
mod error;
mod index;
mod splitter;
mod types;

pub use chunker::{Chunker, ChunkingStats};
pub use config::{default_separators, ChunkerConfig, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
pub use error::{ChunkerError, Result};
pub use index::ChunkIndex;
pub use types::{Chunk, ChunkMetadata, FileStats, SourceFile};

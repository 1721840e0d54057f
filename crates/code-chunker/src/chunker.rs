use crate::config::ChunkerConfig;
use crate::error::{ChunkerError, Result};
use crate::splitter::RecursiveSplitter;
use crate::types::{Chunk, ChunkMetadata, SourceFile};

/// Main chunker interface for splitting file text into overlapping windows
pub struct Chunker {
    config: ChunkerConfig,
    splitter: RecursiveSplitter,
}

impl Chunker {
    /// Create a new chunker, rejecting invalid configuration
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        Ok(Self {
            splitter: RecursiveSplitter::new(config.clone()),
            config,
        })
    }

    /// Chunk raw text, stamping every chunk with a copy of `template`
    pub fn chunk_str(&self, text: &str, template: &ChunkMetadata) -> Vec<Chunk> {
        let windows = self.splitter.split(text);
        let total = windows.len();

        windows
            .into_iter()
            .enumerate()
            .map(|(index, window)| {
                let metadata = template
                    .clone()
                    .position(index, total)
                    .span(window.chars.start, window.chars.end);
                Chunk::new(text[window.bytes].to_string(), metadata)
            })
            .collect()
    }

    /// Chunk one file's text. Blank text yields an empty sequence.
    pub fn chunk_file(&self, file: &SourceFile) -> Result<Vec<Chunk>> {
        if file.text.contains('\0') {
            return Err(ChunkerError::unchunkable(
                &file.filename,
                "text contains NUL bytes",
            ));
        }

        let chunks = self.chunk_str(&file.text, &ChunkMetadata::for_file(file));
        log::debug!(
            "Chunked {} ({} chars) into {} chunks",
            file.filename,
            file.stats.characters,
            chunks.len()
        );
        Ok(chunks)
    }

    /// Chunk every parsed file of a set. Unparsed, blank and unchunkable files contribute nothing.
    pub fn chunk_files(&self, files: &[SourceFile]) -> Vec<Chunk> {
        log::info!(
            "Chunking {} files (size={}, overlap={})",
            files.len(),
            self.config.chunk_size,
            self.config.chunk_overlap
        );

        let mut all_chunks = Vec::new();
        let mut processed = 0usize;
        let mut skipped = 0usize;

        for file in files {
            if !file.success || file.text.is_empty() {
                log::debug!("Skipping {} - no valid text content", file.filename);
                skipped += 1;
                continue;
            }

            match self.chunk_file(file) {
                Ok(chunks) => {
                    processed += 1;
                    all_chunks.extend(chunks);
                }
                Err(e) => {
                    log::warn!("{e}");
                    skipped += 1;
                }
            }
        }

        log::info!(
            "Chunked {processed} files, skipped {skipped}: {}",
            Self::get_stats(&all_chunks)
        );
        all_chunks
    }

    /// Rebuild the original text from one file's chunks, dropping the overlap regions
    pub fn reassemble(chunks: &[Chunk]) -> String {
        let mut ordered: Vec<&Chunk> = chunks.iter().collect();
        ordered.sort_by_key(|chunk| chunk.index());

        let mut out = String::new();
        let mut covered = 0usize;
        for chunk in ordered {
            let skip = covered.saturating_sub(chunk.metadata.start_offset);
            out.extend(chunk.content.chars().skip(skip));
            covered = covered.max(chunk.metadata.end_offset);
        }
        out
    }

    /// Get configuration
    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Get statistics about chunking
    #[must_use]
    pub fn get_stats(chunks: &[Chunk]) -> ChunkingStats {
        let sizes: Vec<usize> = chunks.iter().map(Chunk::char_len).collect();
        ChunkingStats {
            total_chunks: chunks.len(),
            total_chars: sizes.iter().sum(),
            avg_chars_per_chunk: if sizes.is_empty() {
                0
            } else {
                sizes.iter().sum::<usize>() / sizes.len()
            },
            min_chars: sizes.iter().copied().min().unwrap_or(0),
            max_chars: sizes.iter().copied().max().unwrap_or(0),
        }
    }
}

impl Default for Chunker {
    fn default() -> Self {
        let config = ChunkerConfig::default();
        Self {
            splitter: RecursiveSplitter::new(config.clone()),
            config,
        }
    }
}

/// Statistics about chunking results
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkingStats {
    pub total_chunks: usize,
    pub total_chars: usize,
    pub avg_chars_per_chunk: usize,
    pub min_chars: usize,
    pub max_chars: usize,
}

impl std::fmt::Display for ChunkingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunks: {} | Chars: {} | Avg: {} | Range: {}-{}",
            self.total_chunks,
            self.total_chars,
            self.avg_chars_per_chunk,
            self.min_chars,
            self.max_chars
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const JS_CODE: &str = r#"import { useState } from "react";
import { supabase } from "../utils/supabase";

export default function ProjectList({ userId }) {
  const [projects, setProjects] = useState([]);

  async function load() {
    const { data } = await supabase.from("projects").select("*").eq("user_id", userId);
    setProjects(data ?? []);
  }

  return projects.map((p) => p.name);
}
"#;

    fn js_file(text: &str) -> SourceFile {
        SourceFile::new("f-1", "app/ProjectList.js", "JavaScript", text)
    }

    #[test]
    fn test_chunk_file_stamps_metadata() {
        let chunker = Chunker::new(ChunkerConfig::with_size(120, 20)).unwrap();
        let chunks = chunker.chunk_file(&js_file(JS_CODE)).unwrap();

        assert!(chunks.len() > 1);
        for (idx, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.chunk_index, idx);
            assert_eq!(chunk.metadata.total_chunks, chunks.len());
            assert_eq!(chunk.metadata.filename, "app/ProjectList.js");
            assert_eq!(chunk.metadata.language, "JavaScript");
            assert_eq!(chunk.metadata.file_id, "f-1");
            assert!(chunk.char_len() <= 120);
        }
    }

    #[test]
    fn test_reassemble_restores_text() {
        let chunker = Chunker::new(ChunkerConfig::with_size(64, 16)).unwrap();
        let mut chunks = chunker.chunk_file(&js_file(JS_CODE)).unwrap();
        chunks.reverse();
        assert_eq!(Chunker::reassemble(&chunks), JS_CODE);
    }

    #[test]
    fn test_default_chunker_keeps_small_file_whole() {
        let chunks = Chunker::default().chunk_file(&js_file(JS_CODE)).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, JS_CODE);
        assert_eq!(chunks[0].metadata.end_offset, JS_CODE.chars().count());
    }

    #[test]
    fn test_blank_file_yields_no_chunks() {
        let chunks = Chunker::default().chunk_file(&js_file("  \n\n  ")).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_nul_bytes_are_unchunkable() {
        let result = Chunker::default().chunk_file(&js_file("abc\0def"));
        assert!(matches!(result, Err(ChunkerError::Unchunkable { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            Chunker::new(ChunkerConfig::with_size(100, 100)),
            Err(ChunkerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_chunk_files_skips_unparsed_and_blank() {
        let files = vec![
            js_file(JS_CODE),
            SourceFile::failed("f-2", "logo.pdf", "PDF", "Binary file format not supported"),
            SourceFile::new("f-3", "empty.js", "JavaScript", ""),
            SourceFile::new("f-4", "nul.js", "JavaScript", "a\0b"),
        ];
        let chunks = Chunker::default().chunk_files(&files);

        assert_eq!(chunks.len(), 1);
        assert!(chunks.iter().all(|c| c.filename() == "app/ProjectList.js"));
    }

    #[test]
    fn test_chunking_stats() {
        let chunker = Chunker::new(ChunkerConfig::with_size(100, 10)).unwrap();
        let chunks = chunker.chunk_file(&js_file(JS_CODE)).unwrap();
        let stats = Chunker::get_stats(&chunks);

        assert_eq!(stats.total_chunks, chunks.len());
        assert!(stats.max_chars <= 100);
        assert!(stats.min_chars > 0);
        assert!(stats.avg_chars_per_chunk >= stats.min_chars);
        assert!(stats.to_string().starts_with("Chunks: "));
    }

    #[test]
    fn test_empty_stats() {
        let stats = Chunker::get_stats(&[]);
        assert_eq!(stats.total_chunks, 0);
        assert_eq!(stats.avg_chars_per_chunk, 0);
        assert_eq!(stats.max_chars, 0);
    }
}

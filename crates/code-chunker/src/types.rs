use serde::{Deserialize, Serialize};

/// A parsed project file handed to the chunking and analysis pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    /// Stable identifier of the file
    pub id: String,

    /// Project-relative file name; the uniqueness key of a file set
    pub filename: String,

    /// Human readable language name ("JavaScript", "Rust", "Unknown", ...)
    #[serde(default)]
    pub language: String,

    /// Full text content (empty when parsing failed)
    #[serde(default)]
    pub text: String,

    /// Whether text extraction succeeded
    pub success: bool,

    /// Line and character statistics
    #[serde(default)]
    pub stats: FileStats,

    /// Lowercase file extension
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,

    /// Parse failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceFile {
    /// Create a successfully parsed file, computing its statistics
    pub fn new(
        id: impl Into<String>,
        filename: impl Into<String>,
        language: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            id: id.into(),
            filename: filename.into(),
            language: language.into(),
            stats: FileStats::from_text(&text),
            text,
            success: true,
            file_type: None,
            error: None,
        }
    }

    /// Create a file whose text could not be extracted
    pub fn failed(
        id: impl Into<String>,
        filename: impl Into<String>,
        language: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            language: language.into(),
            text: String::new(),
            success: false,
            stats: FileStats::default(),
            file_type: None,
            error: Some(error.into()),
        }
    }

    /// Builder: set file type (extension)
    #[must_use]
    pub fn with_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }
}

/// Line and character counts of a file's text
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileStats {
    /// Non-blank lines
    pub lines: usize,

    /// All `\n`-separated lines
    pub total_lines: usize,

    /// Unicode scalar values
    pub characters: usize,
}

impl FileStats {
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split('\n').filter(|line| !line.trim().is_empty()).count(),
            total_lines: text.split('\n').count(),
            characters: text.chars().count(),
        }
    }
}

/// A bounded, overlapping window of a file's text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Window text
    #[serde(alias = "pageContent")]
    pub content: String,

    /// Position and owning file
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a new chunk
    #[must_use]
    pub const fn new(content: String, metadata: ChunkMetadata) -> Self {
        Self { content, metadata }
    }

    /// Owning file name
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.metadata.filename
    }

    /// 0-based position within the file
    #[must_use]
    pub const fn index(&self) -> usize {
        self.metadata.chunk_index
    }

    /// Window length in characters
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Metadata attached to every chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    pub filename: String,

    #[serde(default)]
    pub language: String,

    #[serde(default)]
    pub file_id: String,

    /// 0-based, contiguous within a file
    pub chunk_index: usize,

    /// Number of chunks produced for the file
    #[serde(default)]
    pub total_chunks: usize,

    /// Character offset of the window start in the file text
    #[serde(default)]
    pub start_offset: usize,

    /// Character offset one past the window end
    #[serde(default)]
    pub end_offset: usize,
}

impl ChunkMetadata {
    /// Metadata for a chunk of `file`
    pub fn for_file(file: &SourceFile) -> Self {
        Self {
            filename: file.filename.clone(),
            language: file.language.clone(),
            file_id: file.id.clone(),
            ..Default::default()
        }
    }

    /// Builder: set position
    #[must_use]
    pub const fn position(mut self, chunk_index: usize, total_chunks: usize) -> Self {
        self.chunk_index = chunk_index;
        self.total_chunks = total_chunks;
        self
    }

    /// Builder: set character span
    #[must_use]
    pub const fn span(mut self, start_offset: usize, end_offset: usize) -> Self {
        self.start_offset = start_offset;
        self.end_offset = end_offset;
        self
    }
}

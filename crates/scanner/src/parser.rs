use crate::language::{extension_of, language_for_extension, UNKNOWN_LANGUAGE};
use codemap_chunker::{FileStats, SourceFile};

/// Extensions whose content cannot be extracted as text
const BINARY_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "class"];

pub const BINARY_NOT_SUPPORTED: &str = "Binary file format not supported";

/// Text extraction result for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    pub success: bool,
    pub text: String,
    /// Lowercase extension
    pub file_type: String,
    pub language: String,
    pub stats: FileStats,
    pub error: Option<String>,
}

impl ParsedFile {
    /// A parse failure that keeps the detected type and language
    pub fn failed(filename: &str, error: impl Into<String>) -> Self {
        let file_type = extension_of(filename);
        Self {
            success: false,
            text: String::new(),
            language: language_for_extension(&file_type).to_string(),
            file_type,
            stats: FileStats::default(),
            error: Some(error.into()),
        }
    }

    /// Attach identity and turn the result into a pipeline input
    pub fn into_source_file(self, id: impl Into<String>, filename: impl Into<String>) -> SourceFile {
        let file = if self.success {
            let mut file = SourceFile::new(id, filename, self.language, self.text);
            file.stats = self.stats;
            file
        } else {
            SourceFile::failed(
                id,
                filename,
                self.language,
                self.error.unwrap_or_else(|| "Unknown parse error".to_string()),
            )
        };
        file.with_type(self.file_type)
    }
}

pub fn is_binary_extension(ext: &str) -> bool {
    BINARY_EXTENSIONS.contains(&ext)
}

/// Extract the text of `filename` from its raw `content`
pub fn parse_file_content(filename: &str, content: &str) -> ParsedFile {
    let file_type = extension_of(filename);
    let language = language_for_extension(&file_type);

    if is_binary_extension(&file_type) {
        log::debug!("Binary file detected, skipping content extraction: {filename}");
        return ParsedFile::failed(filename, BINARY_NOT_SUPPORTED);
    }

    if language == UNKNOWN_LANGUAGE {
        log::debug!("Unrecognized extension '{file_type}' for {filename}, treating as plain text");
    }

    let stats = FileStats::from_text(content);
    log::debug!(
        "Parsed {filename} ({language}): {} lines of code, {} total, {} chars",
        stats.lines,
        stats.total_lines,
        stats.characters
    );

    ParsedFile {
        success: true,
        text: content.to_string(),
        file_type,
        language: language.to_string(),
        stats,
        error: None,
    }
}

use serde::{Deserialize, Serialize};

/// Default window size in characters
pub const DEFAULT_CHUNK_SIZE: usize = 800;

/// Default overlap between consecutive windows in characters
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

/// Configuration for text chunking behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Maximum chunk size in characters (hard limit unless a piece cannot be split)
    pub chunk_size: usize,

    /// Characters of trailing context repeated at the head of the next chunk
    pub chunk_overlap: usize,

    /// Separators tried in order, coarsest first. An empty string splits into characters.
    pub separators: Vec<String>,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: default_separators(),
        }
    }
}

/// Paragraph breaks, line breaks, sentence ends, whitespace, then raw characters
pub fn default_separators() -> Vec<String> {
    ["\n\n", "\n", ". ", " ", ""]
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl ChunkerConfig {
    /// Create config with explicit size and overlap, keeping the default separators
    pub fn with_size(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be > 0".to_string());
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }

        if self.separators.is_empty() {
            return Err("at least one separator is required".to_string());
        }

        let empty_count = self.separators.iter().filter(|s| s.is_empty()).count();
        if empty_count > 1
            || (empty_count == 1 && self.separators.last().is_some_and(|s| !s.is_empty()))
        {
            return Err("the character separator (\"\") may only appear last".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = ChunkerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 800);
        assert_eq!(config.chunk_overlap, 100);
    }

    #[test]
    fn test_zero_overlap_is_valid() {
        assert!(ChunkerConfig::with_size(10, 0).validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        // overlap must stay below size
        assert!(ChunkerConfig::with_size(100, 100).validate().is_err());
        assert!(ChunkerConfig::with_size(100, 150).validate().is_err());
        assert!(ChunkerConfig::with_size(0, 0).validate().is_err());

        let config = ChunkerConfig {
            separators: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ChunkerConfig {
            separators: vec!["".to_string(), "\n".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ChunkerConfig {
            separators: vec!["\n".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ChunkerConfig = serde_json::from_str(r#"{"chunk_size": 500}"#).unwrap();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, DEFAULT_CHUNK_OVERLAP);
        assert_eq!(config.separators, default_separators());
    }
}

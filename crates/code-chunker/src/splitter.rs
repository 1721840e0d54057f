use crate::config::ChunkerConfig;
use std::collections::VecDeque;
use std::ops::Range;

/// A contiguous piece of the input text that is never cut further
#[derive(Debug, Clone, PartialEq, Eq)]
struct Piece {
    /// Byte range in the source text
    bytes: Range<usize>,
    /// Length in characters
    chars: usize,
}

/// A merged window of pieces, ready to become a chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Byte range in the source text
    pub bytes: Range<usize>,
    /// Character range in the source text
    pub chars: Range<usize>,
}

/// Recursive separator splitter with greedy merging and trailing overlap
pub struct RecursiveSplitter {
    config: ChunkerConfig,
}

impl RecursiveSplitter {
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Split `text` into ordered, overlapping windows.
    ///
    /// Windows cover the whole text; window `i + 1` starts at or before the end of window `i`.
    pub fn split(&self, text: &str) -> Vec<Window> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut pieces = Vec::new();
        self.split_range(text, 0..text.len(), &self.config.separators, &mut pieces);
        self.merge(&pieces)
    }

    fn split_range(
        &self,
        text: &str,
        range: Range<usize>,
        separators: &[String],
        out: &mut Vec<Piece>,
    ) {
        let slice = &text[range.clone()];
        let chars = slice.chars().count();
        if chars <= self.config.chunk_size {
            out.push(Piece {
                bytes: range,
                chars,
            });
            return;
        }

        let Some(pos) = separators
            .iter()
            .position(|sep| sep.is_empty() || slice.contains(sep.as_str()))
        else {
            // Nothing left to split on: keep the oversized piece whole.
            out.push(Piece {
                bytes: range,
                chars,
            });
            return;
        };

        let finer = &separators[pos + 1..];
        for part in split_keeping_separator(slice, &separators[pos]) {
            let absolute = range.start + part.start..range.start + part.end;
            self.split_range(text, absolute, finer, out);
        }
    }

    fn merge(&self, pieces: &[Piece]) -> Vec<Window> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut char_starts = Vec::with_capacity(pieces.len());
        let mut offset = 0;
        for piece in pieces {
            char_starts.push(offset);
            offset += piece.chars;
        }

        let window_of = |current: &VecDeque<usize>| -> Option<Window> {
            let (&first, &last) = (current.front()?, current.back()?);
            Some(Window {
                bytes: pieces[first].bytes.start..pieces[last].bytes.end,
                chars: char_starts[first]..char_starts[last] + pieces[last].chars,
            })
        };

        let mut windows = Vec::new();
        let mut current: VecDeque<usize> = VecDeque::new();
        let mut current_chars = 0usize;

        for (idx, piece) in pieces.iter().enumerate() {
            if piece.chars > size {
                windows.extend(window_of(&current));
                current.clear();
                current_chars = 0;
                windows.extend(window_of(&VecDeque::from([idx])));
                continue;
            }

            if !current.is_empty() && current_chars + piece.chars > size {
                windows.extend(window_of(&current));

                // Keep the trailing pieces as overlap while they fit.
                while let Some(&front) = current.front() {
                    if current_chars > overlap || current_chars + piece.chars > size {
                        current.pop_front();
                        current_chars -= pieces[front].chars;
                    } else {
                        break;
                    }
                }
            }

            current.push_back(idx);
            current_chars += piece.chars;
        }

        windows.extend(window_of(&current));
        windows
    }
}

/// Split on `separator`, leaving each separator attached to the part it terminates.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<Range<usize>> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(idx, ch)| idx..idx + ch.len_utf8())
            .collect();
    }

    let mut parts = Vec::new();
    let mut start = 0;
    for (idx, matched) in text.match_indices(separator) {
        let end = idx + matched.len();
        parts.push(start..end);
        start = end;
    }
    if start < text.len() {
        parts.push(start..text.len());
    }
    parts
}

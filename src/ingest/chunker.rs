use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::constants::{CHUNK_BOUNDARY_FRACTION, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

use super::error::IngestError;

/// One window of a text, addressed in characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSpan {
    pub index: usize,
    pub chars: Range<usize>,
    pub text: String,
}

/// Fixed-size overlapping character windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    size: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl Chunker {
    pub fn new(size: usize, overlap: usize) -> Result<Self, IngestError> {
        if size == 0 || overlap >= size {
            return Err(IngestError::InvalidChunking { size, overlap });
        }
        Ok(Self { size, overlap })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Splits `text` into windows of at most `size` characters, consecutive windows sharing
    /// up to `overlap` characters. Always returns at least one window.
    pub fn chunk(&self, text: &str) -> Vec<ChunkSpan> {
        let chars: Vec<char> = text.chars().collect();
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = chars.len();

        let mut spans = Vec::new();
        let mut start = 0;
        loop {
            let hard_end = (start + self.size).min(total);
            let end = if hard_end < total {
                self.soft_boundary(&chars, start, hard_end)
            } else {
                hard_end
            };

            spans.push(ChunkSpan {
                index: spans.len(),
                chars: start..end,
                text: text[offsets[start]..offsets[end]].to_string(),
            });

            if end >= total {
                break;
            }

            let next = end.saturating_sub(self.overlap);
            start = if next > start { next } else { end };
        }

        spans
    }

    /// Moves a window end back to just after whitespace, if any lies in the trailing
    /// fraction of the window.
    fn soft_boundary(&self, chars: &[char], start: usize, hard_end: usize) -> usize {
        let slack = ((self.size as f32) * CHUNK_BOUNDARY_FRACTION) as usize;
        let earliest = hard_end.saturating_sub(slack).max(start + 1);

        (earliest..=hard_end)
            .rev()
            .find(|&end| chars[end - 1].is_whitespace())
            .unwrap_or(hard_end)
    }
}

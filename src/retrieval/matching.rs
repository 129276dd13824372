//! Content-based chunk resolution for chunks stored without a resume id.

use crate::constants::CONTENT_MATCH_PREFIX_CHARS;
use crate::ingest::{ResumeDocument, ResumeId};

/// Lowercases and collapses whitespace runs to one space.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves chunk text to the eligible resume that contains it.
#[derive(Debug)]
pub struct ContentMatcher {
    resumes: Vec<(ResumeId, String)>,
}

impl ContentMatcher {
    pub fn new(eligible: &[ResumeDocument]) -> Self {
        Self {
            resumes: eligible
                .iter()
                .map(|doc| (doc.id, normalize_text(&doc.text)))
                .filter(|(_, text)| !text.is_empty())
                .collect(),
        }
    }

    /// The resume whose text contains the chunk's leading characters, or whose whole
    /// text is contained in the chunk. `None` when no resume or more than one matches.
    pub fn resolve(&self, chunk_text: &str) -> Option<ResumeId> {
        let chunk = normalize_text(chunk_text);
        if chunk.is_empty() {
            return None;
        }
        let prefix: String = chunk.chars().take(CONTENT_MATCH_PREFIX_CHARS).collect();

        let mut matches = self.resumes.iter().filter(|(_, resume)| {
            resume.contains(&prefix) || chunk.contains(resume.as_str())
        });

        let (id, _) = matches.next()?;
        match matches.next() {
            Some(_) => None,
            None => Some(*id),
        }
    }
}

//! Deterministic text used when a generation model is unavailable or fails.

use crate::constants::{EXCERPT_CHARS, TEMPLATE_SKILL_LIMIT, truncate_chars};

const EMPTY_EXCERPT: &str = "No resume text available.";

/// First `EXCERPT_CHARS` characters of the resume, with "..." when cut.
pub fn excerpt_summary(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return EMPTY_EXCERPT.to_string();
    }
    let excerpt = truncate_chars(text, EXCERPT_CHARS);
    if excerpt.len() < text.len() {
        format!("{}...", excerpt.trim_end())
    } else {
        excerpt.to_string()
    }
}

/// Template explanation from rank, match percentage and leading skills. Never empty.
pub fn template_explanation(rank: usize, match_percentage: f32, skills: &[String]) -> String {
    let mut explanation = format!(
        "Ranked #{rank} with a {:.0}% match score.",
        match_percentage
    );
    if skills.is_empty() {
        explanation.push_str(" No recognized skills were extracted from the resume.");
    } else {
        let shown: Vec<&str> = skills
            .iter()
            .take(TEMPLATE_SKILL_LIMIT)
            .map(String::as_str)
            .collect();
        explanation.push_str(&format!(" Key skills: {}.", shown.join(", ")));
    }
    explanation
}

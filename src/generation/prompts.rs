use crate::constants::EXPLANATION_REPLY_CHARS;
use crate::constants::truncate_chars;

use super::ExplanationRequest;

pub const SYSTEM_PROMPT: &str = "You are an experienced technical recruiter. \
Explain in two or three sentences why the candidate fits the job. \
Mention concrete matching skills and experience. Do not invent facts.";

pub fn explanation_prompt(request: &ExplanationRequest) -> String {
    let skills = if request.skills.is_empty() {
        "none extracted".to_string()
    } else {
        request.skills.join(", ")
    };

    format!(
        "Job requirements:\n{}\n\nCandidate: {} (ranked #{}, {:.0}% match)\nSkills: {}\n\nResume excerpt:\n{}\n\nWhy is this candidate a good match?",
        request.job_requirements,
        request.candidate_name,
        request.rank,
        request.match_percentage,
        skills,
        request.resume_excerpt,
    )
}

/// Trims a model reply to `EXPLANATION_REPLY_CHARS`, marking the cut with "...".
pub fn trim_reply(reply: &str) -> Option<String> {
    let reply = reply.trim();
    if reply.is_empty() {
        return None;
    }
    let trimmed = truncate_chars(reply, EXPLANATION_REPLY_CHARS);
    if trimmed.len() < reply.len() {
        Some(format!("{}...", trimmed.trim_end()))
    } else {
        Some(trimmed.to_string())
    }
}

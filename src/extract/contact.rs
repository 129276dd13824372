use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{NAME_CONFIDENCE_THRESHOLD, NAME_SCAN_LINES};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"(?i)\b[a-z0-9._%+-]+@([a-z0-9.-]+\.[a-z]{2,})\b").unwrap();
    static ref PHONE_PATTERN: Regex =
        Regex::new(r"(?:\+\d{1,3}[\s.-]?)?(?:\(\d{3}\)|\b\d{3})[\s.-]?\d{3}[\s.-]?\d{4}\b").unwrap();
}

const PLACEHOLDER_EMAIL_DOMAINS: &[&str] = &[
    "example.com",
    "example.org",
    "test.com",
    "domain.com",
    "email.com",
];

/// Section headings and labels that never appear in a name line.
const NAME_STOPLIST: &[&str] = &[
    "resume",
    "curriculum",
    "vitae",
    "email",
    "e-mail",
    "phone",
    "mobile",
    "address",
    "experience",
    "education",
    "skills",
    "summary",
    "objective",
    "profile",
    "contact",
    "linkedin",
    "github",
    "references",
    "projects",
    "certifications",
    "employment",
    "http",
    "www",
    "@",
];

pub fn extract_contact(text: &str) -> Contact {
    Contact {
        name: find_name(text),
        email: find_email(text),
        phone: find_phone(text),
    }
}

/// Best-scoring name line among the first few non-empty lines, if confident enough.
pub fn find_name(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(NAME_SCAN_LINES)
        .enumerate()
        .filter_map(|(index, line)| score_name_line(line, index).map(|score| (score, line)))
        .filter(|(score, _)| *score >= NAME_CONFIDENCE_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0).then_with(|| std::cmp::Ordering::Greater))
        .map(|(_, line)| line.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Scores a candidate name line; `None` when the line is not a candidate at all.
pub fn score_name_line(line: &str, index: usize) -> Option<f32> {
    let char_count = line.chars().count();
    if !(5..=60).contains(&char_count) || line.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let lower = line.to_lowercase();
    if NAME_STOPLIST.iter().any(|keyword| lower.contains(keyword)) {
        return None;
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    if !(2..=5).contains(&words.len()) {
        return None;
    }

    let mut score = NAME_SCAN_LINES.saturating_sub(index) as f32;

    let capitalized = words
        .iter()
        .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
        .count();
    let cap_ratio = capitalized as f32 / words.len() as f32;
    score += cap_ratio * 10.0;
    if capitalized == words.len() {
        score += 5.0;
    }

    if words.len() <= 3 {
        score += 5.0;
    }

    let visible: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
    let alphabetic = visible.iter().filter(|c| c.is_alphabetic()).count();
    if alphabetic as f32 / visible.len() as f32 > 0.8 {
        score += 3.0;
    }

    let title_case = words.iter().all(|w| {
        let mut chars = w.chars();
        chars.next().is_some_and(char::is_uppercase) && chars.all(|c| !c.is_uppercase())
    });
    let all_caps = line.chars().any(char::is_alphabetic)
        && line.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase);
    if title_case || all_caps {
        score += 3.0;
    }

    Some(score)
}

pub fn find_email(text: &str) -> Option<String> {
    EMAIL_PATTERN.captures_iter(text).find_map(|caps| {
        let domain = caps.get(1)?.as_str().to_lowercase();
        if PLACEHOLDER_EMAIL_DOMAINS.contains(&domain.as_str()) {
            return None;
        }
        Some(caps.get(0)?.as_str().to_string())
    })
}

pub fn find_phone(text: &str) -> Option<String> {
    PHONE_PATTERN
        .find(text)
        .map(|m| m.as_str().trim().to_string())
}

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Highest-first ordering is the matching priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeLevel {
    Associate,
    Bachelor,
    Master,
    Doctorate,
}

/// Education record, or the explicit `NotSpecified` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Education {
    #[default]
    NotSpecified,
    Degree {
        level: DegreeLevel,
        /// Degree phrase as written ("Bachelor of Science", "Ph.D.").
        degree: String,
        field: Option<String>,
        institution: Option<String>,
        graduation_year: Option<u16>,
    },
}

impl Education {
    pub fn is_specified(&self) -> bool {
        !matches!(self, Education::NotSpecified)
    }

    pub fn level(&self) -> Option<DegreeLevel> {
        match self {
            Education::NotSpecified => None,
            Education::Degree { level, .. } => Some(*level),
        }
    }
}

/// A degree phrase found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegreeMatch {
    pub level: DegreeLevel,
    pub degree: String,
    pub field: Option<String>,
}

struct DegreePattern {
    level: DegreeLevel,
    regex: Regex,
    /// Bare two-letter abbreviations count only when a field of study follows.
    requires_field: bool,
}

lazy_static! {
    static ref DEGREE_PATTERNS: Vec<DegreePattern> = vec![
        DegreePattern {
            level: DegreeLevel::Doctorate,
            regex: Regex::new(r"\b(?:(?i:doctor\s+of\s+[a-z]+|doctorate)\b|P[hH]\.?\s?D\b\.?)")
                .unwrap(),
            requires_field: false,
        },
        DegreePattern {
            level: DegreeLevel::Master,
            regex: Regex::new(concat!(
                r"\b(?:(?i:master['’]?s?\s+(?:degree\b|of\s+(?:science|arts|engineering|",
                r"business\s+administration|technology|education|fine\s+arts|laws|philosophy|",
                r"commerce)\b)|master['’]?s\b)|M\.B\.A\.|MBA\b|M\.S(?:c\b|\b)\.?|MSc\b|M\.A\.|",
                r"M\.?Eng\b\.?)"
            ))
            .unwrap(),
            requires_field: false,
        },
        DegreePattern {
            level: DegreeLevel::Master,
            regex: Regex::new(r"\b(?:MS|MA)\b").unwrap(),
            requires_field: true,
        },
        DegreePattern {
            level: DegreeLevel::Bachelor,
            regex: Regex::new(concat!(
                r"\b(?:(?i:bachelor['’]?s?\s+(?:degree\b|of\s+(?:science|arts|engineering|",
                r"technology|business\s+administration|education|fine\s+arts|commerce|laws)\b)|",
                r"bachelor['’]?s?\b)|B\.S(?:c\b|\b)\.?|BSc\b|B\.A\.|B\.?Tech\b\.?|B\.E\.|B\.?Eng\b\.?)"
            ))
            .unwrap(),
            requires_field: false,
        },
        DegreePattern {
            level: DegreeLevel::Bachelor,
            regex: Regex::new(r"\b(?:BS|BA|BE)\b").unwrap(),
            requires_field: true,
        },
        DegreePattern {
            level: DegreeLevel::Associate,
            regex: Regex::new(concat!(
                r"\b(?i:associate['’]?s?\s+(?:degree\b|of\s+(?:applied\s+science|science|arts)\b)|",
                r"associate['’]s\b|diploma\b)"
            ))
            .unwrap(),
            requires_field: false,
        },
    ];

    static ref FIELD_PATTERN: Regex =
        Regex::new(r"^\s*(?:degree\s+)?(?:[,:\-–]\s*)?(?i:in|of)\s+([A-Za-z][A-Za-z&/ ]*[A-Za-z])")
            .unwrap();

    static ref INSTITUTION_PATTERN: Regex = Regex::new(concat!(
        r"\b((?:[A-Z][A-Za-z&.'’-]*[ \t]+){0,5}(?:University|Institute|College|School)",
        r"(?:[ \t]+of[ \t]+[A-Z][A-Za-z&.'’-]*(?:[ \t]+[A-Z][A-Za-z&.'’-]*){0,4})?)"
    ))
    .unwrap();

    static ref YEAR_PATTERN: Regex = Regex::new(r"\b((?:19|20)\d{2})\b").unwrap();
}

/// Words that end a field of study ("Computer Science from MIT").
const FIELD_TERMINATORS: &[&str] = &["from", "at", "with", "gpa", "graduated", "class"];
/// Dangling words stripped from the end of a field of study.
const TRAILING_CONNECTORS: &[&str] = &["from", "at", "in", "of", "and", "the"];

/// Full education strategy: degree, then institution and year.
pub fn extract_education(text: &str) -> Education {
    let Some(found) = find_degree(text) else {
        return Education::NotSpecified;
    };

    Education::Degree {
        level: found.level,
        degree: found.degree,
        field: found.field,
        institution: find_institution(text),
        graduation_year: find_graduation_year(text),
    }
}

/// Highest-priority degree mention, trying each pattern in order.
pub fn find_degree(text: &str) -> Option<DegreeMatch> {
    DEGREE_PATTERNS.iter().find_map(|pattern| {
        pattern.regex.find_iter(text).find_map(|m| {
            let field = find_field(&text[m.end()..]);
            if pattern.requires_field && field.is_none() {
                return None;
            }
            Some(DegreeMatch {
                level: pattern.level,
                degree: m.as_str().trim().to_string(),
                field,
            })
        })
    })
}

/// Field of study introduced by "in"/"of" right after a degree phrase.
pub fn find_field(after_degree: &str) -> Option<String> {
    let captured = FIELD_PATTERN.captures(after_degree)?.get(1)?.as_str();

    let mut words: Vec<&str> = captured
        .split_whitespace()
        .take_while(|w| !FIELD_TERMINATORS.contains(&w.to_lowercase().as_str()))
        .collect();
    while words
        .last()
        .is_some_and(|w| TRAILING_CONNECTORS.contains(&w.to_lowercase().as_str()))
    {
        words.pop();
    }

    (!words.is_empty()).then(|| words.join(" "))
}

pub fn find_institution(text: &str) -> Option<String> {
    INSTITUTION_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Most recent plausible year (1900-2099) anywhere in the text.
pub fn find_graduation_year(text: &str) -> Option<u16> {
    YEAR_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u16>().ok())
        .max()
}

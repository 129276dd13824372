use lazy_static::lazy_static;
use regex::Regex;

use crate::constants::MAX_EXPERIENCE_YEARS;

lazy_static! {
    /// "5 years of experience", "7+ yrs professional experience"
    static ref YEARS_OF_EXPERIENCE: Regex = Regex::new(concat!(
        r"(?i)\b(\d{1,2})\s*\+?\s*(?:years?|yrs?)\b(?:\s+of)?",
        r"(?:\s+(?:professional|relevant|industry|work|hands-on|total))?\s+experience"
    ))
    .unwrap();

    /// "Experience: 8 years"
    static ref EXPERIENCE_LABEL: Regex =
        Regex::new(r"(?i)\bexperience\s*[:\-–]\s*(\d{1,2})\s*\+?\s*(?:years?|yrs?)\b").unwrap();

    /// "2018 - 2023", "Jan 2019 – Present", "2020 to now"
    static ref YEAR_RANGE: Regex = Regex::new(concat!(
        r"(?i)\b((?:19|20)\d{2})\s*(?:-|–|—|to)\s*(?:[a-z]{3,9}\.?\s+)?",
        r"((?:19|20)\d{2}|present|current|now)\b"
    ))
    .unwrap();
}

/// One way of reading an experience duration out of resume text.
pub type ExperienceStrategy = fn(&str, i32) -> Option<u32>;

/// Tried in order; the first strategy that yields a plausible value wins.
pub const STRATEGIES: &[ExperienceStrategy] = &[stated_years, labeled_years, date_range_span];

pub fn extract_experience(text: &str, current_year: i32) -> Option<u32> {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(text, current_year))
}

fn plausible(years: i32) -> Option<u32> {
    (years > 0 && years < MAX_EXPERIENCE_YEARS).then_some(years as u32)
}

fn first_capture(regex: &Regex, text: &str) -> Option<u32> {
    regex
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<i32>().ok())
        .find_map(plausible)
}

/// "N years of experience".
pub fn stated_years(text: &str, _current_year: i32) -> Option<u32> {
    first_capture(&YEARS_OF_EXPERIENCE, text)
}

/// "experience: N years".
pub fn labeled_years(text: &str, _current_year: i32) -> Option<u32> {
    first_capture(&EXPERIENCE_LABEL, text)
}

/// Span from the earliest range start to the latest range end.
pub fn date_range_span(text: &str, current_year: i32) -> Option<u32> {
    let mut earliest: Option<i32> = None;
    let mut latest: Option<i32> = None;

    for caps in YEAR_RANGE.captures_iter(text) {
        let Some(start) = caps.get(1).and_then(|m| m.as_str().parse::<i32>().ok()) else {
            continue;
        };
        let end = match caps.get(2).map(|m| m.as_str().to_lowercase()) {
            Some(ref word) if matches!(word.as_str(), "present" | "current" | "now") => {
                current_year
            }
            Some(year) => match year.parse::<i32>() {
                Ok(year) => year,
                Err(_) => continue,
            },
            None => continue,
        };

        earliest = Some(earliest.map_or(start, |e| e.min(start)));
        latest = Some(latest.map_or(end, |l| l.max(end)));
    }

    plausible(latest? - earliest?)
}

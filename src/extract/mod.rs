//! Heuristic resume field extraction.
//!
//! Each field is read by an ordered list of independent, pure strategies (see the
//! submodules); the first strategy that succeeds wins. Absence is explicit: an empty skill
//! list, `None`, or [`Education::NotSpecified`], never an error.

pub mod contact;
pub mod education;
pub mod experience;
pub mod skills;


pub use contact::Contact;
pub use education::{DegreeLevel, Education};
pub use skills::SkillVocabulary;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fields read out of one resume.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Lowercased, deduplicated, sorted.
    pub skills: Vec<String>,
    pub education: Education,
    pub experience_years: Option<u32>,
    pub contact: Contact,
}

/// Pure, idempotent field extractor.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    vocabulary: SkillVocabulary,
    current_year: i32,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(SkillVocabulary::builtin())
    }
}

impl FieldExtractor {
    pub fn new(vocabulary: SkillVocabulary) -> Self {
        Self {
            vocabulary,
            current_year: chrono::Utc::now().year(),
        }
    }

    /// Pins the year that "present" resolves to.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    pub fn vocabulary(&self) -> &SkillVocabulary {
        &self.vocabulary
    }

    pub fn extract(&self, text: &str) -> ExtractedFields {
        let fields = ExtractedFields {
            skills: self.extract_skills(text),
            education: education::extract_education(text),
            experience_years: experience::extract_experience(text, self.current_year),
            contact: contact::extract_contact(text),
        };

        debug!(
            text_len = text.len(),
            skills = fields.skills.len(),
            education = fields.education.is_specified(),
            experience_years = ?fields.experience_years,
            has_name = fields.contact.name.is_some(),
            "Extracted resume fields"
        );

        fields
    }

    pub fn extract_skills(&self, text: &str) -> Vec<String> {
        self.vocabulary.find(text)
    }
}

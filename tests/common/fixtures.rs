//! Test fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use resumatch::config::Config;
use resumatch::ingest::{ResumeId, ResumeRecord};
use resumatch::pipeline::RankingPipeline;
use resumatch::vectordb::MemoryVectorDb;

pub const BACKEND_QUERY: &str =
    "Backend Engineer\nBuild Python web services.\nRequirements:\nPython\nDjango\nAWS";

const ALIGNED_SKILLS: [&str; 4] = ["Python", "Django", "AWS", "PostgreSQL"];

const UNRELATED_ROLES: [&str; 4] = [
    "Registered nurse. Pediatric patient care and triage.",
    "Accountant. Bookkeeping, payroll and quarterly tax filings.",
    "Chef. Menu planning, pastry and kitchen management.",
    "Truck driver. Long haul logistics with a clean record.",
];

#[derive(Default)]
pub struct ResumeBuilder {
    name: Option<String>,
    email: Option<String>,
    headline: Option<String>,
    skills: Vec<String>,
    years: Option<u32>,
    known_skills: Option<Vec<String>>,
}

impl ResumeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn headline(mut self, headline: &str) -> Self {
        self.headline = Some(headline.to_string());
        self
    }

    pub fn skills(mut self, skills: &[&str]) -> Self {
        self.skills = skills.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn years(mut self, years: u32) -> Self {
        self.years = Some(years);
        self
    }

    /// Skills supplied by the caller instead of extracted from the text.
    pub fn known_skills(mut self, skills: &[&str]) -> Self {
        self.known_skills = Some(skills.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn text(&self) -> String {
        let mut lines = Vec::new();
        if let Some(name) = &self.name {
            lines.push(name.clone());
        }
        if let Some(email) = &self.email {
            lines.push(email.clone());
        }
        if let Some(headline) = &self.headline {
            lines.push(headline.clone());
        }
        if !self.skills.is_empty() {
            match self.years {
                Some(years) => lines.push(format!(
                    "{years} years of experience in {}.",
                    self.skills.join(", ")
                )),
                None => lines.push(format!("Skills: {}.", self.skills.join(", "))),
            }
        }
        lines.join("\n")
    }

    pub fn build(self, id: ResumeId) -> ResumeRecord {
        let record = ResumeRecord::new(id, self.text());
        match self.known_skills {
            Some(skills) => record.with_skills(skills),
            None => record,
        }
    }
}

/// A backend resume sharing most terms with [`BACKEND_QUERY`].
pub fn aligned_resume(id: ResumeId) -> ResumeRecord {
    ResumeBuilder::new()
        .name(&format!("Candidate Number{id}"))
        .headline(&format!("Backend engineer #{id} building Python web services."))
        .skills(&ALIGNED_SKILLS)
        .years(3 + (id % 7) as u32)
        .build(id)
}

/// A resume from an unrelated field.
pub fn unrelated_resume(id: ResumeId) -> ResumeRecord {
    let role = UNRELATED_ROLES[(id as usize) % UNRELATED_ROLES.len()];
    ResumeBuilder::new()
        .name(&format!("Other Person{id}"))
        .headline(&format!("{role} Reference {id}."))
        .build(id)
}

/// `aligned` backend resumes followed by `unrelated` ones, ids from 1.
pub fn mixed_corpus(aligned: usize, unrelated: usize) -> Vec<ResumeRecord> {
    let aligned_ids = 1..=aligned as ResumeId;
    let unrelated_ids = (aligned as ResumeId + 1)..=(aligned + unrelated) as ResumeId;
    aligned_ids
        .map(aligned_resume)
        .chain(unrelated_ids.map(unrelated_resume))
        .collect()
}

pub fn stub_pipeline() -> RankingPipeline<MemoryVectorDb> {
    stub_pipeline_with(Config::stub())
}

pub fn stub_pipeline_with(config: Config) -> RankingPipeline<MemoryVectorDb> {
    RankingPipeline::new(config, Arc::new(MemoryVectorDb::new()))
        .expect("stub pipeline should build")
}

use crate::constants::MAX_SKILLS;

/// Built-in skill vocabulary: languages, web stacks, databases, cloud/devops, data/ML and
/// methodology terms.
const BUILTIN_SKILLS: &[&str] = &[
    // Languages
    "Python", "Java", "JavaScript", "TypeScript", "C++", "C#", "Ruby", "Go", "Rust", "PHP",
    "Swift", "Kotlin", "R", "MATLAB", "Scala", "Perl", "Shell", "Bash",
    // Web
    "HTML", "CSS", "React", "Angular", "Vue", "Node.js", "Express", "Django", "Flask",
    "FastAPI", "Spring", "ASP.NET", "Laravel", "Rails", "Next.js", "Nuxt",
    // Databases
    "SQL", "MySQL", "PostgreSQL", "MongoDB", "Redis", "Oracle", "Cassandra", "DynamoDB",
    "SQLite", "MariaDB", "Elasticsearch", "Neo4j",
    // Cloud & DevOps
    "AWS", "Azure", "GCP", "Docker", "Kubernetes", "Jenkins", "GitLab", "GitHub Actions",
    "Terraform", "Ansible", "CI/CD", "Linux", "Unix",
    // Data & ML
    "Machine Learning", "Deep Learning", "TensorFlow", "PyTorch", "Scikit-learn", "Pandas",
    "NumPy", "Keras", "NLP", "Computer Vision", "Data Analysis", "Statistics",
    // Tools & practices
    "Git", "REST API", "GraphQL", "Microservices", "Agile", "Scrum", "JIRA", "Confluence",
];

/// Case-insensitive whole-word skill matcher over a fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillVocabulary {
    terms: Vec<String>,
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SkillVocabulary {
    pub fn builtin() -> Self {
        Self::from_terms(BUILTIN_SKILLS.iter().copied())
    }

    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self { terms: Vec::new() }.with_extra(terms)
    }

    /// Adds configured terms (blank and duplicate entries are ignored).
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in extra {
            let term = term.as_ref().trim().to_lowercase();
            if !term.is_empty() && !self.terms.contains(&term) {
                self.terms.push(term);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.iter().any(|t| t == &term.to_lowercase())
    }

    /// Vocabulary terms found in `text`: lowercased, deduplicated, sorted, at most
    /// [`MAX_SKILLS`].
    pub fn find(&self, text: &str) -> Vec<String> {
        let haystack = text.to_lowercase();
        let mut found: Vec<String> = self
            .terms
            .iter()
            .filter(|term| contains_whole_word(&haystack, term))
            .take(MAX_SKILLS)
            .cloned()
            .collect();
        found.sort();
        found
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `term` occurs in `haystack` not flanked by word characters; a term ending in a word
/// character must also not run into `+`/`#` (so `c` never matches inside `c++`).
fn contains_whole_word(haystack: &str, term: &str) -> bool {
    let ends_in_word_char = term.chars().next_back().is_some_and(is_word_char);

    haystack.match_indices(term).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();

        let left_ok = before.is_none_or(|c| !is_word_char(c));
        let right_ok = after.is_none_or(|c| {
            !is_word_char(c) && !(ends_in_word_char && (c == '+' || c == '#'))
        });
        left_ok && right_ok
    })
}

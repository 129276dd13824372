use super::prompts::{explanation_prompt, trim_reply};
use super::*;
use crate::constants::{
    EXCERPT_CHARS, EXPLANATION_EXCERPT_CHARS, EXPLANATION_REPLY_CHARS,
    EXPLANATION_REQUIREMENTS_CHARS,
};

fn skills(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn request() -> ExplanationRequest {
    ExplanationRequest::new(
        7,
        1,
        87.4,
        "Jane Doe",
        "Python, Django and AWS experience required",
        "Jane Doe\nBuilt Django services on AWS with Python",
        &skills(&["aws", "django", "python"]),
    )
}

mod fallback_tests {
    use super::*;

    #[test]
    fn test_excerpt_short_text_unchanged() {
        assert_eq!(excerpt_summary("  Rust engineer  "), "Rust engineer");
    }

    #[test]
    fn test_excerpt_long_text_truncated() {
        let text = "a".repeat(EXCERPT_CHARS + 50);
        let excerpt = excerpt_summary(&text);
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), EXCERPT_CHARS + 3);
    }

    #[test]
    fn test_excerpt_never_empty() {
        assert!(!excerpt_summary("").is_empty());
        assert!(!excerpt_summary(" \n ").is_empty());
    }

    #[test]
    fn test_template_uses_top_five_skills() {
        let text = template_explanation(
            2,
            73.6,
            &skills(&["aws", "docker", "go", "java", "python", "rust"]),
        );
        assert_eq!(
            text,
            "Ranked #2 with a 74% match score. Key skills: aws, docker, go, java, python."
        );
    }

    #[test]
    fn test_template_without_skills() {
        let text = template_explanation(1, 50.0, &[]);
        assert!(text.starts_with("Ranked #1 with a 50% match score."));
    }
}

mod config_tests {
    use super::*;

    #[test]
    fn test_explainer_backend_parse() {
        assert_eq!(ExplainerBackend::parse(""), ExplainerBackend::Disabled);
        assert_eq!(ExplainerBackend::parse("none"), ExplainerBackend::Disabled);
        assert_eq!(ExplainerBackend::parse("STUB"), ExplainerBackend::Stub);
        assert_eq!(
            ExplainerBackend::parse(" gpt-4o-mini "),
            ExplainerBackend::Chat("gpt-4o-mini".to_string())
        );
    }

    #[test]
    fn test_explainer_config_validate() {
        assert!(ExplainerConfig::default().validate().is_ok());

        let mut config = ExplainerConfig::stub();
        config.temperature = 3.0;
        assert!(config.validate().is_err());

        let mut config = ExplainerConfig::stub();
        config.max_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summarizer_config_validate() {
        assert!(SummarizerConfig::default().validate().is_ok());
        let mut config = SummarizerConfig::stub();
        config.max_new_tokens = 0;
        assert!(matches!(
            config.validate(),
            Err(GenerationError::InvalidConfig { .. })
        ));
    }
}

#[test]
fn test_request_bounds_inputs() {
    let long_req = "r".repeat(EXPLANATION_REQUIREMENTS_CHARS * 2);
    let long_resume = "x".repeat(EXPLANATION_EXCERPT_CHARS * 2);
    let req = ExplanationRequest::new(1, 1, 50.0, "A", &long_req, &long_resume, &[]);

    assert_eq!(req.job_requirements.chars().count(), EXPLANATION_REQUIREMENTS_CHARS);
    assert_eq!(req.resume_excerpt.chars().count(), EXPLANATION_EXCERPT_CHARS);
}

#[test]
fn test_prompt_mentions_inputs() {
    let prompt = explanation_prompt(&request());
    assert!(prompt.contains("Python, Django and AWS experience required"));
    assert!(prompt.contains("Skills: aws, django, python"));
    assert!(prompt.contains("ranked #1, 87% match"));
}

#[test]
fn test_trim_reply() {
    assert_eq!(trim_reply("   "), None);
    assert_eq!(trim_reply(" Good fit. ").as_deref(), Some("Good fit."));

    let long = "y".repeat(EXPLANATION_REPLY_CHARS + 20);
    let trimmed = trim_reply(&long).unwrap();
    assert!(trimmed.ends_with("..."));
    assert_eq!(trimmed.chars().count(), EXPLANATION_REPLY_CHARS + 3);
}

#[tokio::test]
async fn test_stub_explainer_names_shared_terms() {
    let explainer = LlmExplainer::stub().unwrap();
    let explanation = explainer.explain(&request()).await.unwrap();
    assert_eq!(explanation, "Jane Doe matches the role on aws, django, python.");
}

#[tokio::test]
async fn test_stub_explainer_without_overlap() {
    let explainer = LlmExplainer::stub().unwrap();
    let req = ExplanationRequest::new(1, 3, 10.0, "John Smith", "Rust", "Nurse", &[]);
    let explanation = explainer.explain(&req).await.unwrap();
    assert!(explanation.starts_with("John Smith shows little direct overlap"));
}

#[test]
fn test_disabled_explainer_is_not_available() {
    assert!(matches!(
        LlmExplainer::new(ExplainerConfig::disabled()),
        Err(GenerationError::NotAvailable { .. })
    ));
}

#[test]
fn test_stub_summarizer_through_trait() {
    let summarizer: Box<dyn Summarize> = Box::new(Summarizer::stub().unwrap());
    let summary = summarizer
        .summarize("Senior Rust engineer. Ten years of systems work. Likes hiking.")
        .unwrap();
    assert_eq!(summary, "Senior Rust engineer. Ten years of systems work.");
}

use super::*;

const SAMPLE_CORPUS: &str = r#"[
  {
    "personalInfo": {
      "name": "Lucía Fernández",
      "email": "lucia@example.com",
      "phone": "+51 555 123 456",
      "city": "Lima"
    },
    "summary": "Backend engineer focused on distributed systems.",
    "experience": [
      {"title": "Senior Developer", "company": "Acme", "startDate": "March 2021", "endDate": "Present", "description": "Led the payments platform migration."},
      {"title": "Developer", "company": "Globex", "startDate": "May 2019", "endDate": "February 2021", "description": "Built internal tooling."},
      {"title": "Intern", "company": "Initech", "startDate": "June 2018", "endDate": "April 2019", "description": "Wrote tests."},
      {"title": "Assistant", "company": "Hooli", "startDate": "January 2017", "endDate": "May 2018", "description": "Answered tickets."}
    ],
    "education": {"degree": "Computer Science", "university": "UNI", "startYear": 2013, "endYear": 2017},
    "skills": {
      "technical": ["Rust", "Go", "SQL", "Kubernetes", "AWS", "Docker", "Terraform"],
      "soft": ["Leadership", "Communication", "Mentoring", "Empathy"]
    },
    "languages": [
      {"name": "Spanish", "level": "Native"},
      {"name": "English", "level": "C1"},
      {"name": "Portuguese", "level": "B1"},
      {"name": "French", "level": "A2"}
    ],
    "certifications": ["AWS Certified Solutions Architect"]
  },
  {
    "personalInfo": {"name": "Diego Ramos", "email": "diego@example.com"},
    "summary": "Data analyst.",
    "experience": [],
    "education": {"degree": "Statistics", "university": "PUCP"},
    "skills": {"technical": ["Python"], "soft": []},
    "languages": []
  }
]"#;

#[test]
fn parse_assigns_sequential_ids() {
    let documents = parse_corpus(SAMPLE_CORPUS).expect("corpus should parse");

    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].document_id, 1);
    assert_eq!(documents[0].display_name, "Lucía Fernández");
    assert_eq!(documents[1].document_id, 2);
}

#[test]
fn record_is_truncated() {
    let documents = parse_corpus(SAMPLE_CORPUS).expect("corpus should parse");
    let first = &documents[0];

    assert_eq!(first.experience.len(), MAX_EXPERIENCE_ENTRIES);
    assert_eq!(first.experience[0].company, "Acme");
    assert_eq!(first.technical_skills.len(), MAX_TECHNICAL_SKILLS);
    assert!(!first.technical_skills.contains(&"Terraform".to_string()));
    assert_eq!(first.soft_skills.len(), MAX_SOFT_SKILLS);
    assert_eq!(first.languages.len(), MAX_LANGUAGES);
}

#[test]
fn render_text_layout() {
    let documents = parse_corpus(SAMPLE_CORPUS).expect("corpus should parse");
    let text = documents[0].render_text();

    assert!(text.starts_with("Name: Lucía Fernández\nEmail: lucia@example.com\n"));
    assert!(text.contains("1. Senior Developer at Acme\n   March 2021 - Present\n"));
    assert!(text.contains("Education: Computer Science from UNI\nPeriod: 2013 - 2017\n"));
    assert!(text.contains("Technical Skills: Rust, Go, SQL, Kubernetes, AWS, Docker\n"));
    assert!(text.contains("Languages: Spanish (Native), English (C1), Portuguese (B1), \n"));
    assert!(!text.contains("Hooli"));
}

#[test]
fn render_text_handles_missing_fields() {
    let documents = parse_corpus(SAMPLE_CORPUS).expect("corpus should parse");
    let text = documents[1].render_text();

    assert!(text.contains("Experience:\nEducation: Statistics from PUCP\n"));
    assert!(text.contains("Period: ? - ?\n"));
    assert!(text.contains("Soft Skills: \n"));
}

#[test]
fn description_preview_respects_char_boundaries() {
    let mut documents = parse_corpus(SAMPLE_CORPUS).expect("corpus should parse");
    documents[0].experience[0].description = "ñ".repeat(400);

    let text = documents[0].render_text();
    let expected = format!("   {}...\n", "ñ".repeat(DESCRIPTION_PREVIEW_CHARS));
    assert!(text.contains(&expected));
}

#[test]
fn malformed_corpus_is_rejected() {
    assert!(parse_corpus("{\"not\": \"an array\"}").is_err());
    assert!(parse_corpus("[{\"summary\": \"no personal info\"}]").is_err());
}

#[tokio::test]
async fn load_corpus_from_disk() {
    let temp_dir = tempfile::TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("cv_data.json");
    tokio::fs::write(&path, SAMPLE_CORPUS)
        .await
        .expect("should write corpus");

    let documents = load_corpus(&path).await.expect("should load corpus");
    assert_eq!(documents.len(), 2);

    let missing = load_corpus(&temp_dir.path().join("missing.json")).await;
    assert!(matches!(missing, Err(RagError::Storage(_))));
}

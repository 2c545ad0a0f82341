//! Source résumés and their compact text form.
//!
//! The upstream generator writes an array of résumés as JSON. Only a trimmed
//! summary of each one is kept: the three most recent jobs, the first six
//! technical skills, three soft skills and three languages. That summary is
//! what gets chunked and embedded.

#[cfg(test)]
mod tests;

use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{RagError, Result};

pub const MAX_EXPERIENCE_ENTRIES: usize = 3;
pub const MAX_TECHNICAL_SKILLS: usize = 6;
pub const MAX_SOFT_SKILLS: usize = 3;
pub const MAX_LANGUAGES: usize = 3;
pub const DESCRIPTION_PREVIEW_CHARS: usize = 150;

/// One résumé as written by the generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub experience: Vec<Experience>,
    pub education: Education,
    #[serde(default)]
    pub skills: Skills,
    #[serde(default)]
    pub languages: Vec<Language>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub degree: String,
    pub university: String,
    #[serde(default)]
    pub start_year: Option<u32>,
    #[serde(default)]
    pub end_year: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default)]
    pub technical: Vec<String>,
    #[serde(default)]
    pub soft: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub level: String,
}

/// A résumé reduced to the fields that are indexed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// 1-based position in the ingestion input
    pub document_id: u32,
    pub display_name: String,
    pub email: String,
    pub summary: String,
    pub experience: Vec<Experience>,
    pub education: Education,
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub languages: Vec<Language>,
}

impl SourceDocument {
    #[inline]
    pub fn from_record(document_id: u32, record: ResumeRecord) -> Self {
        let ResumeRecord {
            personal_info,
            summary,
            mut experience,
            education,
            mut skills,
            mut languages,
        } = record;

        experience.truncate(MAX_EXPERIENCE_ENTRIES);
        skills.technical.truncate(MAX_TECHNICAL_SKILLS);
        skills.soft.truncate(MAX_SOFT_SKILLS);
        languages.truncate(MAX_LANGUAGES);

        Self {
            document_id,
            display_name: personal_info.name,
            email: personal_info.email,
            summary,
            experience,
            education,
            technical_skills: skills.technical,
            soft_skills: skills.soft,
            languages,
        }
    }

    /// Render the compact text that is chunked for embedding
    #[inline]
    pub fn render_text(&self) -> String {
        let mut text = String::new();

        let _ = writeln!(text, "Name: {}", self.display_name);
        let _ = writeln!(text, "Email: {}", self.email);
        let _ = writeln!(text, "Summary: {}\n", self.summary);

        text.push_str("Experience:\n");
        for (index, exp) in self.experience.iter().enumerate() {
            let preview: String = exp
                .description
                .chars()
                .take(DESCRIPTION_PREVIEW_CHARS)
                .collect();
            let _ = writeln!(text, "{}. {} at {}", index + 1, exp.title, exp.company);
            let _ = writeln!(text, "   {} - {}", exp.start_date, exp.end_date);
            let _ = writeln!(text, "   {}...\n", preview);
        }

        let _ = writeln!(
            text,
            "Education: {} from {}",
            self.education.degree, self.education.university
        );
        let _ = writeln!(
            text,
            "Period: {} - {}\n",
            year_or_unknown(self.education.start_year),
            year_or_unknown(self.education.end_year)
        );

        let _ = writeln!(
            text,
            "Technical Skills: {}",
            self.technical_skills.join(", ")
        );
        let _ = writeln!(text, "Soft Skills: {}\n", self.soft_skills.join(", "));

        text.push_str("Languages: ");
        for lang in &self.languages {
            let _ = write!(text, "{} ({}), ", lang.name, lang.level);
        }
        text.push('\n');

        text
    }
}

fn year_or_unknown(year: Option<u32>) -> String {
    year.map_or_else(|| "?".to_string(), |y| y.to_string())
}

/// Parse the generator's JSON array into source documents
#[inline]
pub fn parse_corpus(json: &str) -> Result<Vec<SourceDocument>> {
    let records: Vec<ResumeRecord> = serde_json::from_str(json)?;

    let documents = records
        .into_iter()
        .zip(1_u32..)
        .map(|(record, document_id)| SourceDocument::from_record(document_id, record))
        .collect::<Vec<_>>();

    debug!("Parsed {} résumés", documents.len());
    Ok(documents)
}

/// Read and parse a corpus file
#[inline]
pub async fn load_corpus(path: &Path) -> Result<Vec<SourceDocument>> {
    let json = tokio::fs::read_to_string(path).await.map_err(|e| {
        RagError::Storage(format!(
            "Failed to read corpus file {}: {}",
            path.display(),
            e
        ))
    })?;

    let documents = parse_corpus(&json)?;
    info!(
        "Loaded {} résumés from {}",
        documents.len(),
        path.display()
    );
    Ok(documents)
}

//! Report records written as JSON.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    HeadingLevel, JobToBeDone, Outline, Persona, ScoredSection, SubSectionHit,
};

/// Result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,

    /// Ranked sections, best first
    pub extracted_sections: Vec<ExtractedSection>,

    /// Best sentences from the top sections
    pub sub_section_analysis: Vec<SubSectionAnalysis>,
}

impl Report {
    /// Assemble a report; section content is dropped here.
    pub fn new(
        metadata: ReportMetadata,
        sections: &[ScoredSection],
        hits: &[SubSectionHit],
    ) -> Self {
        Self {
            metadata,
            extracted_sections: sections.iter().map(ExtractedSection::from).collect(),
            sub_section_analysis: hits.iter().map(SubSectionAnalysis::from).collect(),
        }
    }
}

/// Run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// File names of every input PDF, failed ones included
    pub input_documents: Vec<String>,

    pub persona: Persona,

    pub job_to_be_done: JobToBeDone,

    /// When the run finished (UTC)
    pub processing_timestamp: DateTime<Utc>,

    /// Wall-clock duration, rounded to 2 decimals
    pub processing_time_seconds: f64,

    /// Documents that could not be processed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_documents: Vec<FailedDocument>,
}

impl ReportMetadata {
    pub fn new(input_documents: Vec<String>, persona: Persona, job_to_be_done: JobToBeDone) -> Self {
        Self {
            input_documents,
            persona,
            job_to_be_done,
            processing_timestamp: Utc::now(),
            processing_time_seconds: 0.0,
            failed_documents: Vec::new(),
        }
    }

    /// Stamp the finish time and elapsed duration.
    pub fn finish(mut self, elapsed: Duration) -> Self {
        self.processing_timestamp = Utc::now();
        self.processing_time_seconds = round_seconds(elapsed);
        self
    }

    pub fn with_failures(mut self, failed: Vec<FailedDocument>) -> Self {
        self.failed_documents = failed;
        self
    }
}

/// A document skipped because it failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedDocument {
    pub document: String,
    pub error: String,
}

/// A ranked section as reported (no content).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub page_number: u32,
    pub section_title: String,
    pub relevance_score: f32,
    pub importance_rank: usize,
}

impl From<&ScoredSection> for ExtractedSection {
    fn from(scored: &ScoredSection) -> Self {
        Self {
            document: scored.document.clone(),
            page_number: scored.section.page,
            section_title: scored.section.text.clone(),
            relevance_score: scored.relevance_score,
            importance_rank: scored.importance_rank,
        }
    }
}

/// A sentence hit as reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubSectionAnalysis {
    pub document: String,
    pub original_section_title: String,
    pub refined_text: String,
    pub page_number: u32,
    pub relevance_score: f32,
}

impl From<&SubSectionHit> for SubSectionAnalysis {
    fn from(hit: &SubSectionHit) -> Self {
        Self {
            document: hit.document.clone(),
            original_section_title: hit.original_section_title.clone(),
            refined_text: hit.refined_text.clone(),
            page_number: hit.page,
            relevance_score: hit.relevance_score,
        }
    }
}

/// Single-document outline file: `{"title": ..., "outline": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineReport {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
}

/// One heading of an [`OutlineReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: HeadingLevel,
    pub text: String,
    pub page: u32,
}

impl From<&Outline> for OutlineReport {
    fn from(outline: &Outline) -> Self {
        Self {
            title: outline.title.clone(),
            outline: outline
                .sections
                .iter()
                .map(|s| OutlineEntry {
                    level: s.level,
                    text: s.text.clone(),
                    page: s.page,
                })
                .collect(),
        }
    }
}

/// Seconds rounded to two decimals.
pub fn round_seconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}

//! Persona, job-to-be-done and the query text derived from them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Who the analysis is for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Persona {
    /// Role description, e.g. "Investment Analyst"
    pub role_description: String,

    /// Topics the persona cares about
    pub focus_areas: Vec<String>,

    /// Other keys from persona.json, echoed back unchanged in the report
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What the persona is trying to get done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobToBeDone {
    /// Task description
    pub task: String,

    /// Other keys from persona.json, echoed back unchanged in the report
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The contents of `persona.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub persona: Persona,
    #[serde(default)]
    pub job_to_be_done: JobToBeDone,
}

impl AnalysisRequest {
    pub fn new(persona: Persona, job_to_be_done: JobToBeDone) -> Self {
        Self {
            persona,
            job_to_be_done,
        }
    }

    /// Build the query text that sections and sentences are compared against.
    pub fn query(&self) -> Query {
        let mut parts = Vec::with_capacity(3);
        let role = self.persona.role_description.trim();
        if !role.is_empty() {
            parts.push(format!("{}.", role));
        }
        let areas: Vec<&str> = self
            .persona
            .focus_areas
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();
        if !areas.is_empty() {
            parts.push(format!("Focus areas: {}.", areas.join(", ")));
        }
        let task = self.job_to_be_done.task.trim();
        if !task.is_empty() {
            parts.push(format!("Task: {}", task));
        }
        Query(parts.join(" "))
    }
}

impl Default for AnalysisRequest {
    /// The built-in investment analyst request used when no persona.json exists.
    fn default() -> Self {
        Self {
            persona: Persona {
                role_description: "Investment Analyst".to_string(),
                focus_areas: vec![
                    "revenue trends".to_string(),
                    "R&D investments".to_string(),
                    "market positioning".to_string(),
                ],
                ..Default::default()
            },
            job_to_be_done: JobToBeDone {
                task: "Analyze revenue trends, R&D investments, and market positioning \
                       strategies from the provided annual reports"
                    .to_string(),
                ..Default::default()
            },
        }
    }
}

/// Query text built once per analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Use an arbitrary string as the query.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Query {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_text() {
        let request = AnalysisRequest::new(
            Persona {
                role_description: "PhD Researcher".to_string(),
                focus_areas: vec!["graph neural networks".to_string(), "benchmarks".to_string()],
                ..Default::default()
            },
            JobToBeDone {
                task: "Prepare a literature review".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(
            request.query().as_str(),
            "PhD Researcher. Focus areas: graph neural networks, benchmarks. \
             Task: Prepare a literature review"
        );
    }

    #[test]
    fn test_query_without_focus_areas() {
        let request = AnalysisRequest::new(
            Persona {
                role_description: "Student".to_string(),
                focus_areas: vec![],
                ..Default::default()
            },
            JobToBeDone {
                task: "Study kinetics".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(request.query().as_str(), "Student. Task: Study kinetics");
    }

    #[test]
    fn test_default_request() {
        let request = AnalysisRequest::default();
        assert_eq!(request.persona.role_description, "Investment Analyst");
        assert_eq!(request.persona.focus_areas.len(), 3);
        assert!(request.query().as_str().contains("R&D investments"));
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let request: AnalysisRequest =
            serde_json::from_str(r#"{"persona": {"role_description": "Chef"}}"#).unwrap();
        assert_eq!(request.persona.role_description, "Chef");
        assert!(request.persona.focus_areas.is_empty());
        assert_eq!(request.job_to_be_done.task, "");
    }

    #[test]
    fn test_extra_keys_survive_a_round_trip() {
        let request: AnalysisRequest = serde_json::from_str(
            r#"{"persona": {"role_description": "Chef", "seniority": "head", "years": 12},
                "job_to_be_done": {"task": "Plan a menu", "deadline": "Friday"}}"#,
        )
        .unwrap();
        assert_eq!(request.persona.extra["seniority"], "head");
        assert_eq!(request.job_to_be_done.extra["deadline"], "Friday");
        assert_eq!(request.query().as_str(), "Chef. Task: Plan a menu");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["persona"]["years"], 12);
        assert_eq!(json["job_to_be_done"]["deadline"], "Friday");
    }
}

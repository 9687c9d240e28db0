//! Ranking request read from the input JSON.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Error, Result};

/// Who is asking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub role: String,
}

/// What they want to get done.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobToBeDone {
    pub task: String,
}

/// A requested document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Source file name, e.g. `report.pdf`
    pub filename: String,

    /// Optional human title supplied by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl DocumentRef {
    /// Reference a document by file name.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            title: None,
        }
    }
}

/// Optional bookkeeping block some callers attach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeInfo {
    pub challenge_id: String,
    pub test_case_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A persona/task ranking request over a set of documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankRequest {
    pub persona: Persona,
    pub job_to_be_done: JobToBeDone,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_info: Option<ChallengeInfo>,
}

impl RankRequest {
    /// Build a request in code.
    pub fn new(role: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            persona: Persona { role: role.into() },
            job_to_be_done: JobToBeDone { task: task.into() },
            documents: Vec::new(),
            challenge_info: None,
        }
    }

    /// Add a requested document.
    pub fn with_document(mut self, filename: impl Into<String>) -> Self {
        self.documents.push(DocumentRef::new(filename));
        self
    }

    /// Read and validate a request file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let request: Self = serde_json::from_reader(BufReader::new(file))?;
        request.validate()?;
        Ok(request)
    }

    /// Reject requests naming a document without a file name.
    pub fn validate(&self) -> Result<()> {
        if let Some(pos) = self
            .documents
            .iter()
            .position(|d| d.filename.trim().is_empty())
        {
            return Err(Error::InvalidRequest(format!(
                "document #{} has an empty filename",
                pos + 1
            )));
        }
        Ok(())
    }

    /// Requested file names in request order.
    pub fn filenames(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.filename.clone()).collect()
    }

    /// The embedding query: `"{persona}: {task}"`.
    pub fn query(&self) -> String {
        format!("{}: {}", self.persona.role, self.job_to_be_done.task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "challenge_info": {"challenge_id": "round_1b_002", "test_case_name": "travel_planner"},
        "documents": [{"filename": "South of France - Cities.pdf", "title": "Cities"}],
        "persona": {"role": "Travel Planner"},
        "job_to_be_done": {"task": "Plan a trip of 4 days for a group of 10 college friends."}
    }"#;

    #[test]
    fn test_parse_request() {
        let request: RankRequest = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(request.persona.role, "Travel Planner");
        assert_eq!(request.filenames(), ["South of France - Cities.pdf"]);
        assert_eq!(
            request.challenge_info.as_ref().map(|c| c.test_case_name.as_str()),
            Some("travel_planner")
        );
    }

    #[test]
    fn test_query_format() {
        let request = RankRequest::new("HR professional", "Create fillable forms");
        assert_eq!(request.query(), "HR professional: Create fillable forms");
    }

    #[test]
    fn test_documents_default_empty() {
        let request: RankRequest =
            serde_json::from_str(r#"{"persona":{"role":"r"},"job_to_be_done":{"task":"t"}}"#)
                .unwrap();
        assert!(request.documents.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_filename() {
        let request = RankRequest::new("r", "t")
            .with_document("a.pdf")
            .with_document("  ");
        let err = request.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(err.to_string().contains("#2"));
    }
}

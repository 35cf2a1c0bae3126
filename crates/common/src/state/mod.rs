//! Research state threaded through the pipeline stages
//!
//! A `StateModel` is never edited in place: each stage consumes the value
//! it was given and hands back a new one.

use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A research query that is known to contain non-whitespace text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResearchQuery(String);

impl ResearchQuery {
    /// Validate caller input. The text is kept verbatim.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(AppError::Validation {
                message: "query must not be empty".to_string(),
                field: Some("query".to_string()),
            });
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ResearchQuery {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ResearchQuery> for String {
    fn from(query: ResearchQuery) -> Self {
        query.0
    }
}

impl fmt::Display for ResearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State carried from one stage to the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateModel {
    query: ResearchQuery,
    results: String,
    sources: Vec<String>,
    response: String,
}

impl StateModel {
    /// Initial state: evidence and response start empty
    pub fn new(query: ResearchQuery) -> Self {
        Self {
            query,
            results: String::new(),
            sources: Vec::new(),
            response: String::new(),
        }
    }

    /// Rebuild a state from its four recorded fields
    pub(crate) fn from_parts(
        query: ResearchQuery,
        results: String,
        sources: Vec<String>,
        response: String,
    ) -> Self {
        Self {
            query,
            results,
            sources,
            response,
        }
    }

    /// Replace the evidence text and its sources wholesale
    pub fn with_evidence(self, results: String, sources: Vec<String>) -> Self {
        Self {
            results,
            sources,
            ..self
        }
    }

    /// Replace the drafted answer
    pub fn with_response(self, response: String) -> Self {
        Self { response, ..self }
    }

    pub fn query(&self) -> &ResearchQuery {
        &self.query
    }

    /// Concatenated evidence text; empty when nothing was found
    pub fn results(&self) -> &str {
        &self.results
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Drafted answer; empty when not produced
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Split into the caller-facing pair
    pub fn into_answer(self) -> (String, Vec<String>) {
        (self.response, self.sources)
    }
}

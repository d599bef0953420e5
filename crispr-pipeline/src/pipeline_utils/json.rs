//! JSON utilities for language-model completions
//!
//! Completions are asked for bare JSON but often arrive wrapped in markdown
//! fences. Parsing strips one leading and one trailing fence and then fails
//! loudly: there is no partial result and no repair.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Characters of offending content kept for diagnostics
const SNIPPET_LEN: usize = 100;

/// Malformed completion text
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("completion text is empty")]
    Empty,

    #[error("invalid JSON response: {source} (content: {snippet})")]
    InvalidJson {
        snippet: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON response has unexpected shape: {source} (content: {snippet})")]
    UnexpectedShape {
        snippet: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ParseError {
    /// Well-formed JSON that lacks the structure a caller expects
    pub fn unexpected_shape(text: &str, reason: impl fmt::Display) -> Self {
        ParseError::UnexpectedShape {
            snippet: snippet(strip_code_fence(text)),
            source: serde::de::Error::custom(reason),
        }
    }

    /// Leading part of the content that failed to parse, if any
    pub fn snippet(&self) -> Option<&str> {
        match self {
            ParseError::Empty => None,
            ParseError::InvalidJson { snippet, .. } | ParseError::UnexpectedShape { snippet, .. } => {
                Some(snippet)
            }
        }
    }
}

/// Strip markdown code fences from a completion
///
/// Handles:
/// - A leading ```json or ``` fence
/// - A trailing ``` fence
/// - Surrounding whitespace
pub fn strip_code_fence(text: &str) -> &str {
    let mut content = text.trim();

    if let Some(rest) = content.strip_prefix("```json") {
        content = rest;
    } else if let Some(rest) = content.strip_prefix("```") {
        content = rest;
    }

    if let Some(rest) = content.strip_suffix("```") {
        content = rest;
    }

    let content = content.trim();
    if content.contains('`') {
        tracing::warn!("completion still contains backticks after fence removal");
    }
    content
}

fn snippet(content: &str) -> String {
    content.chars().take(SNIPPET_LEN).collect()
}

/// Parse completion text as an untyped JSON value
pub fn parse_json_value(text: &str) -> Result<Value, ParseError> {
    let content = strip_code_fence(text);
    if content.is_empty() {
        return Err(ParseError::Empty);
    }

    serde_json::from_str(content).map_err(|source| {
        tracing::debug!(content = %content, "failed to parse completion as JSON");
        ParseError::InvalidJson {
            snippet: snippet(content),
            source,
        }
    })
}

/// Parse completion text into a typed structure
///
/// Syntax errors surface as [`ParseError::InvalidJson`]; well-formed JSON that
/// does not fit `T` surfaces as [`ParseError::UnexpectedShape`].
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, ParseError> {
    let value = parse_json_value(text)?;
    serde_json::from_value(value).map_err(|source| ParseError::UnexpectedShape {
        snippet: snippet(strip_code_fence(text)),
        source,
    })
}

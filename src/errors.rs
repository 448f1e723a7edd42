use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Format error: {0}")]
    Format(String),

    #[error("Validation error: {0}")]
    Validation(ValidationIssue),

    #[error(transparent)]
    LookupMiss(#[from] LookupMiss),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<quick_xml::Error> for CatalogError {
    fn from(e: quick_xml::Error) -> Self {
        CatalogError::Format(e.to_string())
    }
}

/// No message exists for the requested key. Callers display the source text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no translation for {context}::{source_text:?}")]
pub struct LookupMiss {
    pub context: String,
    pub source_text: String,
    pub comment: Option<String>,
}

/// A catalog entry that could not be loaded as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub context: Option<String>,
    pub kind: IssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    ContextWithoutName,
    MessageWithoutSource,
    DuplicateContext,
    DuplicateKey { source: String, comment: Option<String> },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let context = self.context.as_deref().unwrap_or("<unnamed>");
        match &self.kind {
            IssueKind::ContextWithoutName => write!(f, "context without a name"),
            IssueKind::MessageWithoutSource => {
                write!(f, "message without source text in context {context}")
            }
            IssueKind::DuplicateContext => write!(f, "context {context} declared more than once"),
            IssueKind::DuplicateKey { source, comment } => match comment {
                Some(comment) => write!(
                    f,
                    "duplicate message {source:?} ({comment}) in context {context}"
                ),
                None => write!(f, "duplicate message {source:?} in context {context}"),
            },
        }
    }
}

use crate::errors::CatalogResult;
use serde::{Deserialize, Serialize};

/// Schema version written by current Qt Linguist tools.
pub const DEFAULT_VERSION: &str = "2.1";

/// All contexts and messages for one target locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub version: String,
    pub language: Option<String>,
    pub source_language: Option<String>,
    pub contexts: Vec<Context>,
}

impl Catalog {
    pub fn new(language: impl Into<String>, source_language: impl Into<String>) -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            language: Some(language.into()),
            source_language: Some(source_language.into()),
            contexts: Vec::new(),
        }
    }

    /// Catalog for the source language itself. Every lookup misses.
    pub fn source_only(source_language: &str) -> Self {
        Self::new(source_language, source_language)
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    pub fn messages(&self) -> impl Iterator<Item = (&Context, &Message)> {
        self.contexts
            .iter()
            .flat_map(|c| c.messages.iter().map(move |m| (c, m)))
    }

    /// Pretty-printed JSON view of the catalog.
    pub fn to_json(&self) -> CatalogResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> CatalogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }

    /// (context, source, comment, translation, state) for every message, in
    /// document order.
    pub fn entries(&self) -> Vec<(&str, &str, Option<&str>, &str, CompletionState)> {
        self.messages()
            .map(|(c, m)| {
                (
                    c.name.as_str(),
                    m.source.as_str(),
                    m.comment.as_deref(),
                    m.translation.as_str(),
                    m.state,
                )
            })
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            contexts: self.contexts.len(),
            ..CatalogStats::default()
        };
        for (_, message) in self.messages() {
            stats.messages += 1;
            match message.state {
                CompletionState::Finished => {
                    stats.finished += 1;
                    if message.is_blank() {
                        stats.blank += 1;
                    }
                }
                CompletionState::Unfinished => stats.unfinished += 1,
            }
        }
        stats
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub contexts: usize,
    pub messages: usize,
    pub finished: usize,
    pub unfinished: usize,
    /// Finished messages with an empty translation.
    pub blank: usize,
}

/// Messages belonging to one dialog, widget or activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    pub messages: Vec<Message>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionState {
    #[default]
    Finished,
    Unfinished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub filename: Option<String>,
    /// Kept verbatim: Qt writes relative offsets such as `+3`.
    pub line: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub translation: String,
    pub state: CompletionState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translator_comment: Option<String>,
    #[serde(default)]
    pub numerus: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub numerus_forms: Vec<String>,
}

impl Message {
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            translation: translation.into(),
            ..Self::default()
        }
    }

    /// Message still waiting for a translator.
    pub fn unfinished(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            state: CompletionState::Unfinished,
            ..Self::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = normalize_comment(Some(comment.into()));
        self
    }

    pub fn with_location(mut self, filename: impl Into<String>, line: u32) -> Self {
        self.locations.push(Location {
            filename: Some(filename.into()),
            line: Some(line.to_string()),
        });
        self
    }

    pub fn is_finished(&self) -> bool {
        self.state == CompletionState::Finished
    }

    pub fn is_blank(&self) -> bool {
        if self.numerus {
            self.numerus_forms.iter().all(|f| f.is_empty())
        } else {
            self.translation.is_empty()
        }
    }

    /// Unfinished -> Finished: the translator supplied text.
    pub fn finish(&mut self, translation: impl Into<String>) {
        self.translation = translation.into();
        self.state = CompletionState::Finished;
    }

    /// Finished -> Unfinished: the upstream source changed and the old
    /// translation can no longer be trusted. The stale text is kept for the
    /// translator's reference but is never displayed.
    pub fn invalidate(&mut self) {
        self.state = CompletionState::Unfinished;
    }
}

/// Qt treats an empty disambiguation comment as no comment at all.
pub fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment.filter(|c| !c.is_empty())
}

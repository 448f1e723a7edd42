//! Runtime lookup of display text

use crate::errors::LookupMiss;
use crate::i18n::plural::plural_form;
use crate::models::{normalize_comment, Catalog, Message};
use std::collections::HashMap;

/// Composite lookup key. Two messages may share context and source text as
/// long as their disambiguation comments differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageKey {
    pub context: String,
    pub source: String,
    pub comment: Option<String>,
}

impl MessageKey {
    pub fn new(context: &str, source: &str, comment: Option<&str>) -> Self {
        Self {
            context: context.to_string(),
            source: source.to_string(),
            comment: normalize_comment(comment.map(str::to_string)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOrigin {
    /// A finished translation (possibly a deliberate blank).
    Translated,
    /// The message exists but is unfinished; this is the source text.
    SourceFallback,
}

/// Text to show for a resolved key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayText<'a> {
    pub text: &'a str,
    pub origin: TextOrigin,
}

impl DisplayText<'_> {
    pub fn is_translated(&self) -> bool {
        self.origin == TextOrigin::Translated
    }
}

impl AsRef<str> for DisplayText<'_> {
    fn as_ref(&self) -> &str {
        self.text
    }
}

/// Read-only lookup table over one loaded catalog.
///
/// A `Translator` never changes after construction, so it can be shared
/// between rendering threads behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct Translator {
    catalog: Catalog,
    index: HashMap<MessageKey, (usize, usize)>,
}

impl Translator {
    pub fn new(catalog: Catalog) -> Self {
        let mut index = HashMap::with_capacity(catalog.message_count());
        for (ci, context) in catalog.contexts.iter().enumerate() {
            for (mi, message) in context.messages.iter().enumerate() {
                let key = MessageKey::new(&context.name, &message.source, message.comment.as_deref());
                index.entry(key).or_insert((ci, mi));
            }
        }
        Self { catalog, index }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn language(&self) -> Option<&str> {
        self.catalog.language.as_deref()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn message(&self, context: &str, source: &str, comment: Option<&str>) -> Option<&Message> {
        let (ci, mi) = *self.index.get(&MessageKey::new(context, source, comment))?;
        Some(&self.catalog.contexts[ci].messages[mi])
    }

    /// Resolve a key to display text.
    ///
    /// Finished messages yield their translation, unfinished ones their
    /// source text. An unknown key is a [`LookupMiss`]; the caller shows the
    /// literal source text.
    pub fn resolve(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
    ) -> Result<DisplayText<'_>, LookupMiss> {
        let message = self
            .message(context, source, comment)
            .ok_or_else(|| miss(context, source, comment))?;
        Ok(display(message, &message.translation))
    }

    /// Like [`Translator::resolve`], picking the numerus form for `n`
    /// according to the catalog language. Non-numerus messages resolve as
    /// usual.
    pub fn resolve_plural(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
        n: usize,
    ) -> Result<DisplayText<'_>, LookupMiss> {
        let message = self
            .message(context, source, comment)
            .ok_or_else(|| miss(context, source, comment))?;
        if !message.numerus {
            return Ok(display(message, &message.translation));
        }

        let form = plural_form(self.language().unwrap_or_default(), n);
        match message.numerus_forms.get(form) {
            Some(text) => Ok(display(message, text)),
            None => Ok(DisplayText {
                text: &message.source,
                origin: TextOrigin::SourceFallback,
            }),
        }
    }

    /// Display text for the key, or `source` itself when the key is unknown.
    pub fn tr<'a>(&'a self, context: &str, source: &'a str, comment: Option<&str>) -> &'a str {
        match self.resolve(context, source, comment) {
            Ok(display) => display.text,
            Err(_) => source,
        }
    }
}

fn display<'a>(message: &'a Message, translation: &'a str) -> DisplayText<'a> {
    if message.is_finished() {
        DisplayText {
            text: translation,
            origin: TextOrigin::Translated,
        }
    } else {
        DisplayText {
            text: &message.source,
            origin: TextOrigin::SourceFallback,
        }
    }
}

fn miss(context: &str, source: &str, comment: Option<&str>) -> LookupMiss {
    LookupMiss {
        context: context.to_string(),
        source_text: source.to_string(),
        comment: comment.map(str::to_string),
    }
}

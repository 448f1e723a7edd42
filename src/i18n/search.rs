use crate::models::{Catalog, Message};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

#[derive(Debug, Clone)]
pub struct SearchHit<'a> {
    pub context: &'a str,
    pub message: &'a Message,
    pub score: i64,
}

/// Fuzzy search over source texts and translations, best matches first.
/// Ties keep document order.
pub fn search<'a>(catalog: &'a Catalog, query: &str, limit: usize) -> Vec<SearchHit<'a>> {
    let matcher = SkimMatcherV2::default();

    let mut hits: Vec<SearchHit<'a>> = catalog
        .messages()
        .filter_map(|(context, message)| {
            let source = matcher.fuzzy_match(&message.source, query);
            let translation = matcher.fuzzy_match(&message.translation, query);
            source.max(translation).map(|score| SearchHit {
                context: &context.name,
                message,
                score,
            })
        })
        .collect();

    hits.sort_by(|a, b| b.score.cmp(&a.score));
    hits.truncate(limit);
    hits
}

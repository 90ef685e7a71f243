use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::document::DocId;
use crate::index::InvertedIndex;
use crate::tokenizer::Tokenizer;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub doc_id: DocId,
    pub score: f32,
    pub matched_terms: BTreeSet<String>,
}

/// Ranked evaluation of a free-text query against an index snapshot.
///
/// The query is tokenized with the same analyzer used at index time, and each
/// matched posting contributes `tf * field_boost * idf(term)` to its
/// document's score. A term repeated in the query counts once. Documents
/// matching no query term are excluded, ties break by ascending doc id, and
/// `top_k` caps the result count. An empty query, or one composed entirely of
/// unknown terms, yields an empty result list.
pub fn search(
    index: &InvertedIndex,
    tokenizer: &Tokenizer,
    query: &str,
    top_k: usize,
) -> Vec<SearchResult> {
    if top_k == 0 {
        return Vec::new();
    }

    // Dedup while preserving token order so score accumulation stays
    // deterministic run to run.
    let mut terms: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for (term, _pos) in tokenizer.tokenize(query) {
        if seen.insert(term.clone()) {
            terms.push(term);
        }
    }
    if terms.is_empty() {
        return Vec::new();
    }

    let boosts = index.boosts();
    let mut scores: HashMap<DocId, f32> = HashMap::new();
    let mut matched: HashMap<DocId, BTreeSet<String>> = HashMap::new();
    for term in &terms {
        let idf = index.idf(term);
        for posting in index.postings_for(term) {
            let contrib = posting.term_frequency as f32 * boosts.for_field(posting.field) * idf;
            *scores.entry(posting.doc_id).or_insert(0.0) += contrib;
            matched.entry(posting.doc_id).or_default().insert(term.clone());
        }
    }

    let mut results: Vec<SearchResult> = scores
        .into_iter()
        .filter(|(_, score)| *score > 0.0)
        .map(|(doc_id, score)| SearchResult {
            doc_id,
            score,
            matched_terms: matched.remove(&doc_id).unwrap_or_default(),
        })
        .collect();
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });
    results.truncate(top_k);
    results
}

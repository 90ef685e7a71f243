use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::document::DocId;

pub type TermId = u32;

/// Indexed fields of a document. Title and body are tokenized separately so
/// they can be weighted differently at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    Title,
    Body,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::Title, Field::Body];

    fn slot(self) -> usize {
        match self {
            Field::Title => 0,
            Field::Body => 1,
        }
    }
}

/// Per-field score multipliers. Index metadata, applied at scoring time and
/// never baked into postings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBoosts {
    pub title: f32,
    pub body: f32,
}

impl Default for FieldBoosts {
    fn default() -> Self {
        Self { title: 2.0, body: 1.0 }
    }
}

impl FieldBoosts {
    pub fn for_field(&self, field: Field) -> f32 {
        match field {
            Field::Title => self.title,
            Field::Body => self.body,
        }
    }
}

/// One term's occurrences in one document field. Positions are token
/// ordinals, sorted ascending; `term_frequency` equals `positions.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub field: Field,
    pub term_frequency: u32,
    pub positions: Vec<u32>,
}

/// Term -> posting-list mapping with document-frequency bookkeeping.
///
/// Terms are interned to dense `TermId`s; `df[term_id]` counts the distinct
/// documents containing the term in any field. Posting lists stay sorted by
/// `(doc_id, field)` for merge-friendly evaluation. `field_lengths` records
/// per-field token counts and doubles as the registry of indexed documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvertedIndex {
    dictionary: HashMap<String, TermId>,
    df: Vec<u32>,
    postings: HashMap<TermId, Vec<Posting>>,
    field_lengths: HashMap<DocId, [u32; 2]>,
    boosts: FieldBoosts,
}

impl InvertedIndex {
    pub fn new(boosts: FieldBoosts) -> Self {
        Self {
            dictionary: HashMap::new(),
            df: Vec::new(),
            postings: HashMap::new(),
            field_lengths: HashMap::new(),
            boosts,
        }
    }

    pub fn boosts(&self) -> FieldBoosts {
        self.boosts
    }

    pub fn total_documents(&self) -> u32 {
        self.field_lengths.len() as u32
    }

    pub fn num_terms(&self) -> usize {
        self.dictionary.len()
    }

    pub fn contains_document(&self, doc_id: DocId) -> bool {
        self.field_lengths.contains_key(&doc_id)
    }

    pub fn field_length(&self, doc_id: DocId, field: Field) -> Option<u32> {
        self.field_lengths.get(&doc_id).map(|lens| lens[field.slot()])
    }

    /// Registers a document before its postings are added. Idempotent.
    pub fn register_document(&mut self, doc_id: DocId) {
        self.field_lengths.entry(doc_id).or_insert([0; 2]);
    }

    pub fn record_field_length(&mut self, doc_id: DocId, field: Field, len: u32) {
        debug_assert!(self.field_lengths.contains_key(&doc_id), "document not registered");
        self.field_lengths.entry(doc_id).or_insert([0; 2])[field.slot()] = len;
    }

    /// Appends one occurrence, keeping the term's posting list sorted by
    /// `(doc_id, field)`. A repeated position for the same (term, doc, field)
    /// is idempotent.
    pub fn add_posting(&mut self, term: &str, doc_id: DocId, field: Field, position: u32) {
        debug_assert!(self.field_lengths.contains_key(&doc_id), "document not registered");
        let term_id = match self.dictionary.get(term) {
            Some(&id) => id,
            None => {
                let id = self.dictionary.len() as TermId;
                self.dictionary.insert(term.to_string(), id);
                self.df.push(0);
                id
            }
        };

        let list = self.postings.entry(term_id).or_default();
        match list.binary_search_by_key(&(doc_id, field), |p| (p.doc_id, p.field)) {
            Ok(i) => {
                let posting = &mut list[i];
                if let Err(j) = posting.positions.binary_search(&position) {
                    posting.positions.insert(j, position);
                    posting.term_frequency += 1;
                }
            }
            Err(i) => {
                // df counts distinct documents, so only bump it when this is
                // the first posting for (term, doc) in either field.
                let doc_already_posted = (i > 0 && list[i - 1].doc_id == doc_id)
                    || (i < list.len() && list[i].doc_id == doc_id);
                list.insert(
                    i,
                    Posting { doc_id, field, term_frequency: 1, positions: vec![position] },
                );
                if !doc_already_posted {
                    self.df[term_id as usize] += 1;
                }
            }
        }
    }

    /// Removes every posting for `doc_id` and fixes up document frequencies.
    /// Returns false (no-op) if the document was not indexed.
    pub fn remove_document(&mut self, doc_id: DocId) -> bool {
        if self.field_lengths.remove(&doc_id).is_none() {
            return false;
        }
        let df = &mut self.df;
        self.postings.retain(|term_id, list| {
            let before = list.len();
            list.retain(|p| p.doc_id != doc_id);
            if list.len() != before {
                df[*term_id as usize] -= 1;
            }
            !list.is_empty()
        });
        true
    }

    /// Empty slice for unknown terms; absence is a normal condition.
    pub fn postings_for(&self, term: &str) -> &[Posting] {
        self.dictionary
            .get(term)
            .and_then(|id| self.postings.get(id))
            .map_or(&[], Vec::as_slice)
    }

    /// Distinct documents containing `term` in any field; 0 if unknown.
    pub fn document_frequency(&self, term: &str) -> u32 {
        self.dictionary.get(term).map_or(0, |&id| self.df[id as usize])
    }

    /// `ln(1 + N / (1 + df))`, floored at zero. Monotonically decreasing in
    /// document frequency.
    pub fn idf(&self, term: &str) -> f32 {
        let n = self.total_documents() as f32;
        let df = self.document_frequency(term) as f32;
        (1.0 + n / (1.0 + df)).ln().max(0.0)
    }
}

impl Default for InvertedIndex {
    fn default() -> Self {
        Self::new(FieldBoosts::default())
    }
}

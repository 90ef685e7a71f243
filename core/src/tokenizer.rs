use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref TOKEN_RE: Regex =
        Regex::new(r"(?u)[\p{L}\p{N}][\p{L}\p{N}_']*").expect("valid regex");
    static ref ENGLISH_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Analyzer configuration. Recorded in the snapshot meta file so the exact
/// analyzer used at index time is reconstructed at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Tokens shorter than this (in characters) are dropped.
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
    /// Dropped after lowercasing, before stemming.
    #[serde(default)]
    pub stop_words: HashSet<String>,
    /// Apply English (Porter) stemming to surviving tokens.
    #[serde(default)]
    pub stem: bool,
}

fn default_min_token_len() -> usize {
    1
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self { min_token_len: 1, stop_words: HashSet::new(), stem: false }
    }
}

impl TokenizerConfig {
    /// The conventional English profile: built-in stop list plus stemming.
    pub fn english() -> Self {
        Self {
            min_token_len: 1,
            stop_words: ENGLISH_STOPWORDS.iter().map(|w| (*w).to_string()).collect(),
            stem: true,
        }
    }
}

/// Splits raw text into normalized `(term, position)` pairs using NFKC
/// normalization, lowercasing, and the configured stop/length/stem rules.
/// Pure and deterministic; positions are token ordinals in the segmented
/// stream, so filtered tokens still advance the position counter.
pub struct Tokenizer {
    config: TokenizerConfig,
    stemmer: Option<Stemmer>,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        let stemmer = config.stem.then(|| Stemmer::create(Algorithm::English));
        Self { config, stemmer }
    }

    pub fn english() -> Self {
        Self::new(TokenizerConfig::english())
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    pub fn tokenize(&self, text: &str) -> Vec<(String, u32)> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let mut tokens = Vec::new();
        for (pos, mat) in TOKEN_RE.find_iter(&normalized).enumerate() {
            let token = mat.as_str();
            if token.chars().count() < self.config.min_token_len {
                continue;
            }
            if self.config.stop_words.contains(token) {
                continue;
            }
            let term = match &self.stemmer {
                Some(stemmer) => stemmer.stem(token).to_string(),
                None => token.to_string(),
            };
            tokens.push((term, pos as u32));
        }
        tokens
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(TokenizerConfig::default())
    }
}

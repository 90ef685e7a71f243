use tempfile::tempdir;

use sitesearch_core::persist::{self, IndexPaths, MetaFile, SNAPSHOT_VERSION};
use sitesearch_core::{
    search, BuildConfig, Document, DocumentStore, IndexBuilder, Tokenizer, TokenizerConfig,
};

fn doc(id: u32, title: &str, body: &str) -> Document {
    Document {
        id,
        url: format!("https://example.org/{id}"),
        title: title.into(),
        body: body.into(),
    }
}

#[test]
fn snapshot_round_trips() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());

    let mut store = DocumentStore::new();
    store.put(doc(1, "Hello World", "cat dog"));
    store.put(doc(2, "Cats", "dog dog cat"));

    let config = TokenizerConfig::english();
    let builder = IndexBuilder::new(Tokenizer::new(config.clone()), BuildConfig::default());
    let index = builder.build(store.iter()).unwrap();
    let meta = MetaFile {
        version: SNAPSHOT_VERSION,
        created_at: "2026-08-07T00:00:00Z".into(),
        num_docs: index.total_documents(),
        tokenizer: config.clone(),
    };
    persist::save_snapshot(&paths, &index, &store, &meta).unwrap();

    let (loaded_index, loaded_store, loaded_meta) = persist::load_snapshot(&paths).unwrap();
    assert_eq!(loaded_meta.version, SNAPSHOT_VERSION);
    assert_eq!(loaded_meta.num_docs, 2);
    assert_eq!(loaded_meta.tokenizer, config);
    assert_eq!(loaded_store.len(), 2);
    assert_eq!(loaded_index.total_documents(), index.total_documents());
    assert_eq!(loaded_index.num_terms(), index.num_terms());

    // Queries against the reloaded snapshot rank identically.
    let reloaded_builder =
        IndexBuilder::new(Tokenizer::new(loaded_meta.tokenizer), BuildConfig::default());
    let before = search(&index, builder.tokenizer(), "dog", 10);
    let after = search(&loaded_index, reloaded_builder.tokenizer(), "dog", 10);
    assert_eq!(before, after);
}

#[test]
fn loading_missing_snapshot_fails() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path().join("nope"));
    assert!(persist::load_snapshot(&paths).is_err());
}

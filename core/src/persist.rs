//! On-disk snapshot of an index: `index.bin` and `docs.bin` (bincode) plus a
//! human-readable `meta.json`. The meta file records the analyzer config so
//! a serving process queries with the same analyzer the index was built with.

use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::document::DocumentStore;
use crate::error::Result;
use crate::index::InvertedIndex;
use crate::tokenizer::TokenizerConfig;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    pub version: u32,
    pub created_at: String,
    pub num_docs: u32,
    pub tokenizer: TokenizerConfig,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    fn index(&self) -> PathBuf {
        self.root.join("index.bin")
    }

    fn docs(&self) -> PathBuf {
        self.root.join("docs.bin")
    }

    fn meta(&self) -> PathBuf {
        self.root.join("meta.json")
    }
}

pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.index())?;
    let bytes = bincode::serialize(index)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let mut f = File::open(paths.index())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let index = bincode::deserialize(&buf)?;
    Ok(index)
}

pub fn save_store(paths: &IndexPaths, store: &DocumentStore) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.docs())?;
    let bytes = bincode::serialize(store)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_store(paths: &IndexPaths) -> Result<DocumentStore> {
    let mut f = File::open(paths.docs())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let store = bincode::deserialize(&buf)?;
    Ok(store)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

pub fn save_snapshot(
    paths: &IndexPaths,
    index: &InvertedIndex,
    store: &DocumentStore,
    meta: &MetaFile,
) -> Result<()> {
    save_index(paths, index)?;
    save_store(paths, store)?;
    save_meta(paths, meta)?;
    Ok(())
}

pub fn load_snapshot(paths: &IndexPaths) -> Result<(InvertedIndex, DocumentStore, MetaFile)> {
    let index = load_index(paths)?;
    let store = load_store(paths)?;
    let meta = load_meta(paths)?;
    Ok((index, store, meta))
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use sitesearch_core::persist::{self, IndexPaths, MetaFile, SNAPSHOT_VERSION};
use sitesearch_core::{
    BuildConfig, Document, DocumentStore, FieldBoosts, IndexBuilder, Tokenizer, TokenizerConfig,
};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a site search index from document files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from input JSON/JSONL files or a directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Use the English analyzer (stop list + stemming)
        #[arg(long, default_value_t = false)]
        english: bool,
        /// Drop tokens shorter than this many characters
        #[arg(long, default_value_t = 1)]
        min_token_len: usize,
        /// Score multiplier for title matches
        #[arg(long, default_value_t = 2.0)]
        title_boost: f32,
        /// Score multiplier for body matches
        #[arg(long, default_value_t = 1.0)]
        body_boost: f32,
        /// Fail instead of writing an empty index when no documents are found
        #[arg(long, default_value_t = false)]
        require_documents: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            output,
            english,
            min_token_len,
            title_boost,
            body_boost,
            require_documents,
        } => {
            let mut tokenizer_config =
                if english { TokenizerConfig::english() } else { TokenizerConfig::default() };
            tokenizer_config.min_token_len = min_token_len;
            let build_config = BuildConfig {
                boosts: FieldBoosts { title: title_boost, body: body_boost },
                require_documents,
            };
            build_index(&input, &output, tokenizer_config, build_config)
        }
    }
}

fn build_index(
    input: &str,
    output: &str,
    tokenizer_config: TokenizerConfig,
    build_config: BuildConfig,
) -> Result<()> {
    let input_path = Path::new(input);

    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
        files.sort();
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }

    let mut store = DocumentStore::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            ingest_jsonl(&file, &mut store)?;
        } else {
            ingest_json(&file, &mut store)?;
        }
    }
    tracing::info!(num_docs = store.len(), "ingested documents");

    let builder = IndexBuilder::new(Tokenizer::new(tokenizer_config.clone()), build_config);
    let index = builder.build(store.iter())?;

    let meta = MetaFile {
        version: SNAPSHOT_VERSION,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        num_docs: index.total_documents(),
        tokenizer: tokenizer_config,
    };
    let out_paths = IndexPaths::new(output);
    persist::save_snapshot(&out_paths, &index, &store, &meta)?;

    tracing::info!(
        num_docs = index.total_documents(),
        num_terms = index.num_terms(),
        output,
        "index build complete"
    );
    Ok(())
}

fn ingest_jsonl(file: &Path, store: &mut DocumentStore) -> Result<()> {
    let f = File::open(file)?;
    let reader = BufReader::new(f);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: Document = serde_json::from_str(&line)?;
        ingest_doc(doc, store);
    }
    Ok(())
}

fn ingest_json(file: &Path, store: &mut DocumentStore) -> Result<()> {
    let f = File::open(file)?;
    let reader = BufReader::new(f);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                let doc: Document = serde_json::from_value(v)?;
                ingest_doc(doc, store);
            }
        }
        serde_json::Value::Object(_) => {
            let doc: Document = serde_json::from_value(json)?;
            ingest_doc(doc, store);
        }
        _ => {}
    }
    Ok(())
}

fn ingest_doc(doc: Document, store: &mut DocumentStore) {
    let id = doc.id;
    if store.put(doc).is_some() {
        tracing::warn!(doc_id = id, "replaced a previously ingested document");
    }
}

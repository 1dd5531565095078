use anyhow::Context;
use clap::Parser;
use pdf_rag_core::{
    clean_documents, load_documents, split_documents, ChunkingConfig, GeminiEmbedder, VectorStore,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-rag", version)]
struct Cli {
    /// Folder scanned recursively for PDF documents.
    #[arg(long, default_value = "data/docs")]
    docs_folder: PathBuf,

    /// Folder that receives the two index artifacts.
    #[arg(long, default_value = "data/index")]
    index_folder: PathBuf,

    /// Demonstration query run against the reloaded index.
    #[arg(long, default_value = "What is this document about?")]
    query: String,

    /// Number of chunks to return.
    #[arg(long, default_value = "2")]
    top_k: usize,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let documents = load_documents(&cli.docs_folder)
        .with_context(|| format!("loading PDFs from {}", cli.docs_folder.display()))?;
    info!(
        folder = %cli.docs_folder.display(),
        document_count = documents.len(),
        "documents loaded"
    );

    let documents = clean_documents(&documents);
    let chunks = split_documents(&documents, &ChunkingConfig::default())?;
    info!(chunk_count = chunks.len(), "chunks prepared");

    // Rebuilds from scratch on every run, even when a persisted pair
    // already exists at the destination.
    let store = VectorStore::build(chunks, GeminiEmbedder::from_env()?)?;
    store
        .persist(&cli.index_folder)
        .with_context(|| format!("persisting index to {}", cli.index_folder.display()))?;
    info!(
        folder = %cli.index_folder.display(),
        entries = store.len(),
        "index persisted"
    );

    let reloaded = VectorStore::load(&cli.index_folder, GeminiEmbedder::from_env()?)?;
    let results = reloaded.search(&cli.query, cli.top_k)?;

    println!("Results:");
    for chunk in results {
        println!("-----");
        println!("{}", chunk.text);
    }

    Ok(())
}

use std::path::PathBuf;

use clap::Parser;

use docrag_rag::Pipeline;

/// Index a directory into a persistent collection without starting a chat.
#[derive(Parser, Debug)]
#[command(name = "docrag-ingest")]
struct Args {
    #[arg(long, default_value = "docs")]
    docs_dir: PathBuf,

    #[arg(long, default_value = "documents")]
    collection_name: String,

    /// Metadata attached to every chunk, as key=value (repeatable)
    #[arg(long = "meta", value_parser = parse_pair)]
    meta: Vec<(String, String)>,
}

fn parse_pair(s: &str) -> Result<(String, String), String> { docrag_cli::parse_key_val(s).map_err(|e| e.to_string()) }

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = docrag_cli::bootstrap()?;
    let metadata = docrag_cli::pairs_to_metadata(args.meta);

    let mut pipeline = Pipeline::from_settings(&settings, &args.docs_dir, &args.collection_name).await?;
    let report = pipeline.initialize(metadata.as_ref()).await?;

    println!("✅ Indexed {} documents into {} chunks ({})", report.loaded.len(), report.chunks, args.collection_name);
    for path in &report.loaded {
        println!("  loaded  {}", path.display());
    }
    for s in &report.skipped {
        println!("  skipped {}: {}", s.path.display(), s.reason);
    }
    println!("📦 Stored under {}", settings.persist_path().display());
    Ok(())
}

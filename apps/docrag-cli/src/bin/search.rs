use std::sync::Arc;

use clap::Parser;

use docrag_core::traits::VectorIndex;
use docrag_models::get_default_embedder;
use docrag_vector::LanceCollection;

/// Nearest-neighbour search over an existing collection (no generation).
#[derive(Parser, Debug)]
#[command(name = "docrag-search")]
struct Args {
    query: String,

    #[arg(long, default_value = "documents")]
    collection_name: String,

    /// Number of results, defaults to max_retrieval_docs
    #[arg(long)]
    k: Option<usize>,

    /// Metadata equality filter, as key=value (repeatable, all must match)
    #[arg(long = "filter", value_parser = parse_pair)]
    filter: Vec<(String, String)>,
}

fn parse_pair(s: &str) -> Result<(String, String), String> { docrag_cli::parse_key_val(s).map_err(|e| e.to_string()) }

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = docrag_cli::bootstrap()?;
    let filter = docrag_cli::pairs_to_metadata(args.filter);
    let k = args.k.unwrap_or(settings.max_retrieval_docs);

    let collection = LanceCollection::open(&settings.persist_path(), &args.collection_name, get_default_embedder(&settings)?).await?;
    let index: Arc<dyn VectorIndex> = Arc::new(collection);
    let results = index.query(&args.query, k, filter.as_ref()).await?;

    println!("🔍 {} results for '{}'", results.len(), args.query);
    for (i, r) in results.iter().enumerate() {
        println!("\n[{}] distance={:.4} id={} metadata={:?}", i + 1, r.distance, r.id, r.metadata);
        println!("{}", r.text);
    }
    Ok(())
}

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;

use docrag_rag::Pipeline;

/// Ask questions about a directory of PDF/Markdown documents.
#[derive(Parser, Debug)]
#[command(name = "docrag-chat")]
struct Args {
    /// Directory holding the documents to index
    #[arg(long, default_value = "docs")]
    docs_dir: PathBuf,

    /// Collection (table) name
    #[arg(long, default_value = "documents")]
    collection_name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = docrag_cli::bootstrap()?;

    let mut pipeline = Pipeline::from_settings(&settings, &args.docs_dir, &args.collection_name).await?;
    println!("Loading documents from {} ...", args.docs_dir.display());
    let outcome = run(&mut pipeline).await;

    println!("\nCleaning up collection '{}' ...", args.collection_name);
    if let Err(e) = pipeline.clear().await {
        eprintln!("Cleanup failed: {e}");
    }
    outcome
}

async fn run(pipeline: &mut Pipeline) -> anyhow::Result<()> {
    let report = pipeline.initialize(None).await?;
    println!("Indexed {} documents into {} chunks", report.loaded.len(), report.chunks);
    for s in &report.skipped {
        println!("  skipped {}: {}", s.path.display(), s.reason);
    }
    println!("\nType a question, or 'exit' / 'quit' to leave.");

    let stdin = io::stdin();
    loop {
        print!("\nQuestion: ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }
        match pipeline.answer(query).await {
            Ok(answer) => {
                println!("\nAnswer:\n{}", answer.answer);
                if !answer.sources.is_empty() {
                    println!("\nSources:\n{}", answer.sources);
                }
            }
            Err(e) => eprintln!("Error: {e}"),
        }
    }
    Ok(())
}

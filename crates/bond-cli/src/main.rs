//! Command-line interface for bond-rs

use bond_agents::{DirectoryAgent, FinderAgent, Orchestrator, ScreenerAgent};
use bond_store::{BondStore, FinderStore, ScreenerStore};
use bond_utils::DataConfig;
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "bond-cli")]
#[command(about = "Natural-language Q&A over bond datasets", long_about = None)]
struct Args {
    /// Directory containing the CSV datasets
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Answer a single query and exit
    #[arg(short, long)]
    query: Option<String>,

    /// Print the full response envelope as JSON
    #[arg(long)]
    json: bool,
}

fn build_orchestrator(config: &DataConfig) -> anyhow::Result<Orchestrator> {
    let bonds = Arc::new(BondStore::load(&config.bonds_csv)?);
    let finder = Arc::new(FinderStore::load(&config.finder_csv)?);
    let screener = Arc::new(ScreenerStore::load(
        &config.companies_csv,
        &config.financials_csv,
        &config.news_csv,
    )?);

    let orchestrator = Orchestrator::builder()
        .agent(Arc::new(DirectoryAgent::new(bonds)?))
        .agent(Arc::new(FinderAgent::new(finder)?))
        .agent(Arc::new(ScreenerAgent::new(screener)?))
        .fallback(DirectoryAgent::NAME)
        .build()?;
    Ok(orchestrator)
}

async fn answer(orchestrator: &Orchestrator, query: &str, json: bool) -> anyhow::Result<()> {
    let routed = orchestrator.process_query(query).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&routed)?);
    } else {
        println!("{}", routed.response.message);
        println!();
        println!("[{} | confidence {:.2}]", routed.agent_id, routed.confidence);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    bond_utils::init_tracing();

    let args = Args::parse();
    let config = DataConfig::from_dir(&args.data_dir);
    let orchestrator = build_orchestrator(&config)?;
    info!(agents = ?orchestrator.agent_ids(), "agents ready");

    if let Some(query) = args.query {
        return answer(&orchestrator, &query, args.json).await;
    }

    println!("Ask about bonds, issuers, yields, or companies. Type 'exit' to quit.");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }
        answer(&orchestrator, query, args.json).await?;
    }
    Ok(())
}

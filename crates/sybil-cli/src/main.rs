mod config;
mod dataset;

use clap::{Parser, Subcommand};
use std::path::Path;
use sybil_core::{DuplicationReport, ScoringStrategy};
use sybil_detect::{features, unix_now, HeuristicScorer};
use sybil_fetch::RedditClient;
use sybil_model::ClassifierScorer;
use sybil_search::DupeScanner;

#[derive(Parser)]
#[command(name = "sybil")]
#[command(about = "Score accounts for automated/inauthentic behavior")]
struct Cli {
    #[arg(
        short = 'f',
        long,
        default_value = "sybil.toml",
        help = "Path to config file"
    )]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Check {
        #[arg(help = "Account username to evaluate")]
        username: String,
        #[arg(
            long,
            help = "Use the explainable weighted rules instead of the trained classifier"
        )]
        heuristic: bool,
    },
    Dataset,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sybil=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = if Path::new(&cli.config).exists() {
        match config::SybilConfig::from_file(&cli.config) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: failed to load config {}: {}", cli.config, e);
                std::process::exit(1);
            }
        }
    } else {
        config::SybilConfig::default()
    };

    let result = match cli.command {
        Commands::Check {
            username,
            heuristic,
        } => run_check(&config, &username, heuristic).await,
        Commands::Dataset => run_dataset(&config).await,
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run_check(
    config: &config::SybilConfig,
    username: &str,
    heuristic: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = RedditClient::new();
    let sets = config.reference_sets();

    println!("evaluating account {}...", username);
    let profile = fetcher.fetch_profile(username).await?;
    let vector = features::assemble(&profile, &sets, unix_now());

    let (results, strategy_name) = if heuristic {
        // The duplication scan only informs the explainable content rule,
        // so it runs (sequentially, rate-limited) in heuristic mode only.
        let dupes = match config.search_client() {
            Some(search) => {
                let scanner = DupeScanner::new(search);
                scanner.scan(&profile.name, &profile.comments).await
            }
            None => {
                tracing::info!("search not configured, duplication scan skipped");
                DuplicationReport::default()
            }
        };
        let scorer = HeuristicScorer::new(sets);
        (scorer.evaluate(&profile, &vector, &dupes), scorer.name())
    } else {
        let scorer = ClassifierScorer::load(Path::new(&config.model.path))?;
        let dupes = DuplicationReport::default();
        (scorer.evaluate(&profile, &vector, &dupes), scorer.name())
    };

    println!("\n--- detection results for {} ({}) ---", username, strategy_name);
    for result in &results {
        let marker = if result.is_suspicious { "!" } else { "ok" };
        println!(
            "\n[{}] {} - confidence {:.0}%",
            marker,
            result.rule_name,
            result.confidence_score * 100.0
        );
        for detail in &result.details {
            println!("    - {}", detail);
        }
    }

    let suspicious = results.iter().filter(|r| r.is_suspicious).count();
    println!(
        "\n{} of {} rule(s) flagged this account",
        suspicious,
        results.len()
    );

    Ok(())
}

async fn run_dataset(config: &config::SybilConfig) -> Result<(), Box<dyn std::error::Error>> {
    let Some(dataset_config) = &config.dataset else {
        return Err("config has no [dataset] section".into());
    };

    let fetcher = RedditClient::new();
    let sets = config.reference_sets();
    let appended = dataset::build_dataset(dataset_config, &fetcher, &sets).await?;

    println!("--- dataset build complete ---");
    println!("new rows: {}", appended);
    println!("output: {}", dataset_config.output);

    Ok(())
}

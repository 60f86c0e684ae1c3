//! cotag CLI: maintain and inspect related-tag records.
//!
//! Usage:
//!   cotag add <tags...> [--db path] [--config path]
//!   cotag remove <tags...>
//!   cotag show|related|rendered <tag>
//!   cotag list

use clap::{Parser, Subcommand};
use cotag::{Config, Delta, OpenStore, RelationAggregator, SqliteStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cotag", version, about = "Related-tag co-occurrence aggregator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Path to YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a content item carrying these tags
    Add {
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Retract a content item carrying these tags
    Remove {
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Print the full record for a tag as JSON
    Show { tag: String },
    /// Print related tags, highest count first
    Related { tag: String },
    /// Print the rendered presentation for a tag
    Rendered { tag: String },
    /// List all tags that have related tags
    List,
}

/// Get the default database path (~/.local/share/cotag/cotag.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("cotag").join("cotag.db")
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_env("COTAG_LOG").unwrap_or_else(|_| {
        let level = match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        };
        EnvFilter::new(format!("cotag={}", level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_aggregator(db: Option<PathBuf>, config: Option<PathBuf>) -> Result<RelationAggregator, String> {
    let config = Config::load(config.as_deref()).map_err(|e| e.to_string())?;
    let db_path = db.unwrap_or_else(default_db_path);
    debug!(db = %db_path.display(), "opening store");
    let store = SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))?;
    Ok(RelationAggregator::from_config(Arc::new(store), &config))
}

fn cmd_apply(aggregator: &RelationAggregator, tags: &[String], delta: Delta) -> i32 {
    match aggregator.apply(tags, delta) {
        Ok(()) => {
            let verb = match delta {
                Delta::Add => "Added",
                Delta::Remove => "Removed",
            };
            println!("{} co-occurrence of {} tag(s)", verb, tags.len());
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_show(aggregator: &RelationAggregator, tag: &str) -> i32 {
    match aggregator.get_record(tag) {
        Ok(Some(record)) => match serde_json::to_string_pretty(&record) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Ok(None) => {
            println!("No related tags for '{}'.", tag);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_related(aggregator: &RelationAggregator, tag: &str) -> i32 {
    let ranked = match aggregator.ranked(tag) {
        Ok(ranked) => ranked,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if ranked.is_empty() {
        println!("No related tags for '{}'.", tag);
        return 0;
    }
    println!("{:<32}  {:>7}", "TAG", "COUNT");
    println!("{}", "-".repeat(41));
    for relation in ranked {
        println!("{:<32}  {:>7}", relation.tag, relation.count);
    }
    0
}

fn cmd_rendered(aggregator: &RelationAggregator, tag: &str) -> i32 {
    match aggregator.get_rendered(tag) {
        Ok(rendered) => {
            println!("{}", rendered);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_list(aggregator: &RelationAggregator) -> i32 {
    match aggregator.store().list_tags() {
        Ok(tags) if tags.is_empty() => {
            println!("No tags recorded.");
            0
        }
        Ok(tags) => {
            for tag in tags {
                println!("{}", tag);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let aggregator = match open_aggregator(cli.db, cli.config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Add { tags } => cmd_apply(&aggregator, &tags, Delta::Add),
        Commands::Remove { tags } => cmd_apply(&aggregator, &tags, Delta::Remove),
        Commands::Show { tag } => cmd_show(&aggregator, &tag),
        Commands::Related { tag } => cmd_related(&aggregator, &tag),
        Commands::Rendered { tag } => cmd_rendered(&aggregator, &tag),
        Commands::List => cmd_list(&aggregator),
    };
    std::process::exit(code);
}

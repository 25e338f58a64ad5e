//! Proprank CLI - rank the properties of a knowledge-graph resource

use clap::{Parser, Subcommand};
use proprank_core::config::Config;
use proprank_core::pipeline::PropertyRanker;
use proprank_core::report::RankingReport;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "proprank")]
#[command(author, version, about = "Rank the properties of a knowledge-graph resource", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank a resource's properties and print the JSON report
    Rank {
        /// Resource name (Iron_Maiden) or full URI
        resource: String,
        /// Also rank relations pointing at the resource
        #[arg(long)]
        incoming: bool,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print scorer input lines for a resource (training data export)
    Features {
        /// Resource name (Iron_Maiden) or full URI
        resource: String,
        /// Also include relations pointing at the resource
        #[arg(long)]
        incoming: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "proprank=debug" } else { "proprank=info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Rank {
            resource,
            incoming,
            compact,
        } => cmd_rank(&resource, incoming, compact).await,

        Commands::Features { resource, incoming } => cmd_features(&resource, incoming).await,

        Commands::Config { action } => cmd_config(action, cli.quiet),
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

fn load_ranker(incoming: bool) -> anyhow::Result<PropertyRanker> {
    let mut config = Config::load()?;
    if incoming {
        config.ranking.include_incoming = true;
    }
    debug!(
        endpoint = %config.graph.endpoint,
        scorer = config.scorer.kind.as_str(),
        autocomplete = config.autocomplete.enabled,
        "Loaded configuration"
    );
    Ok(PropertyRanker::from_config(&config)?)
}

async fn cmd_rank(resource: &str, incoming: bool, compact: bool) -> anyhow::Result<()> {
    let report = match load_ranker(incoming) {
        Ok(ranker) => {
            info!(resource = %resource, scorer = ranker.scorer_name(), "Ranking properties");
            ranker.rank_report(resource).await
        }
        Err(e) => match e.downcast_ref::<proprank_core::Error>() {
            Some(core) => RankingReport::failure(core),
            None => RankingReport::failure(&proprank_core::Error::ConfigError(format!("{:#}", e))),
        },
    };

    println!("{}", report.to_json(!compact)?);

    if !report.is_success() {
        if let Some(suggestion) = &report.suggestion {
            eprintln!("Hint: {}", suggestion);
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn cmd_features(resource: &str, incoming: bool) -> anyhow::Result<()> {
    let ranker = load_ranker(incoming)?;
    let lines = ranker.feature_lines(resource).await?;
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

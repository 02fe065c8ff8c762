use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scormhost_application::PlayerContext;
use scormhost_core::runtime::ScormVersion;
use scormhost_infrastructure::ConfigService;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "scormhost")]
#[command(about = "SCORMHOST - host SCORM packages and inspect their tracking data", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/scormhost/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List extracted packages
    Packages,
    /// Show one package
    Package { id: String },
    /// Open a player session: record a visit and resolve the launch URL
    Launch {
        id: String,
        /// Mark the package complete and close the session
        #[arg(long)]
        complete: bool,
    },
    /// Append a tracking entry
    Track {
        id: String,
        #[arg(long)]
        visit: Option<String>,
        /// 1.2 or 2004
        #[arg(long)]
        version: Option<ScormVersion>,
        /// Data elements as KEY=VALUE
        #[arg(value_parser = commands::tracking::parse_pair)]
        data: Vec<(String, String)>,
    },
    /// Tracking entries of one package, or of all
    Entries { id: Option<String> },
    /// Record a visit
    Visit { id: String },
    /// Visits of one package, or of all
    Visits { id: Option<String> },
    /// Per-visit combined tracking with visit numbers and session seconds, for one package or all
    Combined { id: Option<String> },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_service = match &cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let config = config_service
        .get_config()
        .context("Failed to load configuration")?;

    init_tracing(cli.log_level.as_deref().unwrap_or(&config.log_level));
    tracing::debug!("[CLI] Config: {:?}", config);

    let context = PlayerContext::from_config(&config).context("Failed to set up host")?;

    match cli.command {
        Commands::Packages => commands::packages::list(&context).await?,
        Commands::Package { id } => commands::packages::show(&context, &id).await?,
        Commands::Launch { id, complete } => {
            commands::player::launch(&context, &id, complete).await?
        }
        Commands::Track {
            id,
            visit,
            version,
            data,
        } => commands::tracking::track(&context, &id, version, visit, data).await?,
        Commands::Entries { id } => commands::tracking::entries(&context, id.as_deref()).await?,
        Commands::Visit { id } => commands::tracking::visit(&context, &id).await?,
        Commands::Visits { id } => commands::tracking::visits(&context, id.as_deref()).await?,
        Commands::Combined { id } => commands::tracking::combined(&context, id.as_deref()).await?,
    }

    Ok(())
}

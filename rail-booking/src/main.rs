use clap::{Parser, Subcommand};
use rail_booking::{config::Config, ledger::SqliteLedger, RailSystem};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "railctl")]
#[command(about = "Provisioning and consistency tooling for the rail booking stores")]
struct Cli {
    /// Configuration file; environment variables are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the ledger schema
    Init,
    /// Report graph entities whose train no longer exists
    Audit,
    /// Delete what `audit` reports
    Repair,
    /// List every schedule
    Schedules,
    /// List every registered user
    Users,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    // Initialize logging
    init_logging(&config)?;

    tracing::debug!("Configuration: {:?}", config);

    match cli.command {
        Command::Init => {
            let ledger = SqliteLedger::open(&config.ledger.path)?;
            ledger.initialize()?;
            tracing::info!("Ledger schema ready at {}", config.ledger.path);
        }
        Command::Audit => {
            let system = RailSystem::open(&config)?;
            let report = system.audit.audit().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Repair => {
            let system = RailSystem::open(&config)?;
            let report = system.audit.repair().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Schedules => {
            let system = RailSystem::open(&config)?;
            let schedules = system.audit.get_all_schedules().await?;
            println!("{}", serde_json::to_string_pretty(&schedules)?);
        }
        Command::Users => {
            let system = RailSystem::open(&config)?;
            let users = system.users.get_all_users()?;
            println!("{}", serde_json::to_string_pretty(&users)?);
        }
    }

    Ok(())
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

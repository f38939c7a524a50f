use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taskboard::config::{LogFormat, Overrides, Settings, port_from_env};
use taskboard_common::Status;

mod cmd;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(version, about = "Task board with fractional lane ordering")]
pub struct Cli {
    /// Config file (default: .taskboard/taskboard.toml, skipped if missing)
    #[arg(long, global = true, env = "TASKBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "info" or "taskboard=debug,tower_http=info"
    #[arg(long, global = true, env = "TASKBOARD_LOG")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the board's HTTP API
    Serve {
        /// Interface to bind
        #[arg(long, env = "TASKBOARD_HOST")]
        host: Option<String>,

        /// Port to serve on (PORT is also honoured)
        #[arg(short, long, env = "TASKBOARD_PORT")]
        port: Option<u16>,

        /// Database path
        #[arg(long, env = "TASKBOARD_DB")]
        db_path: Option<PathBuf>,

        /// Token required on mutating routes
        #[arg(long, env = "API_TOKEN", hide_env_values = true)]
        api_token: Option<String>,

        /// Disable permissive CORS
        #[arg(long)]
        no_cors: bool,
    },
    /// Create the database and schema, then exit
    Init {
        /// Database path
        #[arg(long, env = "TASKBOARD_DB")]
        db_path: Option<PathBuf>,
    },
    /// Renumber one lane's positions evenly, keeping its order
    Rebalance {
        /// Lane to rebalance, e.g. TODO or IN_PROGRESS
        status: Status,

        /// Database path
        #[arg(long, env = "TASKBOARD_DB")]
        db_path: Option<PathBuf>,
    },
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let mut overrides = Overrides {
            log_level: self.log_level.clone(),
            log_format: self.log_format,
            ..Default::default()
        };
        match &self.command {
            Commands::Serve {
                host,
                port,
                db_path,
                api_token,
                no_cors,
            } => {
                overrides.host = host.clone();
                overrides.port = port.or_else(port_from_env);
                overrides.db_path = db_path.clone();
                overrides.api_token = api_token.clone();
                overrides.no_cors = *no_cors;
            }
            Commands::Init { db_path } | Commands::Rebalance { db_path, .. } => {
                overrides.db_path = db_path.clone();
            }
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref(), &cli.overrides())
        .context("Failed to load configuration")?;
    taskboard::logging::init(&settings.log_level, settings.log_format)?;

    match &cli.command {
        Commands::Serve { .. } => cmd::cmd_serve(settings.server).await?,
        Commands::Init { .. } => cmd::cmd_init(&settings.server.db_path)?,
        Commands::Rebalance { status, .. } => {
            cmd::cmd_rebalance(&settings.server.db_path, *status)?
        }
    }

    Ok(())
}

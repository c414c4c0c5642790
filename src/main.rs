use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;

use policypulse::batch::{print_summary, run_batch};
use policypulse::models::{fetch_models, ModelFetcher};
use policypulse::server::run_server;
use policypulse::{Analyzer, Settings};

#[derive(Parser)]
#[command(name = "policypulse", about = "Sentiment, summary and keywords for public comments")]
struct Cli {
    /// Optional YAML settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the downloaded models
    #[arg(long = "models-dir", global = true)]
    models_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Analyze comments from txt, csv and pdf files
    Batch {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Download the configured models into the models directory
    FetchModels {
        #[arg(long)]
        force: bool,
    },
}

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = cli.models_dir {
        settings.models.dir = dir;
    }

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            let analyzer = Analyzer::load(&settings.models, settings.analysis.clone())?;
            info!("Loaded configuration: {:?}", settings);
            run_server(&settings, analyzer).await?;
        }
        Commands::Batch { paths, out } => {
            let analyzer = Analyzer::load(&settings.models, settings.analysis.clone())?;
            let report = run_batch(&analyzer, &paths, out.as_deref())?;
            print_summary(&report)?;
        }
        Commands::FetchModels { force } => {
            let fetcher = ModelFetcher::from_env();
            fetch_models(&fetcher, &settings.models, force).await?;
        }
    }
    Ok(())
}

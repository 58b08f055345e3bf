use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use recco_engine::config::Config;
use recco_engine::logging;
use recco_engine::recco::{
    InMemoryContentPool, PoolItem, ReccoConfig, ReccoEngine, ReccoError, ReccoInputs,
    SessionResult, TrailRequest,
};

#[derive(Parser)]
#[command(name = "recco-engine", version, about = "Adaptive study trail recommendations")]
struct Cli {
    /// Engine parameters as JSON; falls back to RECCO_CONFIG, then to defaults
    /// plus RECCO_* overrides.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build trails for every request in a batch file.
    Trail { file: PathBuf },
    /// Stage remedial content for a finished session.
    Reinforce { file: PathBuf },
    /// Print the effective engine parameters.
    Config,
}

#[derive(Debug, Deserialize)]
struct TrailBatch {
    #[serde(default)]
    pool: Vec<PoolItem>,
    requests: Vec<TrailRequest>,
}

#[derive(Debug, Deserialize)]
struct ReinforceRequest {
    #[serde(default)]
    pool: Vec<PoolItem>,
    session: SessionResult,
    /// Diagnosed before reinforcing, so the remediation follows the current state.
    #[serde(default)]
    inputs: ReccoInputs,
}

fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config);

    let cli = Cli::parse();
    if let Err(err) = run(cli, &config) {
        tracing::error!(error = %err, "recco-engine failed");
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: &Config) -> Result<(), ReccoError> {
    let path = cli.config.as_deref().or(config.recco_config_path.as_deref());
    let engine = ReccoEngine::new(load_engine_config(path)?);

    match cli.command {
        Commands::Trail { file } => {
            let batch: TrailBatch = read_json(&file)?;
            let pool = InMemoryContentPool::new(batch.pool);
            tracing::info!(
                requests = batch.requests.len(),
                pool_items = pool.len(),
                "generating trails"
            );
            let outcomes = engine.generate_trails(&batch.requests, &pool);
            print_json(&outcomes, cli.pretty)
        }
        Commands::Reinforce { file } => {
            let request: ReinforceRequest = read_json(&file)?;
            let pool = InMemoryContentPool::new(request.pool);
            let state = engine.diagnose(&request.inputs);
            let reinforcement = engine.reinforce(&request.session, &state, &pool);
            print_json(&reinforcement, cli.pretty)
        }
        Commands::Config => print_json(engine.config(), cli.pretty),
    }
}

fn load_engine_config(path: Option<&Path>) -> Result<ReccoConfig, ReccoError> {
    match path {
        Some(path) => {
            let mut recco_config = ReccoConfig::from_json_file(path)?;
            recco_config.apply_env_overrides();
            recco_config.validate()?;
            tracing::debug!(path = %path.display(), "engine config loaded");
            Ok(recco_config)
        }
        None => {
            let recco_config = ReccoConfig::from_env();
            recco_config.validate()?;
            Ok(recco_config)
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ReccoError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ReccoError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<(), ReccoError> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

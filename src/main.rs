use migration_planner::cli::commands::{CliArgs, Commands};
use migration_planner::cli::handlers::{handle_config, handle_ingest, handle_plan};
use migration_planner::util::logging::{self, json_from_env, parse_level, LoggingConfig};
use migration_planner::VERSION;

use clap::Parser;
use std::env;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("migration-planner v{} starting", VERSION);
    if let Ok(path) = dotenv {
        debug!("Loaded environment from {}", path.display());
    }
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Plan(plan_args) => handle_plan(plan_args, args.quiet).await,
        Commands::Ingest(ingest_args) => handle_ingest(ingest_args, args.quiet),
        Commands::Config => handle_config(),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let base = match &args.log_level {
        Some(level) => parse_level(level),
        None => env::var("MIGRATION_PLANNER_LOG_LEVEL")
            .map(|s| parse_level(&s))
            .unwrap_or(Level::INFO),
    };

    logging::init_logging(
        LoggingConfig::from_verbosity(base, args.verbose, args.quiet).json(json_from_env()),
    );
}

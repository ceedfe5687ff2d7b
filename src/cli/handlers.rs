//! Command handlers. Each returns the process exit code.

use super::commands::{IngestArgs, PlanArgs};
use crate::config::{ConfigError, PlannerConfig};
use crate::ingest::{IngestConfig, RepositoryFlattener, SourceBundle};
use crate::llm::{provider_credential_var, select_generation_client, ApiKey};
use crate::pipeline::{PipelineError, PipelineOrchestrator};
use crate::progress::LoggingHandler;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_STAGE_FAILURE: i32 = 1;
pub const EXIT_PERSIST_FAILURE: i32 = 2;
pub const EXIT_CANCELLED: i32 = 130;

/// Environment defaults with the command-line overrides applied, validated
pub fn resolve_config(args: &PlanArgs) -> Result<PlannerConfig, ConfigError> {
    let mut config = PlannerConfig::default();

    if let Some(provider) = args.provider {
        config.provider = provider;
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }
    if let Some(size) = args.max_prompt_size {
        config.max_prompt_size = size;
    }
    if let Some(retries) = args.retries {
        config.retry_attempts = retries;
    }
    if let Some(output) = &args.output {
        config.output = output.clone();
    }

    config.validate()?;
    Ok(config)
}

fn repository_path(path: Option<&PathBuf>) -> PathBuf {
    path.cloned().unwrap_or_else(|| PathBuf::from("."))
}

fn report_failure(error: &PipelineError) {
    if error.is_cancelled() {
        eprintln!("Cancelled during {}", error.stage());
        return;
    }

    eprintln!("Error: {}", error);
    if error.is_retriable() {
        eprintln!("This failure is retriable; rerun later or pass --retries.");
    }
}

fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            token.cancel();
        }
    });
}

pub async fn handle_plan(args: &PlanArgs, quiet: bool) -> i32 {
    let config = match resolve_config(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_STAGE_FAILURE;
        }
    };
    debug!("Resolved configuration:\n{}", config);

    let credential = provider_credential_var(config.provider).and_then(ApiKey::from_env);
    let selected = match select_generation_client(&config, credential) {
        Ok(selected) => selected,
        Err(e) => {
            eprintln!("Error: {}: {}", e.kind(), e);
            return EXIT_STAGE_FAILURE;
        }
    };
    info!("Using {}", selected.description);

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let orchestrator = PipelineOrchestrator::new(selected.client, config.pipeline_config())
        .with_progress_handler(Arc::new(LoggingHandler))
        .with_cancellation(cancel)
        .with_retry(config.retry_policy());

    let result = match (&args.bundle_content, &args.bundle_tree) {
        (Some(content), Some(tree)) => {
            orchestrator
                .execute_loaded(SourceBundle::load(content, tree))
                .await
        }
        _ => {
            let repo = repository_path(args.repository_path.as_ref());
            orchestrator
                .execute_path(repo, IngestConfig::default())
                .await
        }
    };

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            report_failure(&e);
            return if e.is_cancelled() {
                EXIT_CANCELLED
            } else {
                EXIT_STAGE_FAILURE
            };
        }
    };

    match report.persist(&config.output) {
        Ok(()) => {
            if !quiet {
                println!("Migration report written to {}", config.output.display());
            }
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_PERSIST_FAILURE
        }
    }
}

fn write_bundle(path: &Path, rendered: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, rendered).with_context(|| format!("Failed to write {}", path.display()))
}

pub fn handle_ingest(args: &IngestArgs, quiet: bool) -> i32 {
    let repo = repository_path(args.repository_path.as_ref());

    let flattened = RepositoryFlattener::new(repo).and_then(|f| f.flatten());
    let (bundle, summary) = match flattened {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: IngestionError: {}", e);
            return EXIT_STAGE_FAILURE;
        }
    };

    let rendered = bundle.render();
    match &args.output {
        Some(path) => {
            if let Err(e) = write_bundle(path, &rendered) {
                eprintln!("Error: {:#}", e);
                return EXIT_PERSIST_FAILURE;
            }
            if !quiet {
                eprintln!("{}", summary);
                println!("Bundle written to {}", path.display());
            }
        }
        None => {
            print!("{}", rendered);
            if !quiet {
                eprintln!("{}", summary);
            }
        }
    }

    EXIT_SUCCESS
}

pub fn handle_config() -> i32 {
    let config = PlannerConfig::default();
    print!("{}", config);

    let credential = match provider_credential_var(config.provider) {
        Some(var) if ApiKey::from_env(var).is_some() => format!("{} (set)", var),
        Some(var) => format!("{} (missing)", var),
        None => "not required".to_string(),
    };
    println!("  Credential: {}", credential);

    match config.validate() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_STAGE_FAILURE
        }
    }
}

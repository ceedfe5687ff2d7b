use crate::config::parse_provider;
use clap::{ArgAction, Parser, Subcommand};
use genai::adapter::AdapterKind;
use std::path::PathBuf;

/// LLM-driven migration plan and schema generator
#[derive(Parser, Debug)]
#[command(
    name = "migration-planner",
    about = "Generate a migration plan and target schema for a repository using an LLM",
    version,
    long_about = "migration-planner flattens a repository, asks a language model for a \
                  migration plan, then asks it for a MongoDB schema derived from that plan, \
                  and writes both into one Markdown report. Providers: OpenAI, Anthropic, \
                  Ollama, Gemini, xAI, Groq."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase verbosity (can be used multiple times)"
    )]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Generate the migration report for a repository",
        long_about = "Runs the analysis stage and the schema stage and writes the combined \
                      report.\n\n\
                      Examples:\n  \
                      migration-planner plan\n  \
                      migration-planner plan /path/to/repo -o docs/Migration_Plan.md\n  \
                      migration-planner plan --provider anthropic --model claude-sonnet-4-5\n  \
                      migration-planner plan --bundle-content content.txt --bundle-tree tree.txt"
    )]
    Plan(PlanArgs),

    #[command(
        about = "Flatten a repository without calling a model",
        long_about = "Writes the directory tree followed by every file's contents, the same \
                      text the analysis stage sends.\n\n\
                      Examples:\n  \
                      migration-planner ingest\n  \
                      migration-planner ingest /path/to/repo -o bundle.txt"
    )]
    Ingest(IngestArgs),

    #[command(about = "Print the resolved configuration")]
    Config,
}

#[derive(Parser, Debug, Clone)]
pub struct PlanArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Report destination (default: Migration_Plan.md)"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'p',
        long,
        value_parser = parse_adapter_kind,
        help = "Model provider (default: openai)"
    )]
    pub provider: Option<AdapterKind>,

    #[arg(short = 'm', long, value_name = "MODEL", help = "Model identifier")]
    pub model: Option<String>,

    #[arg(long, value_name = "SECONDS", help = "Per-call timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(
        long,
        value_name = "CHARS",
        help = "Maximum prompt size in characters"
    )]
    pub max_prompt_size: Option<usize>,

    #[arg(
        long,
        value_name = "N",
        help = "Extra attempts per stage on rate limits and service errors"
    )]
    pub retries: Option<u32>,

    #[arg(
        long,
        value_name = "FILE",
        requires = "bundle_tree",
        conflicts_with = "repository_path",
        help = "Pre-flattened file contents (skips ingestion)"
    )]
    pub bundle_content: Option<PathBuf>,

    #[arg(
        long,
        value_name = "FILE",
        requires = "bundle_content",
        help = "Pre-flattened directory tree"
    )]
    pub bundle_tree: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct IngestArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the bundle to a file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

fn parse_adapter_kind(s: &str) -> Result<AdapterKind, String> {
    parse_provider(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_plan_args() {
        let args = CliArgs::parse_from(["migration-planner", "plan"]);
        match args.command {
            Commands::Plan(plan_args) => {
                assert!(plan_args.repository_path.is_none());
                assert!(plan_args.output.is_none());
                assert!(plan_args.provider.is_none());
                assert!(plan_args.retries.is_none());
                assert!(plan_args.bundle_content.is_none());
            }
            _ => panic!("Expected Plan command"),
        }
    }

    #[test]
    fn test_plan_with_options() {
        let args = CliArgs::parse_from([
            "migration-planner",
            "plan",
            "/tmp/repo",
            "-o",
            "out/report.md",
            "--provider",
            "anthropic",
            "--model",
            "claude-sonnet-4-5",
            "--timeout",
            "120",
            "--max-prompt-size",
            "50000",
            "--retries",
            "2",
        ]);

        match args.command {
            Commands::Plan(plan_args) => {
                assert_eq!(plan_args.repository_path, Some(PathBuf::from("/tmp/repo")));
                assert_eq!(plan_args.output, Some(PathBuf::from("out/report.md")));
                assert_eq!(plan_args.provider, Some(AdapterKind::Anthropic));
                assert_eq!(plan_args.model.as_deref(), Some("claude-sonnet-4-5"));
                assert_eq!(plan_args.timeout, Some(120));
                assert_eq!(plan_args.max_prompt_size, Some(50_000));
                assert_eq!(plan_args.retries, Some(2));
            }
            _ => panic!("Expected Plan command"),
        }
    }

    #[test]
    fn test_bundle_files_go_together() {
        assert!(CliArgs::try_parse_from([
            "migration-planner",
            "plan",
            "--bundle-content",
            "c.txt"
        ])
        .is_err());

        let args = CliArgs::try_parse_from([
            "migration-planner",
            "plan",
            "--bundle-content",
            "c.txt",
            "--bundle-tree",
            "t.txt",
        ])
        .unwrap();
        match args.command {
            Commands::Plan(plan_args) => {
                assert_eq!(plan_args.bundle_tree, Some(PathBuf::from("t.txt")));
            }
            _ => panic!("Expected Plan command"),
        }
    }

    #[test]
    fn test_ingest_command() {
        let args = CliArgs::parse_from(["migration-planner", "ingest", ".", "-o", "b.txt"]);
        match args.command {
            Commands::Ingest(ingest_args) => {
                assert_eq!(ingest_args.repository_path, Some(PathBuf::from(".")));
                assert_eq!(ingest_args.output, Some(PathBuf::from("b.txt")));
            }
            _ => panic!("Expected Ingest command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["migration-planner", "-vv", "config"]);
        assert_eq!(args.verbose, 2);
        assert!(!args.quiet);

        let args = CliArgs::parse_from(["migration-planner", "-q", "config"]);
        assert!(args.quiet);

        let args = CliArgs::parse_from(["migration-planner", "--log-level", "debug", "config"]);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_adapter_kind_parsing() {
        assert!(parse_adapter_kind("ollama").is_ok());
        assert!(parse_adapter_kind("OpenAI").is_ok());
        assert!(parse_adapter_kind("anthropic").is_ok());
        assert!(parse_adapter_kind("gemini").is_ok());
        assert!(parse_adapter_kind("xai").is_ok());
        assert!(parse_adapter_kind("groq").is_ok());
        assert!(parse_adapter_kind("invalid").is_err());
    }
}

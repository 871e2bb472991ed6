mod load;
mod report;

use std::path::PathBuf;

use argbind_core::ParseConfig;
use argbind_engine::{Drained, Outcome, drain, parse};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::load::load_document;
use crate::report::ParseReport;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "argbind")]
#[command(about = "Check option registries and parse argument lists against them")]
#[command(version)]
struct Cli {
    /// Log parse stages to stderr (same as RUST_LOG=debug).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load and validate a registry file.
    Check(CheckArgs),
    /// Parse an argument list against a registry file and print the bound values.
    Parse(ParseArgs),
    /// Drain an argument list through the token sources and print the result.
    Tokens(TokensArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Registry file (.json, .yaml or .yml).
    registry: PathBuf,
}

/// Feature switches layered over a registry file's `config` section.
#[derive(Debug, Args)]
struct FeatureArgs {
    /// Expand `@file` response files.
    #[arg(long)]
    response_files: bool,
    /// Stop at `--help` and report it.
    #[arg(long)]
    help_token: bool,
    /// Skip `-{ ... }-` comment regions.
    #[arg(long)]
    comments: bool,
}

impl FeatureArgs {
    fn apply(&self, mut config: ParseConfig) -> ParseConfig {
        if self.response_files {
            config = config.with_response_files();
        }
        if self.help_token {
            config = config.with_help();
        }
        if self.comments {
            config = config.with_comment_regions();
        }
        config
    }
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Registry file (.json, .yaml or .yml).
    registry: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    #[command(flatten)]
    features: FeatureArgs,
    /// Arguments to parse, after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct TokensArgs {
    #[command(flatten)]
    features: FeatureArgs,
    /// Arguments to drain, after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Parse(args) => run_parse(args),
        Command::Tokens(args) => run_tokens(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let document = load_document(&args.registry).map_err(|e| e.to_string())?;
    let (registry, _slots) = document.into_registry().map_err(|e| e.to_string())?;
    registry.validate().map_err(|e| e.to_string())?;

    let positional = registry.options().iter().filter(|o| !o.is_flagged()).count();
    println!(
        "Registry '{}' is valid: {} option(s), {} positional.",
        args.registry.display(),
        registry.len(),
        positional
    );
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let document = load_document(&args.registry).map_err(|e| e.to_string())?;
    let config = args.features.apply(document.config.clone());
    let (mut registry, _slots) = document.into_registry().map_err(|e| e.to_string())?;

    let outcome = parse(&mut registry, &args.args, &config).map_err(|e| e.to_string())?;
    if outcome == Outcome::HelpRequested {
        println!("help requested");
        return Ok(());
    }

    let report = ParseReport::from_registry(&registry).map_err(|e| e.to_string())?;
    let output = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to serialize output: {e}"))?,
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(&report).map_err(|e| format!("Failed to serialize output: {e}"))?
        }
    };
    println!("{}", output.trim_end());

    argbind_engine::release(&mut registry).map_err(|e| e.to_string())?;
    Ok(())
}

fn run_tokens(args: TokensArgs) -> Result<(), String> {
    let config = args.features.apply(ParseConfig::default());
    match drain(&args.args, &config).map_err(|e| e.to_string())? {
        Drained::Tokens(tokens) => println!("{tokens}"),
        Drained::Help => println!("help requested"),
    }
    Ok(())
}

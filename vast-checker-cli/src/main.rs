use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vast_checker_core::batch::{BatchValidator, DONE_BANNER, START_BANNER, check_document};
use vast_checker_core::config::{
    CheckerConfig, DEFAULT_INPUT_DIR, DEFAULT_SCHEMA_PATH, FailurePolicy, NamespaceMode,
    VAST_NAMESPACE,
};
use vast_checker_core::schema::Schema;

#[derive(Parser)]
#[command(name = "vast-checker")]
#[command(version, about = "Validate serialized VAST 4.2 documents against the IAB schema")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every file of a directory (the default)
    Check(CheckArgs),
    /// Check a single document
    Validate {
        #[arg(long)]
        file: PathBuf,
        #[command(flatten)]
        schema: SchemaArgs,
    },
}

#[derive(Args)]
struct SchemaArgs {
    /// XSD file to validate against
    #[arg(long, default_value = DEFAULT_SCHEMA_PATH)]
    schema: PathBuf,
    /// Namespace the root element is moved into before validation
    #[arg(long, default_value = VAST_NAMESPACE)]
    namespace: String,
    /// `coerce` silently, or `require` the root to declare the namespace
    #[arg(long, default_value_t = NamespaceMode::Coerce)]
    namespace_mode: NamespaceMode,
}

#[derive(Parser)]
#[command(name = "check")]
struct CheckArgs {
    #[command(flatten)]
    schema: SchemaArgs,
    /// Directory holding the documents to check
    #[arg(long, default_value = DEFAULT_INPUT_DIR)]
    input_dir: PathBuf,
    /// `continue` past unparseable files, or `fail-fast` on the first one
    #[arg(long, default_value_t = FailurePolicy::Continue)]
    on_error: FailurePolicy,
    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Some(Commands::Check(args)) => check(args),
        Some(Commands::Validate { file, schema }) => validate(&file, &schema),
        None => check(CheckArgs::parse_from(["check"])),
    }
}

fn check(args: CheckArgs) -> Result<()> {
    let config = CheckerConfig::new(&args.schema.schema, &args.input_dir)
        .with_namespace(args.schema.namespace.as_str())
        .with_namespace_mode(args.schema.namespace_mode)
        .with_failure_policy(args.on_error);
    let validator = BatchValidator::new(config);

    let summary = match args.format {
        OutputFormat::Text => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            validator.run(&mut out)?
        }
        OutputFormat::Json => {
            let summary = validator.run(&mut io::sink())?;
            let json = serde_json::to_string_pretty(&summary)
                .context("failed to serialize summary")?;
            println!("{json}");
            summary
        }
    };

    if summary.failed() > 0 {
        bail!("{} file(s) could not be parsed", summary.failed());
    }
    Ok(())
}

fn validate(file: &Path, args: &SchemaArgs) -> Result<()> {
    let mut schema = Schema::load(&args.schema, args.namespace.as_str())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{START_BANNER}")?;
    writeln!(out, "Check '{}'", file.display())?;
    let report = check_document(&mut schema, file, args.namespace_mode)
        .with_context(|| format!("failed to check {}", file.display()))?;
    for message in &report.messages {
        writeln!(out, "Message: {}", message.text)?;
    }
    writeln!(out, "{DONE_BANNER}")?;
    Ok(())
}

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use flagx::{
    ErrorPolicy, FlagxError, Output, ParseSummary, ParserConfig, PolicyOption,
    RecordingTerminator, SharedBuffer, UsageStyle,
};
use serde::Serialize;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "flagx-check")]
#[command(about = "Check flag declarations against sample command lines")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse sample arguments with a declared parser and report the outcome.
    Check(CheckArgs),
    /// Print the usage text of a declared parser.
    Usage(UsageArgs),
    /// Report problems in a parser declaration file.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Parser declaration file (YAML, or JSON with a .json extension).
    #[arg(long)]
    spec: PathBuf,
    /// Error policy options, replacing the file's policy when given
    /// (continue-on-error, skip-undeclared, clear-after-parse).
    #[arg(long = "policy", value_name = "OPTION")]
    policy: Vec<PolicyOption>,
    /// Output format for the report.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Arguments to parse, after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct UsageArgs {
    /// Parser declaration file.
    #[arg(long)]
    spec: PathBuf,
    /// Colorize flag names and markers.
    #[arg(long)]
    color: bool,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Parser declaration file.
    #[arg(long)]
    spec: PathBuf,
}

/// Result of one `check` run.
#[derive(Debug, Serialize)]
struct CheckReport {
    #[serde(flatten)]
    summary: ParseSummary,
    policy: ErrorPolicy,
    outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    terminations: Vec<i32>,
    diagnostics: String,
    /// Registered flags (help excluded) once the pass, including any
    /// clear-after-parse, is over.
    flags_after_parse: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "kebab-case")]
enum Outcome {
    Ok,
    Help,
    ParseError,
    MissingRequired,
}

impl Outcome {
    fn of(result: &Result<(), FlagxError>) -> Self {
        match result {
            Ok(()) => Outcome::Ok,
            Err(FlagxError::HelpRequested) => Outcome::Help,
            Err(FlagxError::MissingRequired(_)) => Outcome::MissingRequired,
            Err(_) => Outcome::ParseError,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Usage(args) => run_usage(args),
        Command::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn load_config(path: &Path) -> Result<ParserConfig, String> {
    ParserConfig::load(path).map_err(|err| format!("Failed to load '{}': {err}", path.display()))
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let mut config = load_config(&args.spec)?;
    if !args.policy.is_empty() {
        config.policy = ErrorPolicy::from_options(args.policy);
    }

    let mut parser = config
        .build()
        .map_err(|err| format!("Invalid declaration in '{}': {err}", args.spec.display()))?;
    let diagnostics = SharedBuffer::new();
    let exits = RecordingTerminator::new();
    parser.set_output(diagnostics.clone());
    parser.set_terminator(exits.clone());

    // Clear after the snapshot instead of inside the pass, so the report can
    // still show the flags the pass saw.
    parser.set_error_policy(ErrorPolicy {
        clear_after_parse: false,
        ..config.policy
    });
    let result = parser.parse(args.args);
    let summary = parser.snapshot();
    if config.policy.clear_after_parse {
        parser.clear();
    }

    let report = CheckReport {
        summary,
        policy: config.policy,
        outcome: Outcome::of(&result),
        error: result.err().map(|err| err.to_string()),
        terminations: exits.codes(),
        diagnostics: diagnostics.contents(),
        flags_after_parse: parser.flag_count(),
    };

    let rendered = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&report)
            .map_err(|err| format!("Failed to serialize report: {err}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&report)
            .map_err(|err| format!("Failed to serialize report: {err}"))?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

fn run_usage(args: UsageArgs) -> Result<(), String> {
    let config = load_config(&args.spec)?;
    let mut parser = config
        .build()
        .map_err(|err| format!("Invalid declaration in '{}': {err}", args.spec.display()))?;
    if args.color {
        parser.set_style(UsageStyle::Colored);
    }
    parser.set_output(Output::Stdout);
    parser
        .usage()
        .map_err(|err| format!("Failed to write usage: {err}"))
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let config = load_config(&args.spec)?;
    let problems = config.validate();
    if problems.is_empty() {
        println!(
            "Validated '{}': {} flag(s), policy {}.",
            args.spec.display(),
            config.flags.len(),
            config.policy
        );
        return Ok(());
    }

    for problem in &problems {
        eprintln!("  - {problem}");
    }
    Err(format!(
        "{} problem(s) found in '{}'",
        problems.len(),
        args.spec.display()
    ))
}

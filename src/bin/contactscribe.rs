//! CLI binary for contactscribe.
//!
//! A thin shim over the library crate that maps CLI arguments to
//! `ExportConfig`, writes the PDF and prints where it went.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use contactscribe::{default_output_path, export, load_contacts, ExportConfig, Language};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn paint(code: &str, s: &str) -> String {
    if io::stderr().is_terminal() {
        format!("\x1b[{code}m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}
fn green(s: &str) -> String {
    paint("32", s)
}
fn red(s: &str) -> String {
    paint("31", s)
}
fn yellow(s: &str) -> String {
    paint("33", s)
}
fn dim(s: &str) -> String {
    paint("2", s)
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # CSV export, English labels → contacts.pdf next to the input
  contactscribe contacts.csv

  # vCard file with Spanish labels
  contactscribe agenda.vcf es

  # Choose the output file
  contactscribe agenda.vcf es-ES -o ~/Documents/agenda.pdf

  # Fail instead of skipping malformed vCard entries
  contactscribe --strict agenda.vcf

  # Show the parsed, sorted contacts without writing a PDF
  contactscribe --inspect-only contacts.csv

SUPPORTED INPUT:
  .csv   UTF-8 with a header row. Name columns: Nombre/Apellidos,
         First Name/Last Name, Given Name/Family Name.
  .vcf   vCard 2.1, 3.0 or 4.0.

SUPPORTED LANGUAGES:
  en (default), es

ENVIRONMENT VARIABLES:
  CONTACTSCRIBE_OUTPUT     Default for --output
  CONTACTSCRIBE_STRICT     Default for --strict
  CONTACTSCRIBE_JSON       Default for --json
  CONTACTSCRIBE_VERBOSE    Default for --verbose
  CONTACTSCRIBE_QUIET      Default for --quiet
  RUST_LOG                 Full tracing filter (overrides -v/-q)
"#;

/// Render a CSV or vCard address book as a PDF contact directory.
#[derive(Parser, Debug)]
#[command(
    name = "contactscribe",
    version,
    about = "Render a CSV or vCard address book as a PDF contact directory",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address book to export (.csv or .vcf).
    input: PathBuf,

    /// Label language: en or es. Region tags such as es-ES are accepted.
    language: Option<String>,

    /// Write the PDF here instead of next to the input.
    #[arg(short, long, env = "CONTACTSCRIBE_OUTPUT")]
    output: Option<PathBuf>,

    /// Abort on the first malformed vCard entry instead of skipping it.
    #[arg(long, env = "CONTACTSCRIBE_STRICT")]
    strict: bool,

    /// Print the parsed contacts as JSON; no PDF is written.
    #[arg(long)]
    inspect_only: bool,

    /// Print a JSON summary instead of the output path.
    #[arg(long, env = "CONTACTSCRIBE_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CONTACTSCRIBE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CONTACTSCRIBE_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and succeed; every usage error
            // exits 1 like any other failure.
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", red("error:"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = build_config(cli)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let loaded = load_contacts(&cli.input, &config)?;
        println!(
            "{}",
            serde_json::to_string_pretty(&loaded).context("Failed to serialise contacts")?
        );
        return Ok(());
    }

    // ── Export ───────────────────────────────────────────────────────────
    let output = export(&cli.input, &config)?;

    let target = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));
    output.write_to(&target)?;
    let target = std::fs::canonicalize(&target).unwrap_or(target);

    if !cli.quiet {
        for skipped in &output.skipped {
            eprintln!("{} skipped {}", yellow("warning:"), skipped);
        }
    }

    if cli.json {
        let summary = serde_json::json!({
            "output": target,
            "stats": &output.stats,
            "warnings": output.skipped.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else {
        println!("{}", target.display());
    }

    if cli.verbose {
        eprintln!(
            "{}  {} contacts  {} pages  {}",
            green("✔"),
            output.stats.contacts,
            output.stats.pages,
            dim(&format!("{}ms", output.stats.total_duration_ms)),
        );
    }

    Ok(())
}

/// Map CLI args to `ExportConfig`.
fn build_config(cli: &Cli) -> Result<ExportConfig> {
    let language = match cli.language.as_deref() {
        Some(code) => code.parse::<Language>()?,
        None => Language::default(),
    };

    let config = ExportConfig::builder()
        .language(language)
        .skip_invalid_records(!cli.strict)
        .build()
        .context("Invalid configuration")?;
    Ok(config)
}

//! The `yasl` command-line tool: compile a schema, validate
//! a data document or directory against it, and render the findings.
//!
//! This binary owns every bit of output in the crate: `yasl::engine` and
//! `yasl::parser::compiler` never print or log on their own, they only
//! return [`yasl::Diagnostic`]s and [`yasl::SchemaError`]s for this binary
//! to render.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use serde::Serialize;

use yasl::engine::{validate_with, DataSource, Outcome, RootHint, UnitResult};
use yasl::parser::compiler::{compile_schema_with, SchemaSource};
use yasl::{CancellationToken, Diagnostic, EngineConfig};

#[derive(Parser)]
#[command(name = "yasl", version, about = "Schema compiler and validator for YASL")]
struct Cli {
    /// Path to a `.yasl` schema file or a directory of them.
    schema: PathBuf,
    /// Path to the YAML data file or directory to validate.
    data: PathBuf,
    /// Root type to validate against, as `name` or `namespace.name`. If
    /// omitted the root type is auto-detected from the document's keys.
    model_name: Option<String>,

    /// Only report warnings and errors.
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,
    /// Emit debug-level tracing.
    #[arg(long, conflicts_with = "quiet")]
    verbose: bool,
    /// Rendering for validation findings.
    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if matches!(e.kind(), clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion) {
                0
            } else {
                1
            };
            e.print().ok();
            return ExitCode::from(code);
        }
    };

    init_logging(&cli);

    let config = EngineConfig::default();
    let schema_source = if cli.schema.is_dir() { SchemaSource::Dir(cli.schema.clone()) } else { SchemaSource::File(cli.schema.clone()) };
    let mut registry = match compile_schema_with(schema_source, &config) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            return ExitCode::from(1);
        }
    };

    let root_hint: Option<(String, Option<String>)> = cli.model_name.as_deref().map(|name| match name.rsplit_once('.') {
        Some((namespace, bare)) => (bare.to_string(), Some(namespace.to_string())),
        None => (name.to_string(), None),
    });

    let data_source = if cli.data.is_dir() { DataSource::Dir(cli.data.clone()) } else { DataSource::File(cli.data.clone()) };
    let cancellation = CancellationToken::new();
    let hint_ref: Option<RootHint<'_>> = root_hint.as_ref().map(|(n, ns)| (n.as_str(), ns.as_deref()));
    let outcome = match validate_with(&mut registry, hint_ref, data_source, &config, Some(&cancellation)) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            return ExitCode::from(1);
        }
    };

    render(&cli, &outcome)
}

fn init_logging(cli: &Cli) {
    let filter = if cli.quiet { "warn" } else if cli.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Serialize)]
struct UnitReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    document: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    valid: bool,
    diagnostics: &'a [Diagnostic],
}

/// Every diagnostic attached to a unit's result, whether it came back via
/// `Ok` (non-fatal only, e.g. `PreferredMissing`) or `Err` (fatal and
/// non-fatal together).
fn diagnostics_of(result: &UnitResult) -> &[Diagnostic] {
    match result {
        Ok((_, diags)) => diags,
        Err(diags) => diags,
    }
}

fn render(cli: &Cli, outcome: &Outcome) -> ExitCode {
    let units: Vec<(Option<usize>, Option<String>, &UnitResult)> = match outcome {
        Outcome::Single(result) => vec![(None, None, result)],
        Outcome::Documents(results) => results.iter().enumerate().map(|(i, r)| (Some(i), None, r)).collect(),
        Outcome::Files(results) => results.iter().map(|(path, r)| (None, Some(path.display().to_string()), r)).collect(),
    };

    let reports: Vec<UnitReport<'_>> = units
        .iter()
        .map(|(document, file, result)| UnitReport {
            document: *document,
            file: file.clone(),
            valid: result.is_ok(),
            diagnostics: diagnostics_of(result),
        })
        .collect();
    let all_valid = reports.iter().all(|r| r.valid);

    match cli.output {
        OutputFormat::Text => {
            for report in &reports {
                let label = match (report.document, &report.file) {
                    (Some(idx), _) => format!("document {idx}: "),
                    (None, Some(file)) => format!("{file}: "),
                    (None, None) => String::new(),
                };
                if report.valid {
                    tracing::info!("{label}valid");
                    for diagnostic in report.diagnostics {
                        println!("{label}{}", diagnostic.render_text().yellow());
                    }
                } else {
                    for diagnostic in report.diagnostics {
                        println!("{label}{}", diagnostic.render_text().red());
                    }
                }
            }
        }
        OutputFormat::Json => {
            if let Ok(text) = serde_json::to_string_pretty(&reports) {
                println!("{text}");
            }
        }
        OutputFormat::Yaml => {
            if let Ok(text) = serde_yaml::to_string(&reports) {
                println!("{text}");
            }
        }
    }

    if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

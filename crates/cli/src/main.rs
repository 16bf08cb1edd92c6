// reqsync CLI - headless requirements reconciliation
//
// parse:  one document or archive to JSON records + stats
// info:   quick document summary
// recon:  master + N supplier documents to a reconciliation report

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use reqsync_recon::StatusHarmonizer;
use reqsync_reqif::parser::{info, parse_document};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE: u8 = 2;

#[derive(Parser)]
#[command(name = "reqsync")]
#[command(about = "Requirements-interchange parsing and supplier reconciliation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a requirements document or archive into JSON records
    #[command(after_help = "\
Examples:
  reqsync parse master.reqif
  reqsync parse delivery.reqifz --stats")]
    Parse {
        /// Input document (.reqif or .reqifz)
        input: PathBuf,

        /// Include parse diagnostics in the output
        #[arg(long)]
        stats: bool,
    },

    /// Print summary information about a document
    Info {
        /// Input document (.reqif or .reqifz)
        input: PathBuf,
    },

    /// Reconcile supplier responses against a master specification
    #[command(after_help = "\
Examples:
  reqsync recon --master master.reqif --supplier acme=acme.reqifz --supplier globex=globex.reqif
  reqsync recon --master master.reqif --supplier acme=a.reqif --mappings vocab.toml")]
    Recon {
        /// Master specification document
        #[arg(long)]
        master: PathBuf,

        /// Supplier response as NAME=FILE. Repeatable.
        #[arg(long = "supplier", value_name = "NAME=FILE")]
        suppliers: Vec<String>,

        /// TOML file with per-supplier status mapping tables
        #[arg(long)]
        mappings: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Parse { input, stats } => cmd_parse(&input, stats),
        Commands::Info { input } => cmd_info(&input),
        Commands::Recon {
            master,
            suppliers,
            mappings,
        } => cmd_recon(&master, &suppliers, mappings.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError::Usage(message)) => {
            eprintln!("reqsync: {message}");
            ExitCode::from(EXIT_USAGE)
        }
        Err(CliError::Runtime(message)) => {
            eprintln!("reqsync: {message}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

enum CliError {
    Usage(String),
    Runtime(String),
}

impl<E: std::error::Error> From<E> for CliError {
    fn from(err: E) -> Self {
        Self::Runtime(err.to_string())
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_parse(input: &std::path::Path, stats: bool) -> Result<(), CliError> {
    let outcome = parse_document(input)?;
    if stats {
        print_json(&outcome)
    } else {
        print_json(&outcome.records)
    }
}

fn cmd_info(input: &std::path::Path) -> Result<(), CliError> {
    let document_info = info(input)?;
    print_json(&document_info)
}

fn cmd_recon(
    master: &std::path::Path,
    supplier_args: &[String],
    mappings: Option<&std::path::Path>,
) -> Result<(), CliError> {
    if supplier_args.is_empty() {
        return Err(CliError::Usage(
            "at least one --supplier NAME=FILE is required".into(),
        ));
    }

    let mut harmonizer = StatusHarmonizer::new();
    if let Some(path) = mappings {
        let content = std::fs::read_to_string(path)?;
        harmonizer.load_overrides_toml(&content)?;
    }

    let master_outcome = parse_document(master)?;

    let mut suppliers = Vec::new();
    for arg in supplier_args {
        let Some((name, file)) = parse_supplier_arg(arg) else {
            return Err(CliError::Usage(format!(
                "supplier '{arg}' is not in NAME=FILE form"
            )));
        };
        let outcome = parse_document(std::path::Path::new(file))?;
        suppliers.push((name.to_string(), outcome.records));
    }

    let report = reqsync_recon::run(&master_outcome.records, &suppliers, &mut harmonizer);
    print_json(&report)
}

/// Split a `NAME=FILE` supplier argument. Only the first `=` separates;
/// file names may contain more.
fn parse_supplier_arg(arg: &str) -> Option<(&str, &str)> {
    let (name, file) = arg.split_once('=')?;
    if name.is_empty() || file.is_empty() {
        return None;
    }
    Some((name, file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplier_arg_forms() {
        assert_eq!(
            parse_supplier_arg("acme=responses/acme.reqifz"),
            Some(("acme", "responses/acme.reqifz"))
        );
        assert_eq!(
            parse_supplier_arg("acme=weird=name.reqif"),
            Some(("acme", "weird=name.reqif"))
        );
        assert_eq!(parse_supplier_arg("no-separator"), None);
        assert_eq!(parse_supplier_arg("=file.reqif"), None);
        assert_eq!(parse_supplier_arg("acme="), None);
    }
}

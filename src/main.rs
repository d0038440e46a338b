use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mini::{Document, Record};
use tracing_subscriber::EnvFilter;

/// Inspect and validate .mini configuration files
#[derive(Parser)]
#[command(name = "mini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the parsed document in canonical form
    Dump {
        path: PathBuf,

        /// Only print records of this section
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Parse every file and report the first error in each
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Dump { path, section } => dump(&path, section.as_deref()),
        Commands::Check { paths } => Ok(check(&paths)),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn load(path: &Path) -> Result<Document> {
    let file = fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Document::from_reader(file).with_context(|| format!("failed to parse {}", path.display()))
}

fn dump(path: &Path, only: Option<&str>) -> Result<ExitCode> {
    let document = load(path)?;
    let mut out = io::stdout().lock();

    for section in document.sections() {
        if only.is_some_and(|name| name != section.name()) {
            continue;
        }

        for record in section.records() {
            writeln!(out, "[{}]", section.name())?;
            write_record(&mut out, record)?;
            writeln!(out)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Keys come out sorted, each value of a repeated key on its own line in file order.
fn write_record<W: Write>(out: &mut W, record: &Record) -> io::Result<()> {
    for (key, values) in record.entries() {
        for value in values {
            writeln!(out, "{key} = {value}")?;
        }
    }
    Ok(())
}

fn check(paths: &[PathBuf]) -> ExitCode {
    let mut failed = 0_usize;

    for path in paths {
        match load(path) {
            Ok(document) => {
                tracing::info!(path = %path.display(), sections = document.sections().len(), "parsed");
                println!("{}: ok", path.display());
            }
            Err(err) => {
                failed += 1;
                println!("{}: {err:#}", path.display());
            }
        }
    }

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_written_in_canonical_form() {
        let document = Document::parse("[core]\nnumber_id = 2812\nid = avx\nnumber_id = 1233\n")
            .expect("failed to parse hardcoded input");
        let mut out = Vec::new();

        write_record(&mut out, &document.records("core")[0]).expect("writing to a Vec cannot fail");

        assert_eq!(
            String::from_utf8(out).expect("output is UTF-8"),
            "id = avx\nnumber_id = 2812\nnumber_id = 1233\n"
        );
    }

    #[test]
    fn empty_record_writes_nothing() {
        let mut out = Vec::new();

        write_record(&mut out, &Record::new()).expect("writing to a Vec cannot fail");

        assert!(out.is_empty());
    }
}

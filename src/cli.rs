//! Minimal CLI: check documents against a schema descriptor, or select a
//! fragment by path pattern.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;

use crate::descriptor::Descriptor;
use crate::path::PathPattern;
use crate::reader::Reader;
use crate::registry::ReaderSet;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// validate JSON documents against a schema descriptor, or extract fragments by path glob
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// validate every input document and report each violation with its path
    Check(CheckArgs),
    /// print the first fragment whose path matches a glob, per input document
    Select(SelectArgs),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// schema descriptor file (JSON)
    #[arg(long, short)]
    schema: PathBuf,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[command(flatten)]
    input_settings: InputSettings,
}

#[derive(Args, Debug)]
struct SelectArgs {
    #[command(flatten)]
    input_settings: InputSettings,

    /// path glob over the document shape, e.g. '.widgets[*].price'
    #[arg(long, short)]
    pattern: String,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Check(args) => run_check(args),
            Command::Select(args) => run_select(args),
        }
    }
}

impl InputSettings {
    fn load_schema(&self) -> Result<Reader> {
        let source = std::fs::read_to_string(&self.schema)
            .with_context(|| format!("failed to read schema file {}", self.schema.display()))?;
        let descriptor = Descriptor::parse(&source)
            .with_context(|| format!("failed to parse schema file {}", self.schema.display()))?;
        let set = ReaderSet::core();
        descriptor.build(&set).context("invalid schema declaration")
    }

    fn load_documents(&self) -> Result<Vec<(PathBuf, Value)>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut documents = Vec::with_capacity(source_paths.len());
        for source_path in source_paths {
            let bytes = std::fs::read(&source_path)
                .with_context(|| format!("failed to read {}", source_path.display()))?;
            let value: Value = crate::decode::from_slice_with_path(&bytes)
                .with_context(|| format!("failed to parse {}", source_path.display()))?;
            documents.push((source_path, value));
        }
        Ok(documents)
    }
}

fn run_check(args: &CheckArgs) -> Result<()> {
    let reader = args.input_settings.load_schema()?;
    let documents = args.input_settings.load_documents()?;
    let mut failed = 0usize;
    for (source_path, document) in &documents {
        let report = reader.validate(document);
        if report.is_valid() {
            println!("{} {}", "ok".green().bold(), source_path.display());
        } else {
            failed += 1;
            println!("{} {}", "invalid".red().bold(), source_path.display());
            for violation in &report.errors {
                let at: &str = if violation.path.is_empty() { "(root)" } else { &violation.path };
                println!("  {}: {}", at.yellow(), violation.reason);
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} document(s) failed validation", documents.len());
    }
    Ok(())
}

fn run_select(args: &SelectArgs) -> Result<()> {
    let reader = args.input_settings.load_schema()?;
    let pattern = PathPattern::parse(&args.pattern)?;
    let documents = args.input_settings.load_documents()?;
    for (source_path, document) in &documents {
        match reader.select(document, &pattern) {
            Some(fragment) => {
                println!("{}", serde_json::to_string_pretty(&fragment)?);
            }
            None => {
                eprintln!("{} no match in {}", "--".dimmed(), source_path.display());
            }
        }
    }
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            // Treat as a literal path
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::info;

use circular030::config::{PipelineConfig, RowErrorPolicy};
use circular030::importers::{self, ReferenceCache};
use circular030::reports::{SpreadsheetWriter, XlsxReportWriter};

use crate::cli::{formatters, Cli, Commands};

pub const DEFAULT_OUTPUT_SUFFIX: &str = "_Circular_030.xlsx";

/// Execute a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let mut config = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert {
            inputs,
            output,
            reference,
            strict,
            dry_run,
            preview,
        } => {
            if output.is_some() && inputs.len() > 1 {
                bail!("--output can only be used with a single input file");
            }
            if let Some(path) = reference {
                config.reference.path = path;
            }
            if strict {
                config.row_errors = RowErrorPolicy::FailFast;
            }

            let options = ConvertOptions {
                dry_run,
                preview,
                json: cli.json,
            };
            let cache = ReferenceCache::new();
            for input in &inputs {
                let target = match &output {
                    Some(path) => path.clone(),
                    None => default_output_path(input)?,
                };
                convert_file(input, &target, &config, &cache, &options)
                    .with_context(|| format!("Failed to convert {:?}", input))?;
            }
            Ok(())
        }

        Commands::Reference { reference } => {
            if let Some(path) = reference {
                config.reference.path = path;
            }
            let table = importers::load_reference(&config.reference)?;
            if cli.json {
                let rows: Vec<serde_json::Value> = table
                    .entries()
                    .iter()
                    .map(|e| serde_json::json!({ "legal_name": e.legal_name, "id_type": e.id_type }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{}", formatters::format_reference_table(&table));
            }
            Ok(())
        }
    }
}

struct ConvertOptions {
    dry_run: bool,
    preview: usize,
    json: bool,
}

fn convert_file(
    input: &Path,
    target: &Path,
    config: &PipelineConfig,
    cache: &ReferenceCache,
    options: &ConvertOptions,
) -> Result<()> {
    info!("Converting {:?} -> {:?}", input, target);

    let reference = cache.get_or_load(&config.reference)?;
    let text = importers::read_input_file(input)?;
    let outcome = circular030::run(&text, &reference, config)?;

    if !options.dry_run {
        XlsxReportWriter::from_schema(&config.output).write(&outcome.report, target)?;
    }

    if options.json {
        let written = (!options.dry_run).then_some(target);
        println!(
            "{}",
            formatters::format_summary_json(input, written, &outcome.summary)
        );
        return Ok(());
    }

    println!(
        "\n{} {} records ready from {}\n",
        "✓".green().bold(),
        outcome.records.len(),
        input.display()
    );
    if options.preview > 0 {
        println!(
            "{}",
            formatters::format_preview_table(&outcome.records, options.preview)
        );
    }
    print!("{}", formatters::format_summary(&outcome.summary));

    if options.dry_run {
        println!("\n{} Dry run - no spreadsheet written", "ℹ".blue().bold());
    } else {
        println!(
            "\n{} Wrote {} (sheet '{}')",
            "✓".green().bold(),
            target.display(),
            outcome.report.sheet_name
        );
    }
    Ok(())
}

/// `<dir>/<stem>_Circular_030.xlsx` next to the input
pub fn default_output_path(input: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("Input path {:?} has no file name", input))?;
    Ok(input.with_file_name(format!("{}{}", stem, DEFAULT_OUTPUT_SUFFIX)))
}

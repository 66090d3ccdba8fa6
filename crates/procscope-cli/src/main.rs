//! procscope CLI - stored-procedure data-flow analyzer

use procscope_cli::cli;
use procscope_cli::input;
use procscope_cli::output;

use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use procscope_core::{analyze, AnalysisOptions, AnalyzeRequest};
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use cli::{Args, OutputFormat};

/// Analysis completed but reported error-severity issues.
const EXIT_FAILURE: u8 = 1;
/// Input or configuration error before the engine ran.
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("procscope: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let source = input::read_input(args.file.as_deref())?;

    let request = AnalyzeRequest {
        stored_procedure: source.content,
        options: AnalysisOptions {
            include_visualization: args.visualize,
            detail_level: args.detail.into(),
        },
    };

    let result = analyze(&request);

    let output_str = match args.format {
        OutputFormat::Json => {
            output::format_json(&result, args.compact).context("Failed to serialize result")?
        }
        OutputFormat::Table => {
            let colored = args.output.is_none() && io::stdout().is_terminal();
            output::format_table(&result, &source.name, colored)
        }
    };

    write_output(&args.output, &output_str)?;

    if !args.quiet && args.format != OutputFormat::Json {
        output::print_issues_to_stderr(&result);
    }

    Ok(result.summary.has_errors)
}

fn write_output(path: &Option<std::path::PathBuf>, content: &str) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, content)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    } else {
        io::stdout()
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        if !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

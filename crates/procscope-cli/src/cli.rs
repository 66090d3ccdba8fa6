//! CLI argument parsing using clap.

use clap::{Parser, ValueEnum};
use procscope_core::DetailLevel;
use std::path::PathBuf;

/// procscope - stored-procedure data-flow analyzer
#[derive(Parser, Debug)]
#[command(name = "procscope")]
#[command(about = "Analyze Oracle-style stored procedures for data flow", long_about = None)]
#[command(version)]
pub struct Args {
    /// Procedure file to analyze (.sql, .txt, or .pls; reads stdin if omitted)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Include the visualization graph in the result
    #[arg(long)]
    pub visualize: bool,

    /// Analysis detail level
    #[arg(long, default_value = "full", value_enum)]
    pub detail: DetailArg,

    /// Suppress issues on stderr
    #[arg(short, long)]
    pub quiet: bool,

    /// Compact JSON output (no pretty-printing)
    #[arg(short, long)]
    pub compact: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Analysis detail level options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DetailArg {
    Basic,
    Full,
}

impl From<DetailArg> for DetailLevel {
    fn from(detail: DetailArg) -> Self {
        match detail {
            DetailArg::Basic => DetailLevel::Basic,
            DetailArg::Full => DetailLevel::Full,
        }
    }
}

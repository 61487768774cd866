//! Clap argument surface for the `vizscore` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use vizscore_types::OutputFormat;

/// `vizscore` — Tableau workbook complexity receipts.
///
/// Default mode (no subcommand) analyzes the given `.twb`/`.twbx` file
/// or a directory of them.
#[derive(Parser, Debug)]
#[command(name = "vizscore", version, about, long_about = None)]
pub struct Cli {
    /// Default options for the implicit `analyze` mode (when no
    /// subcommand is provided).
    #[command(flatten)]
    pub analyze: CliAnalyzeArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Analyze a workbook file or a directory of workbooks (default).
    Analyze(CliAnalyzeArgs),

    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct CliAnalyzeArgs {
    /// Path to a .twb/.twbx file, or a directory containing them.
    pub path: Option<PathBuf>,

    /// Output file (.json, .csv, or .tsv). Prints JSON to stdout when
    /// omitted.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Output format. Inferred from the --out extension when omitted.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// When PATH is a directory, recurse into subfolders.
    #[arg(long)]
    pub recursive: bool,

    /// Scoring config overrides (JSON file; partial keys allowed,
    /// unspecified keys keep their defaults).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output (repeat for more detail).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CliAnalyzeArgs {
    /// Effective output format: explicit flag, else the --out
    /// extension, else JSON.
    pub fn effective_format(&self) -> OutputFormat {
        if let Some(format) = self.format {
            return format;
        }
        match self
            .out
            .as_deref()
            .and_then(|p| p.extension())
            .map(|e| e.to_ascii_lowercase())
        {
            Some(ext) if ext == "csv" => OutputFormat::Csv,
            Some(ext) if ext == "tsv" => OutputFormat::Tsv,
            _ => OutputFormat::Json,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Shell {
    Bash,
    Elvish,
    Fish,
    Powershell,
    Zsh,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn format_is_inferred_from_out_extension() {
        let args = CliAnalyzeArgs {
            out: Some(PathBuf::from("report.CSV")),
            ..Default::default()
        };
        assert_eq!(args.effective_format(), OutputFormat::Csv);
    }

    #[test]
    fn explicit_format_wins_over_extension() {
        let args = CliAnalyzeArgs {
            out: Some(PathBuf::from("report.csv")),
            format: Some(OutputFormat::Json),
            ..Default::default()
        };
        assert_eq!(args.effective_format(), OutputFormat::Json);
    }

    #[test]
    fn missing_out_defaults_to_json() {
        assert_eq!(CliAnalyzeArgs::default().effective_format(), OutputFormat::Json);
    }
}

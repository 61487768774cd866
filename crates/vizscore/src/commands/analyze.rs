//! Single-file analysis: extract, score, summarize, write.

use std::path::Path;

use anyhow::Result;
use vizscore_config::ScoreConfig;

use crate::cli::CliAnalyzeArgs;

pub(crate) fn handle(path: &Path, args: &CliAnalyzeArgs, config: &ScoreConfig) -> Result<()> {
    let receipt = crate::analyze_workbook_file(path, config)?;
    let format = args.effective_format();
    vizscore_format::write_workbook_receipt(&receipt, args.out.as_deref(), format)?;

    if let Some(out) = &args.out {
        println!(
            "Wrote {} worksheet rows + summary to {}",
            receipt.worksheets.len(),
            out.display()
        );
    }
    if args.verbose > 0 {
        for record in &receipt.worksheets {
            for warning in &record.warnings {
                eprintln!("{}/{}: {warning}", receipt.workbook, record.worksheet);
            }
        }
    }
    Ok(())
}

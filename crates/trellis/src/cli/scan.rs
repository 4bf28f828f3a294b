//! `trellis scan` command implementation.

use colored::Colorize;
use trellis::ScanRecord;

use super::ScanOptions;

/// Run the scan command.
pub fn run(options: &ScanOptions, json: bool) -> Result<(), trellis::Error> {
    let mut scanner = options.scanner()?;
    let results = scanner.scan()?;

    if json {
        let records: Vec<ScanRecord> = results.iter().map(ScanRecord::from).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("{}", "No annotated files found.".yellow());
        return Ok(());
    }

    for code in results {
        println!("{code}");
        println!();
    }

    let inputs: usize = results
        .iter()
        .map(|code| code.input_files().len() + code.input_datasets().len())
        .sum();
    let outputs: usize = results.iter().map(|code| code.output_datasets().len()).sum();
    println!(
        "{} {} files ({} inputs, {} outputs)",
        "Scanned".green().bold(),
        results.len(),
        inputs,
        outputs
    );

    Ok(())
}

//! `trellis cycles` command implementation.

use colored::Colorize;
use trellis::GraphBuilder;

use super::ScanOptions;

/// Run the cycles command.
pub fn run(options: &ScanOptions) -> Result<(), trellis::Error> {
    let mut scanner = options.scanner()?;
    let results = scanner.scan()?;

    // Trimming only drops leaf datasets, which can never sit on a cycle;
    // keep them anyway so the report shows the graph as declared.
    let graph = GraphBuilder::new().trim_dangling(false).build(results);
    let cycles = graph.cycles();

    if cycles.is_empty() {
        println!("{}", "No circular dependencies detected.".green());
        return Ok(());
    }

    println!(
        "Found {} circular dependency group(s):",
        cycles.len().to_string().red().bold()
    );
    println!();

    for (i, cycle) in cycles.iter().enumerate() {
        println!("  {} {}:", "Cycle".yellow().bold(), i + 1);

        // Display cycle as: a -> b -> c -> a
        let mut path_str = cycle.join(" → ");
        if let Some(first) = cycle.first() {
            path_str.push_str(" → ");
            path_str.push_str(first);
        }

        println!("    {}", path_str.dimmed());
    }

    Ok(())
}

//! `trellis graph` command implementation.

use std::fs;
use std::path::Path;

use colored::Colorize;
use trellis::GraphBuilder;

use super::ScanOptions;

/// Run the graph command.
pub fn run(
    options: &ScanOptions,
    output: Option<&Path>,
    keep_dangling: bool,
    plain_orphans: bool,
) -> Result<(), trellis::Error> {
    let mut scanner = options.scanner()?;
    let results = scanner.scan()?;

    let graph = GraphBuilder::new()
        .color_orphans(!plain_orphans)
        .trim_dangling(!keep_dangling)
        .build(results);
    let dot = graph.to_dot();

    match output {
        Some(path) => {
            fs::write(path, &dot)?;
            println!(
                "{} {} nodes, {} edges -> {}",
                "Wrote".green().bold(),
                graph.node_count(),
                graph.edge_count(),
                path.display()
            );
        }
        None => print!("{dot}"),
    }

    if graph.has_cycle_warning() {
        eprintln!(
            "{}: the dependency graph is not acyclic",
            "warning".yellow().bold()
        );
    }

    Ok(())
}

//! # Trellis: dependency graphs for research data pipelines
//!
//! Trellis scans heterogeneous script files (SAS, Stata, notebooks, Python,
//! LaTeX, plain text) for specially formatted comments declaring inputs and
//! outputs, then assembles the declarations into a directed dependency graph
//! of files and datasets.
//!
//! Files declare their place in the pipeline with annotation comments:
//!
//! ```text
//! # INPUT_FILE: load_data.py
//! # INPUT_DATASET: raw/prices.csv
//! # OUTPUT: processed/prices_clean.csv
//! ```
//!
//! A file opting out entirely writes `# RESLIB_IGNORE: true`.
//!
//! ## Design Philosophy
//!
//! - **Declarations, not analysis** - extraction is purely comment-pattern
//!   based; nothing is executed or semantically parsed
//! - **Cycles are data** - a cyclic pipeline is reported on the graph, never
//!   raised as an error
//! - **Single-threaded** - one scanner owns its results; parallel hosts run
//!   independent scanners over disjoint subtrees and merge afterward
//! - **Embeddable** - library first, CLI second
//!
//! ## Quick Start
//!
//! ```no_run
//! use trellis::{DependencyScanner, GraphBuilder, kinds};
//!
//! let mut scanner = DependencyScanner::new(
//!     kinds::default_kinds(),
//!     "~/projects/example",
//!     Some("code"),
//!     Some("data"),
//!     None,
//! )?;
//!
//! let results = scanner.scan()?;
//! for code in results {
//!     println!("{code}");
//! }
//!
//! let graph = GraphBuilder::new().build(results);
//! println!("{}", graph.to_dot());
//! # Ok::<(), trellis::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analyzer;
pub mod config;
pub mod dot;
pub mod error;
pub mod graph;
pub mod kinds;
pub mod path;
pub mod pattern;
pub mod scanner;

pub use analyzer::FileAnalyzer;
pub use config::Config;
pub use error::{Error, Result};
pub use graph::{DependencyGraph, GraphBuilder, LinkKind, Node, NodeKind};
pub use pattern::{CommentSpec, CompiledKind, Token};
pub use scanner::{DependencyScanner, ScanRecord};

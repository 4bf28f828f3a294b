//! CLI command implementations.

pub mod cycles;
pub mod graph;
pub mod scan;

use std::collections::HashSet;
use std::path::PathBuf;

use trellis::{Config, DependencyScanner, Error, kinds, pattern::CommentSpec};

/// Scanner settings shared by every subcommand, resolved from command-line
/// flags layered over `trellis.json` at the project root.
pub struct ScanOptions {
    /// Project root directory.
    pub root: PathBuf,
    /// Code directory prefix under the root.
    pub code_prefix: Option<String>,
    /// Data directory prefix under the root.
    pub data_prefix: Option<String>,
    /// Analyzer kinds to apply, in order.
    pub kinds: Vec<CommentSpec>,
    /// Folder names to skip, when overridden.
    pub ignore_folders: Option<HashSet<String>>,
}

impl ScanOptions {
    /// Resolve options from flags plus any `trellis.json` under the root.
    ///
    /// Flags win over file values; unset values fall through to the
    /// scanner's own defaults.
    pub fn resolve(
        root: Option<PathBuf>,
        code_prefix: Option<String>,
        data_prefix: Option<String>,
        kind_names: &[String],
        ignores: &[String],
    ) -> Result<Self, Error> {
        let root = match root {
            Some(root) => root,
            None => std::env::current_dir()?,
        };

        let config = Config::discover(&root)?.install_global();

        let code_prefix = code_prefix.or_else(|| config.code_path_prefix.clone());
        let data_prefix = data_prefix.or_else(|| config.data_path_prefix.clone());

        let kind_names: Vec<String> = if kind_names.is_empty() {
            config.kinds.clone().unwrap_or_default()
        } else {
            kind_names.to_vec()
        };
        let kinds = resolve_kinds(&kind_names)?;

        let ignore_folders = if ignores.is_empty() {
            config.ignore_folders.clone()
        } else {
            Some(ignores.iter().cloned().collect())
        };

        Ok(Self {
            root,
            code_prefix,
            data_prefix,
            kinds,
            ignore_folders,
        })
    }

    /// Build a scanner from these options.
    pub fn scanner(&self) -> Result<DependencyScanner, Error> {
        DependencyScanner::new(
            self.kinds.clone(),
            &self.root.to_string_lossy(),
            self.code_prefix.as_deref(),
            self.data_prefix.as_deref(),
            self.ignore_folders.clone(),
        )
    }
}

/// Map kind names to built-in specs, keeping the given order.
fn resolve_kinds(names: &[String]) -> Result<Vec<CommentSpec>, Error> {
    names
        .iter()
        .map(|name| {
            kinds::by_name(name)
                .ok_or_else(|| Error::Config(format!("unknown analyzer kind: {name}")))
        })
        .collect()
}

//! Directory-tree scanning and analyzer dispatch.
//!
//! A [`DependencyScanner`] walks the tree rooted at
//! `join(project_root, code_path_prefix)`, skipping ignored folders, and
//! tries its analyzer kinds against each file **in declaration order** —
//! the first kind whose file pattern matches claims the file, so no file is
//! analyzed twice under two kinds. Files whose analysis finds at least one
//! annotation are collected; everything else is passed over silently.
//!
//! The scan is synchronous and all-or-nothing: one unreadable or
//! undecodable file aborts the invocation, and re-running is the retry.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::analyzer::FileAnalyzer;
use crate::error::Result;
use crate::kinds;
use crate::path;
use crate::pattern::{CommentSpec, CompiledKind};

/// Folder names skipped by default anywhere in the tree: version control
/// and notebook/interpreter cache directories.
#[must_use]
pub fn default_ignore_folders() -> HashSet<String> {
    [".git", ".ipynb_checkpoints", "__pycache__"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Scans a code base for comment-declared dependencies.
pub struct DependencyScanner {
    kinds: Vec<CompiledKind>,
    project_root: String,
    code_path_prefix: Option<String>,
    data_path_prefix: Option<String>,
    ignore_folders: HashSet<String>,
    scanned: Option<Vec<FileAnalyzer>>,
}

impl DependencyScanner {
    /// Create a scanner.
    ///
    /// An empty `kind_specs` selects the default built-ins
    /// ([`kinds::default_kinds`]); order is significant (first match wins).
    /// `project_root` has `~` expanded and is made absolute. `None` for
    /// `ignore_folders` selects [`default_ignore_folders`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Pattern`] when a kind fails to compile and
    /// [`crate::Error::Path`] when the root cannot be resolved.
    pub fn new(
        kind_specs: Vec<CommentSpec>,
        project_root: &str,
        code_path_prefix: Option<&str>,
        data_path_prefix: Option<&str>,
        ignore_folders: Option<HashSet<String>>,
    ) -> Result<Self> {
        let specs = if kind_specs.is_empty() {
            kinds::default_kinds()
        } else {
            kind_specs
        };
        let compiled = specs
            .into_iter()
            .map(CommentSpec::compile)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            kinds: compiled,
            project_root: path::expand_root(project_root)?,
            code_path_prefix: path::clean_opt(code_path_prefix),
            data_path_prefix: path::clean_opt(data_path_prefix),
            ignore_folders: ignore_folders.unwrap_or_else(default_ignore_folders),
            scanned: None,
        })
    }

    /// Walk the tree and collect one analyzer per annotated file.
    ///
    /// Results replace any previous scan and are cached on the scanner;
    /// [`results`] returns the cache without re-walking.
    ///
    /// # Errors
    ///
    /// Returns the first I/O or decode error encountered; nothing collected
    /// before the failure is kept.
    ///
    /// [`results`]: DependencyScanner::results
    pub fn scan(&mut self) -> Result<&[FileAnalyzer]> {
        // All-or-nothing: a failed re-scan must not leave stale results.
        self.scanned = None;

        let start_dir = path::join(&[
            Some(self.project_root.as_str()),
            self.code_path_prefix.as_deref(),
        ])?;
        debug!(start_dir = %start_dir, kinds = self.kinds.len(), "scanning");

        let mut results = Vec::new();
        self.walk_dir(Path::new(&start_dir), &mut results)?;
        debug!(files = results.len(), "scan complete");

        self.scanned = Some(results);
        Ok(self.scanned.as_deref().unwrap_or(&[]))
    }

    /// The cached scan results, scanning on first access.
    ///
    /// # Errors
    ///
    /// Propagates [`scan`] errors on the first access.
    ///
    /// [`scan`]: DependencyScanner::scan
    pub fn results(&mut self) -> Result<&[FileAnalyzer]> {
        if self.scanned.is_none() {
            self.scan()?;
        }
        Ok(self.scanned.as_deref().unwrap_or(&[]))
    }

    /// Recursively walk `dir`, dispatching files to analyzer kinds.
    fn walk_dir(&self, dir: &Path, results: &mut Vec<FileAnalyzer>) -> Result<()> {
        if self.is_ignored(dir) {
            debug!(directory = %dir.display(), "ignored folder, skipping subtree");
            return Ok(());
        }

        // Sorted for stable result order across filesystems.
        let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
        entries.sort_by_key(std::fs::DirEntry::file_name);

        for entry in entries {
            let entry_path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                self.walk_dir(&entry_path, results)?;
            } else if file_type.is_file() {
                self.scan_file(&entry_path, results)?;
            }
        }

        Ok(())
    }

    /// Try kinds in declaration order against one file; first match wins.
    fn scan_file(&self, file: &Path, results: &mut Vec<FileAnalyzer>) -> Result<()> {
        let Some(path_str) = file.to_str() else {
            warn!(path = %file.display(), "non-UTF-8 file name, skipping");
            return Ok(());
        };
        let cleaned = path::clean(path_str);

        for kind in &self.kinds {
            if !kind.matches_file(&cleaned) {
                continue;
            }

            let mut analyzer = FileAnalyzer::new(kind.clone());
            analyzer.set_path(
                None,
                Some(&cleaned),
                &self.project_root,
                self.code_path_prefix.as_deref(),
                self.data_path_prefix.as_deref(),
            )?;
            analyzer.analyze(None, None)?;

            if analyzer.is_parsed() {
                results.push(analyzer);
            }

            // First matching kind claims the file.
            break;
        }

        Ok(())
    }

    /// Whether any segment of `dir` is an ignored folder name.
    fn is_ignored(&self, dir: &Path) -> bool {
        dir.iter()
            .filter_map(|segment| segment.to_str())
            .any(|segment| self.ignore_folders.contains(segment))
    }

    /// Absolute, normalized project root.
    #[must_use]
    pub fn project_root(&self) -> &str {
        &self.project_root
    }

    /// Code directory prefix under the project root.
    #[must_use]
    pub fn code_path_prefix(&self) -> Option<&str> {
        self.code_path_prefix.as_deref()
    }

    /// Data directory prefix under the project root.
    #[must_use]
    pub fn data_path_prefix(&self) -> Option<&str> {
        self.data_path_prefix.as_deref()
    }

    /// Folder names skipped anywhere in the tree.
    #[must_use]
    pub fn ignore_folders(&self) -> &HashSet<String> {
        &self.ignore_folders
    }
}

/// Serializable summary of one scanned file, for machine-readable output.
#[derive(Debug, Clone, Serialize)]
pub struct ScanRecord {
    /// Short language name of the kind that claimed the file.
    pub language: String,
    /// Path relative to `join(project_root, code_path_prefix)`.
    pub relative_path: String,
    /// Recomputed absolute path.
    pub absolute_path: String,
    /// Input files declared by the file, sorted.
    pub input_files: Vec<String>,
    /// Input datasets declared by the file, sorted.
    pub input_datasets: Vec<String>,
    /// Output datasets declared by the file, sorted.
    pub output_datasets: Vec<String>,
}

impl From<&FileAnalyzer> for ScanRecord {
    fn from(analyzer: &FileAnalyzer) -> Self {
        Self {
            language: analyzer.language().to_string(),
            relative_path: analyzer.relative_path().unwrap_or_default().to_string(),
            absolute_path: analyzer.absolute_path().unwrap_or_default().to_string(),
            input_files: analyzer.input_files().iter().cloned().collect(),
            input_datasets: analyzer.input_datasets().iter().cloned().collect(),
            output_datasets: analyzer.output_datasets().iter().cloned().collect(),
        }
    }
}

//! Per-file annotation extraction.
//!
//! A [`FileAnalyzer`] imagines a file as something that takes input and
//! makes output:
//!
//! ```text
//!                     ┌────────────────────────┐
//! INPUT FILES ------> │   This file runs and   │ --> This file (file path)
//!                     │   creates some output  │
//!                     │   or writes data to    │
//! INPUT DATASETS ---> │   disk.                │ --> OUTPUT DATASETS
//!                     └────────────────────────┘
//! ```
//!
//! The analyzer resolves the file's identity relative to the project root,
//! extracts the three annotation sets from its comments, and answers the
//! parent/child questions the graph builder asks when wiring edges.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::path;
use crate::pattern::CompiledKind;

/// Values that mark a file as ignored when captured by the ignore tag.
const IGNORE_TRUE_VALUES: [&str; 3] = ["true", "yes", "1"];

/// Extracts declared dependencies from one source file.
///
/// An analyzer moves through three states: freshly constructed (no path),
/// path set, analyzed. Calling [`set_path`] always clears the annotation
/// sets, so a re-pointed analyzer must be re-analyzed before its results
/// mean anything — [`is_parsed`] reports whether the current path is the one
/// that was actually parsed.
///
/// [`set_path`]: FileAnalyzer::set_path
/// [`is_parsed`]: FileAnalyzer::is_parsed
#[derive(Debug, Clone)]
pub struct FileAnalyzer {
    kind: CompiledKind,
    relative_path: Option<String>,
    absolute_path: Option<String>,
    project_root: String,
    code_path_prefix: Option<String>,
    data_path_prefix: Option<String>,
    input_files: BTreeSet<String>,
    input_datasets: BTreeSet<String>,
    output_datasets: BTreeSet<String>,
    parsed_file: Option<String>,
}

impl FileAnalyzer {
    /// Create an analyzer for one kind, with no file attached yet.
    #[must_use]
    pub fn new(kind: CompiledKind) -> Self {
        Self {
            kind,
            relative_path: None,
            absolute_path: None,
            project_root: ".".to_string(),
            code_path_prefix: None,
            data_path_prefix: None,
            input_files: BTreeSet::new(),
            input_datasets: BTreeSet::new(),
            output_datasets: BTreeSet::new(),
            parsed_file: None,
        }
    }

    /// Attach the analyzer to a file and reset its annotation sets.
    ///
    /// `project_root` has `~` expanded and is made absolute. When only
    /// `absolute_path` is given, the relative path is derived from it by
    /// re-expressing it against `join(project_root, code_path_prefix)`. The
    /// absolute path is always recomputed as
    /// `join(project_root, code_path_prefix, relative_path)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Path`] when the root cannot be resolved.
    pub fn set_path(
        &mut self,
        relative_path: Option<&str>,
        absolute_path: Option<&str>,
        project_root: &str,
        code_path_prefix: Option<&str>,
        data_path_prefix: Option<&str>,
    ) -> Result<()> {
        // Reset dependencies: a re-pointed analyzer must re-analyze.
        self.parsed_file = None;
        self.input_files.clear();
        self.input_datasets.clear();
        self.output_datasets.clear();

        self.project_root = path::expand_root(project_root)?;
        self.code_path_prefix = path::clean_opt(code_path_prefix);
        self.data_path_prefix = path::clean_opt(data_path_prefix);

        let mut relative = relative_path.map(path::clean);
        if relative.is_none() {
            if let Some(absolute) = absolute_path {
                let absolute = path::clean(absolute);
                let derived = if Path::new(&absolute).is_absolute() {
                    let base = path::join(&[
                        Some(self.project_root.as_str()),
                        self.code_path_prefix.as_deref(),
                    ])?;
                    path::relative_to(&absolute, &base)
                } else {
                    absolute
                };
                relative = Some(derived);
            }
        }

        if let Some(relative) = relative {
            self.absolute_path = Some(path::join(&[
                Some(self.project_root.as_str()),
                self.code_path_prefix.as_deref(),
                Some(relative.as_str()),
            ])?);
            self.relative_path = Some(relative);
        }

        debug!(
            language = self.kind.language(),
            relative = ?self.relative_path,
            absolute = ?self.absolute_path,
            "path set"
        );

        Ok(())
    }

    /// Whether a path qualifies for this analyzer's kind.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.kind.matches_file(path)
    }

    /// Read and analyze the attached file.
    ///
    /// When either path argument is given, the path is re-resolved first
    /// (keeping the current root and prefixes). The file is read whole and
    /// the handle released before decoding.
    ///
    /// Returns `true` when at least one annotation was found.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPath`] when no absolute path is resolvable,
    /// [`Error::Io`] when the file cannot be read, and [`Error::Decode`]
    /// (naming the failing path) when its bytes are not valid for the kind's
    /// encoding.
    pub fn analyze(
        &mut self,
        relative_path: Option<&str>,
        absolute_path: Option<&str>,
    ) -> Result<bool> {
        if relative_path.is_some() || absolute_path.is_some() {
            let project_root = self.project_root.clone();
            let code_prefix = self.code_path_prefix.clone();
            let data_prefix = self.data_path_prefix.clone();
            self.set_path(
                relative_path,
                absolute_path,
                &project_root,
                code_prefix.as_deref(),
                data_prefix.as_deref(),
            )?;
        }

        let Some(absolute) = self.absolute_path.clone() else {
            return Err(Error::MissingPath);
        };

        debug!(
            language = self.kind.language(),
            path = %absolute,
            "analyzing file"
        );

        let bytes = fs::read(&absolute)?;
        let text = String::from_utf8(bytes).map_err(|_| Error::Decode {
            path: absolute.clone(),
            encoding: self.kind.spec().encoding.clone(),
        })?;

        let current_dir = path::parent(&absolute).map(str::to_string);
        Ok(self.analyze_text(&text, current_dir.as_deref()))
    }

    /// Extract annotations from file text.
    ///
    /// The annotation sets are rebuilt from scratch on every call. When the
    /// ignore tag is present with a true-like value, extraction is skipped
    /// entirely and the file contributes nothing — not even its other,
    /// otherwise valid annotations.
    ///
    /// Captured values starting with `./` or `.\` are resolved against
    /// `current_dir` (when known) and re-expressed relative to the project
    /// root; every value passes through [`path::clean`] before insertion.
    ///
    /// Returns `true` when at least one annotation was found; the file is
    /// then marked parsed for its current relative path.
    pub fn analyze_text(&mut self, text: &str, current_dir: Option<&str>) -> bool {
        self.parsed_file = None;
        self.input_files.clear();
        self.input_datasets.clear();
        self.output_datasets.clear();

        if let Some(cap) = self.kind.ignore().captures(text) {
            let value = cap[1].trim().to_lowercase();
            if IGNORE_TRUE_VALUES.contains(&value.as_str()) {
                debug!(
                    language = self.kind.language(),
                    relative = ?self.relative_path,
                    "ignore marker found, skipping extraction"
                );
                return false;
            }
        }

        let project_root = self.project_root.clone();
        let mut found_something = false;

        let kind = &self.kind;
        for (regex, set) in [
            (kind.input_file(), &mut self.input_files),
            (kind.input_dataset(), &mut self.input_datasets),
            (kind.output_dataset(), &mut self.output_datasets),
        ] {
            for cap in regex.captures_iter(text) {
                let mut value = cap[1].trim().to_string();

                // `./`-prefixed values are relative to the declaring file,
                // not the project root.
                let declared_relative = value.starts_with("./") || value.starts_with(".\\");
                if declared_relative {
                    if let Some(dir) = current_dir {
                        if let Ok(resolved) = path::join(&[Some(dir), Some(value.as_str())]) {
                            value = path::relative_to(&resolved, &project_root);
                        }
                    }
                }

                set.insert(path::clean(&value));
                found_something = true;
            }
        }

        if found_something {
            self.parsed_file = self.relative_path.clone();
            debug!(
                language = self.kind.language(),
                relative = ?self.relative_path,
                input_files = self.input_files.len(),
                input_datasets = self.input_datasets.len(),
                output_datasets = self.output_datasets.len(),
                "annotations found"
            );
        }

        found_something
    }

    /// "Are you my mother" test: does `candidate` name one of this file's
    /// outputs?
    ///
    /// True when the cleaned candidate equals this file's relative path,
    /// when this file's absolute path ends with it, or when it is one of the
    /// declared output datasets. Test another file's inputs against this to
    /// find a parent dependency.
    #[must_use]
    pub fn matches_output(&self, candidate: &str) -> bool {
        let candidate = path::clean(candidate);
        self.relative_path.as_deref() == Some(candidate.as_str())
            || self
                .absolute_path
                .as_deref()
                .is_some_and(|absolute| absolute.ends_with(candidate.as_str()))
            || self.output_datasets.contains(&candidate)
    }

    /// Does `candidate` name one of this file's declared inputs (file or
    /// dataset)?
    #[must_use]
    pub fn matches_input(&self, candidate: &str) -> bool {
        let candidate = path::clean(candidate);
        self.input_files.contains(&candidate) || self.input_datasets.contains(&candidate)
    }

    /// Test every output of `potential_parent` against this file's inputs.
    ///
    /// Returns the matched artifacts in order: the parent's own path when
    /// this file consumes it as an input file, then each parent output
    /// dataset this file consumes. Callers use the names to report which
    /// artifact created the edge.
    #[must_use]
    pub fn check_parent_relationships(&self, potential_parent: &FileAnalyzer) -> Vec<String> {
        let mut matching = Vec::new();

        if let Some(parent_path) = potential_parent.relative_path() {
            if self.matches_input(parent_path) {
                matching.push(parent_path.to_string());
            }
        }

        for dataset in &potential_parent.output_datasets {
            if self.matches_input(dataset) {
                matching.push(dataset.clone());
            }
        }

        matching
    }

    /// Whether the current relative path is the one that was parsed.
    ///
    /// Goes stale when the path changes without re-analysis.
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        self.parsed_file.is_some() && self.parsed_file == self.relative_path
    }

    /// The compiled kind this analyzer applies.
    #[must_use]
    pub fn kind(&self) -> &CompiledKind {
        &self.kind
    }

    /// Short language name of this analyzer's kind.
    #[must_use]
    pub fn language(&self) -> &str {
        self.kind.language()
    }

    /// Path relative to `join(project_root, code_path_prefix)`.
    #[must_use]
    pub fn relative_path(&self) -> Option<&str> {
        self.relative_path.as_deref()
    }

    /// Recomputed absolute path of the attached file.
    #[must_use]
    pub fn absolute_path(&self) -> Option<&str> {
        self.absolute_path.as_deref()
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

    /// Input files declared by the analyzed file.
    #[must_use]
    pub fn input_files(&self) -> &BTreeSet<String> {
        &self.input_files
    }

    /// Input datasets declared by the analyzed file.
    #[must_use]
    pub fn input_datasets(&self) -> &BTreeSet<String> {
        &self.input_datasets
    }

    /// Output datasets declared by the analyzed file.
    #[must_use]
    pub fn output_datasets(&self) -> &BTreeSet<String> {
        &self.output_datasets
    }
}

impl fmt::Display for FileAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut language = self.kind.language().to_string();
        if let Some(first) = language.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        writeln!(
            f,
            "{language}:: {}",
            self.relative_path.as_deref().unwrap_or("(unset)")
        )?;

        writeln!(f, "\tINPUT FILES (found {}):", self.input_files.len())?;
        for value in &self.input_files {
            writeln!(f, "\t\t{value}")?;
        }
        writeln!(f, "\tINPUT DATASETS (found {}):", self.input_datasets.len())?;
        for value in &self.input_datasets {
            writeln!(f, "\t\t{value}")?;
        }
        writeln!(f, "\tOUTPUT DATASETS (found {}):", self.output_datasets.len())?;
        for value in &self.output_datasets {
            writeln!(f, "\t\t{value}")?;
        }

        write!(f, "\tProject Root: {}", self.project_root)?;
        if let Some(prefix) = &self.code_path_prefix {
            write!(f, "\n\tCode Prefix: {prefix}")?;
        }
        if let Some(prefix) = &self.data_path_prefix {
            write!(f, "\n\tData Prefix: {prefix}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds;

    fn python_analyzer() -> FileAnalyzer {
        FileAnalyzer::new(kinds::python().compile().unwrap())
    }

    fn analyzer_at(relative: &str) -> FileAnalyzer {
        let mut analyzer = python_analyzer();
        analyzer
            .set_path(Some(relative), None, "/proj", Some("code"), Some("data"))
            .unwrap();
        analyzer
    }

    #[test]
    fn set_path_computes_absolute_from_relative() {
        let analyzer = analyzer_at("sub/clean.py");
        assert_eq!(analyzer.relative_path(), Some("sub/clean.py"));
        assert_eq!(analyzer.absolute_path(), Some("/proj/code/sub/clean.py"));
        assert_eq!(analyzer.project_root(), "/proj");
        assert_eq!(analyzer.code_path_prefix(), Some("code"));
    }

    #[test]
    fn set_path_derives_relative_from_absolute() {
        let mut analyzer = python_analyzer();
        analyzer
            .set_path(
                None,
                Some("/proj/code/sub/clean.py"),
                "/proj",
                Some("code"),
                None,
            )
            .unwrap();
        assert_eq!(analyzer.relative_path(), Some("sub/clean.py"));
        assert_eq!(analyzer.absolute_path(), Some("/proj/code/sub/clean.py"));
    }

    #[test]
    fn analyze_without_path_is_an_error() {
        let mut analyzer = python_analyzer();
        let err = analyzer.analyze(None, None).unwrap_err();
        assert!(matches!(err, Error::MissingPath));
    }

    #[test]
    fn analyze_text_with_no_tags_finds_nothing() {
        let mut analyzer = analyzer_at("a.py");
        let found = analyzer.analyze_text("import os\nprint('hello')\n", None);
        assert!(!found);
        assert!(!analyzer.is_parsed());
        assert!(analyzer.input_files().is_empty());
        assert!(analyzer.input_datasets().is_empty());
        assert!(analyzer.output_datasets().is_empty());
    }

    #[test]
    fn analyze_text_collects_all_three_sets() {
        let mut analyzer = analyzer_at("a.py");
        let text = "\
# INPUT_FILE: load_data.py
# INPUT_DATASET: raw/prices.csv
# OUTPUT: processed/prices_clean.csv
";
        assert!(analyzer.analyze_text(text, None));
        assert!(analyzer.is_parsed());
        assert!(analyzer.input_files().contains("load_data.py"));
        assert!(analyzer.input_datasets().contains("raw/prices.csv"));
        assert!(analyzer.output_datasets().contains("processed/prices_clean.csv"));
    }

    #[test]
    fn duplicate_annotations_collapse() {
        let mut analyzer = analyzer_at("a.py");
        let text = "# OUTPUT: x.csv\n# OUTPUT: x.csv\n";
        assert!(analyzer.analyze_text(text, None));
        assert_eq!(analyzer.output_datasets().len(), 1);
    }

    #[test]
    fn ignore_marker_takes_precedence_regardless_of_order() {
        let mut analyzer = analyzer_at("a.py");
        let text = "\
# OUTPUT: real_output.csv
# RESLIB_IGNORE: true
";
        assert!(!analyzer.analyze_text(text, None));
        assert!(!analyzer.is_parsed());
        assert!(analyzer.output_datasets().is_empty());
    }

    #[test]
    fn ignore_marker_value_is_case_insensitive() {
        for value in ["True", "YES", "1"] {
            let mut analyzer = analyzer_at("a.py");
            let text = format!("# RESLIB_IGNORE: {value}\n# OUTPUT: x.csv\n");
            assert!(!analyzer.analyze_text(&text, None), "value {value}");
        }
    }

    #[test]
    fn false_ignore_marker_does_not_suppress() {
        let mut analyzer = analyzer_at("a.py");
        let text = "# RESLIB_IGNORE: false\n# OUTPUT: x.csv\n";
        assert!(analyzer.analyze_text(text, None));
        assert!(analyzer.output_datasets().contains("x.csv"));
    }

    #[test]
    fn analyze_text_is_idempotent() {
        let mut analyzer = analyzer_at("a.py");
        let text = "# INPUT_DATASET: a.csv\n# OUTPUT: b.csv\n";
        assert!(analyzer.analyze_text(text, None));
        let first_inputs = analyzer.input_datasets().clone();
        let first_outputs = analyzer.output_datasets().clone();

        assert!(analyzer.analyze_text(text, None));
        assert_eq!(analyzer.input_datasets(), &first_inputs);
        assert_eq!(analyzer.output_datasets(), &first_outputs);
    }

    #[test]
    fn dot_relative_values_resolve_against_current_dir() {
        let mut analyzer = analyzer_at("sub/a.py");
        let text = "# INPUT_DATASET: ./local.csv\n";
        assert!(analyzer.analyze_text(text, Some("/proj/code/sub")));
        assert!(
            analyzer.input_datasets().contains("code/sub/local.csv"),
            "got: {:?}",
            analyzer.input_datasets()
        );
    }

    #[test]
    fn dot_relative_values_without_current_dir_are_cleaned_only() {
        let mut analyzer = analyzer_at("sub/a.py");
        let text = "# INPUT_DATASET: ./local.csv\n";
        assert!(analyzer.analyze_text(text, None));
        assert!(analyzer.input_datasets().contains("local.csv"));
    }

    #[test]
    fn set_path_resets_annotations_and_staleness() {
        let mut analyzer = analyzer_at("a.py");
        assert!(analyzer.analyze_text("# OUTPUT: x.csv\n", None));
        assert!(analyzer.is_parsed());

        analyzer
            .set_path(Some("b.py"), None, "/proj", Some("code"), Some("data"))
            .unwrap();
        assert!(!analyzer.is_parsed());
        assert!(analyzer.output_datasets().is_empty());
    }

    #[test]
    fn matches_output_checks_path_and_datasets() {
        let mut analyzer = analyzer_at("sub/a.py");
        analyzer.analyze_text("# OUTPUT: x.csv\n", None);

        assert!(analyzer.matches_output("sub/a.py"));
        assert!(analyzer.matches_output("x.csv"));
        // Absolute-path suffix match.
        assert!(analyzer.matches_output("code/sub/a.py"));
        assert!(!analyzer.matches_output("y.csv"));
    }

    #[test]
    fn matches_input_checks_both_input_sets() {
        let mut analyzer = analyzer_at("a.py");
        analyzer.analyze_text("# INPUT_FILE: load.py\n# INPUT_DATASET: raw.csv\n", None);

        assert!(analyzer.matches_input("load.py"));
        assert!(analyzer.matches_input("./raw.csv"));
        assert!(!analyzer.matches_input("other.csv"));
    }

    #[test]
    fn check_parent_relationships_reports_matched_artifacts() {
        let mut parent = analyzer_at("make_x.py");
        parent.analyze_text("# OUTPUT: x.csv\n", None);

        let mut child = analyzer_at("use_x.py");
        child.analyze_text("# INPUT_DATASET: x.csv\n", None);

        assert_eq!(child.check_parent_relationships(&parent), vec!["x.csv"]);
    }

    #[test]
    fn check_parent_relationships_includes_parent_path() {
        let mut parent = analyzer_at("load.py");
        parent.analyze_text("# OUTPUT: x.csv\n", None);

        let mut child = analyzer_at("analysis.py");
        child.analyze_text("# INPUT_FILE: load.py\n# INPUT_DATASET: x.csv\n", None);

        assert_eq!(
            child.check_parent_relationships(&parent),
            vec!["load.py", "x.csv"]
        );
    }

    #[test]
    fn display_lists_sorted_annotations() {
        let mut analyzer = analyzer_at("a.py");
        analyzer.analyze_text("# OUTPUT: b.csv\n# OUTPUT: a.csv\n", None);
        let text = analyzer.to_string();
        assert!(text.starts_with("Python:: a.py"));
        let a_pos = text.find("a.csv").unwrap();
        let b_pos = text.find("b.csv").unwrap();
        assert!(a_pos < b_pos);
        assert!(text.contains("Code Prefix: code"));
    }
}

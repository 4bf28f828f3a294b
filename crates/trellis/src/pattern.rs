//! Comment-grammar definition and compilation.
//!
//! A [`CommentSpec`] is a declarative, per-language description of how
//! dependency annotations are written: which files the kind applies to, what
//! delimits a comment, and which tag spellings to look for. [`compile`]
//! turns it into a [`CompiledKind`] holding the regular expressions that do
//! the actual matching.
//!
//! Annotation lines have the shape (multiline mode, case-sensitive tags):
//!
//! ```text
//! ^\s*<OPEN>\s*<TAG>:\s*(.+?)\s*<CLOSE>\s*$
//! ```
//!
//! so a Python file declares `# OUTPUT: data/prices.csv` while a SAS file
//! writes `/* OUTPUT: data/prices.csv */`.
//!
//! [`compile`]: CommentSpec::compile

use std::borrow::Cow;

use regex::Regex;

use crate::error::Result;

/// Default encoding label for source files.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Canonical tag spelling for input-file annotations.
pub const INPUT_FILE_TAG: &str = "INPUT_FILE";
/// Canonical tag spelling for input-dataset annotations.
pub const INPUT_DATASET_TAG: &str = "INPUT_DATASET";
/// Canonical tag spelling for output-dataset annotations.
pub const OUTPUT_TAG: &str = "OUTPUT";
/// Canonical tag spelling for the ignore marker.
pub const IGNORE_TAG: &str = "RESLIB_IGNORE";

/// A comment delimiter token.
///
/// Literals are escaped before compilation; patterns are interpolated into
/// the annotation regex verbatim. Making the distinction a variant rather
/// than a string-plus-flag pair keeps invalid combinations unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A literal delimiter string, e.g. `/*`.
    Literal(String),
    /// A regular-expression fragment, e.g. `"\s*#` for notebook JSON lines.
    Pattern(String),
}

impl Token {
    /// A literal delimiter token.
    pub fn literal(s: impl Into<String>) -> Self {
        Self::Literal(s.into())
    }

    /// A regular-expression delimiter token.
    pub fn pattern(s: impl Into<String>) -> Self {
        Self::Pattern(s.into())
    }

    /// The regex fragment this token contributes to an annotation pattern.
    fn as_fragment(&self) -> Cow<'_, str> {
        match self {
            Self::Literal(s) => Cow::Owned(regex::escape(s)),
            Self::Pattern(s) => Cow::Borrowed(s),
        }
    }
}

/// Declarative description of one analyzer kind.
///
/// Built-in kinds live in [`crate::kinds`]; each is the [`base`] record with
/// a few fields overridden. The record is a plain value: construct it once,
/// compile it, and share the compiled form across every file of that kind.
///
/// [`base`]: CommentSpec::base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSpec {
    /// Short language name, e.g. `"stata"`.
    pub language: String,
    /// File extension matched when no explicit `file_match` is set.
    pub extension: String,
    /// Explicit file-match regex overriding extension matching.
    pub file_match: Option<String>,
    /// Encoding label for file reads. Only UTF-8 is decoded; any other label
    /// still appears in decode-error messages for diagnosis.
    pub encoding: String,
    /// Token opening an annotation comment.
    pub comment_open: Token,
    /// Token closing an annotation comment (may be empty).
    pub comment_close: Token,
    /// Tag spelling for input files.
    pub input_file_tag: String,
    /// Tag spelling for input datasets.
    pub input_dataset_tag: String,
    /// Tag spelling for output datasets.
    pub output_tag: String,
    /// Tag spelling for the ignore marker.
    pub ignore_tag: String,
}

impl CommentSpec {
    /// The base record every kind is composed from: `.txt` files with
    /// `/* ... */` comments, UTF-8, canonical tag spellings.
    #[must_use]
    pub fn base() -> Self {
        Self {
            language: "text".to_string(),
            extension: "txt".to_string(),
            file_match: None,
            encoding: DEFAULT_ENCODING.to_string(),
            comment_open: Token::literal("/*"),
            comment_close: Token::literal("*/"),
            input_file_tag: INPUT_FILE_TAG.to_string(),
            input_dataset_tag: INPUT_DATASET_TAG.to_string(),
            output_tag: OUTPUT_TAG.to_string(),
            ignore_tag: IGNORE_TAG.to_string(),
        }
    }

    /// Override the language name.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Override the matched file extension.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set an explicit file-match regex, overriding extension matching.
    #[must_use]
    pub fn with_file_match(mut self, pattern: impl Into<String>) -> Self {
        self.file_match = Some(pattern.into());
        self
    }

    /// Override the comment delimiter tokens.
    #[must_use]
    pub fn with_comment(mut self, open: Token, close: Token) -> Self {
        self.comment_open = open;
        self.comment_close = close;
        self
    }

    /// Override the four tag spellings.
    #[must_use]
    pub fn with_tags(
        mut self,
        input_file: impl Into<String>,
        input_dataset: impl Into<String>,
        output: impl Into<String>,
        ignore: impl Into<String>,
    ) -> Self {
        self.input_file_tag = input_file.into();
        self.input_dataset_tag = input_dataset.into();
        self.output_tag = output.into();
        self.ignore_tag = ignore.into();
        self
    }

    /// Compile the spec into its matching machinery.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Pattern`] when a `Pattern` token or an
    /// explicit `file_match` regex fails to compile.
    pub fn compile(self) -> Result<CompiledKind> {
        let file_match = self.compile_file_match()?;
        let input_file = self.tag_regex(&self.input_file_tag)?;
        let input_dataset = self.tag_regex(&self.input_dataset_tag)?;
        let output_dataset = self.tag_regex(&self.output_tag)?;
        let ignore = self.tag_regex(&self.ignore_tag)?;

        Ok(CompiledKind {
            spec: self,
            file_match,
            input_file,
            input_dataset,
            output_dataset,
            ignore,
        })
    }

    /// The annotation regex for one tag spelling.
    fn tag_regex(&self, tag: &str) -> Result<Regex> {
        let open = self.comment_open.as_fragment();
        let close = self.comment_close.as_fragment();
        let tag = regex::escape(tag);
        let pattern = format!(r"(?m)^\s*{open}\s*{tag}:\s*(.+?)\s*{close}\s*$");
        Ok(Regex::new(&pattern)?)
    }

    /// The file-qualification regex: explicit pattern, else `\.<ext>$`
    /// case-insensitive, else any path carrying an extension.
    fn compile_file_match(&self) -> Result<Regex> {
        if let Some(pattern) = &self.file_match {
            return Ok(Regex::new(&format!("(?i){pattern}"))?);
        }
        if self.extension.is_empty() {
            return Ok(Regex::new(r"\.[^.]*$")?);
        }
        let escaped = regex::escape(&self.extension);
        Ok(Regex::new(&format!(r"(?i)\.{escaped}$"))?)
    }
}

/// A [`CommentSpec`] compiled into regular expressions, shared by every
/// file of the kind.
#[derive(Debug, Clone)]
pub struct CompiledKind {
    spec: CommentSpec,
    file_match: Regex,
    input_file: Regex,
    input_dataset: Regex,
    output_dataset: Regex,
    ignore: Regex,
}

impl CompiledKind {
    /// The spec this kind was compiled from.
    #[must_use]
    pub fn spec(&self) -> &CommentSpec {
        &self.spec
    }

    /// Short language name of this kind.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.spec.language
    }

    /// Whether a path qualifies for this kind.
    #[must_use]
    pub fn matches_file(&self, path: &str) -> bool {
        self.file_match.is_match(path)
    }

    pub(crate) fn input_file(&self) -> &Regex {
        &self.input_file
    }

    pub(crate) fn input_dataset(&self) -> &Regex {
        &self.input_dataset
    }

    pub(crate) fn output_dataset(&self) -> &Regex {
        &self.output_dataset
    }

    pub(crate) fn ignore(&self) -> &Regex {
        &self.ignore
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn base_compiles() {
        let kind = CommentSpec::base().compile().unwrap();
        assert_eq!(kind.language(), "text");
        assert!(kind.matches_file("notes.txt"));
        assert!(!kind.matches_file("notes.py"));
    }

    #[test]
    fn literal_open_token_is_escaped() {
        let kind = CommentSpec::base().compile().unwrap();
        let text = "/* OUTPUT: data/result.csv */";
        let cap = kind.output_dataset().captures(text).unwrap();
        assert_eq!(&cap[1], "data/result.csv");

        // `/*` must not behave as a regex; a bare slash line is no comment.
        assert!(kind.output_dataset().captures("/ OUTPUT: x */").is_none());
    }

    #[test]
    fn empty_close_token_matches_to_end_of_line() {
        let kind = CommentSpec::base()
            .with_comment(Token::literal("#"), Token::literal(""))
            .compile()
            .unwrap();
        let cap = kind.input_file().captures("  # INPUT_FILE: load.py  ").unwrap();
        assert_eq!(&cap[1], "load.py");
    }

    #[test]
    fn tags_are_case_sensitive() {
        let kind = CommentSpec::base()
            .with_comment(Token::literal("#"), Token::literal(""))
            .compile()
            .unwrap();
        assert!(kind.output_dataset().captures("# output: x.csv").is_none());
        assert!(kind.output_dataset().captures("# OUTPUT: x.csv").is_some());
    }

    #[test]
    fn matching_is_line_oriented() {
        let kind = CommentSpec::base()
            .with_comment(Token::literal("#"), Token::literal(""))
            .compile()
            .unwrap();
        let text = "import os\n# INPUT_DATASET: a.csv\nprint('hi')\n# INPUT_DATASET: b.csv\n";
        let values: Vec<&str> = kind
            .input_dataset()
            .captures_iter(text)
            .map(|c| c.get(1).unwrap().as_str())
            .collect();
        assert_eq!(values, vec!["a.csv", "b.csv"]);
    }

    #[rstest]
    #[case("model.do", true)]
    #[case("model.DO", true)]
    #[case("model.do.bak", false)]
    #[case("model.py", false)]
    fn extension_match_is_case_insensitive_and_anchored(
        #[case] path: &str,
        #[case] expected: bool,
    ) {
        let kind = CommentSpec::base()
            .with_extension("do")
            .compile()
            .unwrap();
        assert_eq!(kind.matches_file(path), expected);
    }

    #[test]
    fn empty_extension_falls_back_to_any_extension() {
        let kind = CommentSpec::base().with_extension("").compile().unwrap();
        assert!(kind.matches_file("whatever.xyz"));
        assert!(!kind.matches_file("no_extension"));
    }

    #[test]
    fn explicit_file_match_overrides_extension() {
        let kind = CommentSpec::base()
            .with_file_match(r"(^|/)Makefile$")
            .compile()
            .unwrap();
        assert!(kind.matches_file("sub/Makefile"));
        assert!(!kind.matches_file("Makefile.txt"));
    }

    #[test]
    fn invalid_pattern_token_fails_compilation() {
        let err = CommentSpec::base()
            .with_comment(Token::pattern("["), Token::literal(""))
            .compile()
            .unwrap_err();
        assert!(matches!(err, crate::Error::Pattern(_)));
    }

    #[test]
    fn custom_tag_spellings_are_honored() {
        let kind = CommentSpec::base()
            .with_comment(Token::literal("#"), Token::literal(""))
            .with_tags("INPUT_TASK", "INPUT", "OUTPUT_DATASET", IGNORE_TAG)
            .compile()
            .unwrap();
        assert!(kind.input_file().captures("# INPUT_TASK: a.py").is_some());
        assert!(kind.input_file().captures("# INPUT_FILE: a.py").is_none());
        assert!(
            kind.output_dataset()
                .captures("# OUTPUT_DATASET: x.csv")
                .is_some()
        );
    }
}

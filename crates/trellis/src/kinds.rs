//! Built-in analyzer kinds.
//!
//! Each kind is a [`CommentSpec`] composed from [`CommentSpec::base`] with a
//! few overrides, covering the script flavors commonly found in research
//! pipelines. The two notebook kinds match the JSON-escaped form a comment
//! takes inside an `.ipynb` source array, so annotations survive the
//! round-trip through the notebook format.

use crate::pattern::{CommentSpec, Token};

/// SAS scripts: `.sas`, `/* ... */` comments.
#[must_use]
pub fn sas() -> CommentSpec {
    CommentSpec::base().with_language("sas").with_extension("sas")
}

/// Stata do-files: `.do`, `/* ... */` comments.
#[must_use]
pub fn stata() -> CommentSpec {
    CommentSpec::base().with_language("stata").with_extension("do")
}

/// Jupyter notebooks with `#` comments inside JSON source strings.
#[must_use]
pub fn notebook() -> CommentSpec {
    CommentSpec::base()
        .with_language("notebook")
        .with_extension("ipynb")
        .with_comment(Token::pattern(r#""\s*#"#), Token::pattern(r#"\\n",?"#))
}

/// Jupyter notebooks running Stata, with `/* ... */` comments inside JSON
/// source strings.
#[must_use]
pub fn stata_notebook() -> CommentSpec {
    CommentSpec::base()
        .with_language("statanotebook")
        .with_extension("ipynb")
        .with_comment(Token::literal(r#""/*"#), Token::pattern(r#"[*]/\\n",?"#))
}

/// Python scripts: `.py`, `#` comments with no closing token.
#[must_use]
pub fn python() -> CommentSpec {
    CommentSpec::base()
        .with_language("python")
        .with_extension("py")
        .with_comment(Token::literal("#"), Token::literal(""))
}

/// LaTeX sources: `.tex`, `%` comments with no closing token.
#[must_use]
pub fn latex() -> CommentSpec {
    CommentSpec::base()
        .with_language("latex")
        .with_extension("tex")
        .with_comment(Token::literal("%"), Token::literal(""))
}

/// Manual-step instructions: `.txt`, bare `TAG: value` lines.
///
/// Used to document steps a human performs by hand (a download portal, an
/// emailed file) so they still appear in the dependency graph.
#[must_use]
pub fn manual() -> CommentSpec {
    CommentSpec::base()
        .with_language("manual")
        .with_comment(Token::literal(""), Token::literal(""))
}

/// The default kind set applied when a scanner is built without an explicit
/// selection: SAS, Stata, notebook, Python, in that order.
#[must_use]
pub fn default_kinds() -> Vec<CommentSpec> {
    vec![sas(), stata(), notebook(), python()]
}

/// Every built-in kind, in a stable order.
#[must_use]
pub fn all_kinds() -> Vec<CommentSpec> {
    vec![
        sas(),
        stata(),
        notebook(),
        stata_notebook(),
        python(),
        latex(),
        manual(),
    ]
}

/// Look up a built-in kind by its language name.
///
/// Returns `None` for unknown names.
#[must_use]
pub fn by_name(name: &str) -> Option<CommentSpec> {
    match name {
        "sas" => Some(sas()),
        "stata" => Some(stata()),
        "notebook" => Some(notebook()),
        "statanotebook" => Some(stata_notebook()),
        "python" => Some(python()),
        "latex" => Some(latex()),
        "manual" => Some(manual()),
        _ => None,
    }
}

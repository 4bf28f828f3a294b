//! Path normalization helpers.
//!
//! Every path trellis stores or compares is a *normalized* string: forward
//! slashes only, no leading `./`, no trailing `/`, surrounding whitespace
//! trimmed. Two equal strings denote the same logical file regardless of the
//! separator style or relative prefix they were written with, which is what
//! makes annotation values comparable across files and platforms.

use std::path::Path;

use crate::error::{Error, Result};

/// Normalize a path string.
///
/// Replaces backslash runs with a single forward slash, strips a leading
/// `./` and a trailing `/`, and trims surrounding whitespace.
#[must_use]
pub fn clean(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut in_backslashes = false;
    for ch in path.trim().chars() {
        if ch == '\\' {
            if !in_backslashes {
                out.push('/');
            }
            in_backslashes = true;
        } else {
            out.push(ch);
            in_backslashes = false;
        }
    }

    // Strip to a fixpoint: removing a prefix or suffix can expose another
    // (e.g. "a/ /" -> "a/ " -> "a/" -> "a").
    let mut s: &str = &out;
    loop {
        let t = s.trim();
        let t = t.strip_prefix("./").unwrap_or(t);
        let t = t.strip_suffix('/').unwrap_or(t);
        if t == s {
            break;
        }
        s = t;
    }
    s.to_string()
}

/// Normalize an optional path string; `None` stays `None`.
#[must_use]
pub fn clean_opt(path: Option<&str>) -> Option<String> {
    path.map(clean)
}

/// Join path segments, dropping `None` and empty entries, then normalize.
///
/// Normalization collapses `.` and `..` segments lexically before the result
/// passes through [`clean`].
///
/// # Errors
///
/// Returns [`Error::Path`] when no non-empty segment remains.
pub fn join(parts: &[Option<&str>]) -> Result<String> {
    let mut joined = String::new();
    for part in parts.iter().flatten() {
        if part.is_empty() {
            continue;
        }
        // A later absolute segment restarts the path, like os.path.join.
        if part.starts_with('/') || part.starts_with('\\') {
            joined.clear();
        }
        if !joined.is_empty() && !joined.ends_with('/') {
            joined.push('/');
        }
        joined.push_str(part);
    }

    if joined.is_empty() {
        return Err(Error::Path(format!(
            "all path segments empty or missing: {parts:?}"
        )));
    }

    Ok(clean(&normalize(&clean(&joined))))
}

/// Collapse `.` and `..` segments without touching the filesystem.
fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut stack: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match stack.last() {
                Some(&"..") | None if !absolute => stack.push(".."),
                None => {}
                Some(_) => {
                    stack.pop();
                }
            },
            other => stack.push(other),
        }
    }

    let body = stack.join("/");
    if absolute {
        format!("/{body}")
    } else if body.is_empty() {
        ".".to_string()
    } else {
        body
    }
}

/// Resolve a project root to a cleaned absolute path.
///
/// A leading `~` expands to the user's home directory; a relative root is
/// resolved against the current working directory. The result is purely
/// lexical — the directory is not required to exist.
///
/// # Errors
///
/// Returns [`Error::Path`] when `~` is used but no home directory is known,
/// or [`Error::Io`] when the current directory cannot be determined.
pub fn expand_root(root: &str) -> Result<String> {
    let mut root = root.trim().to_string();

    if let Some(rest) = root.strip_prefix('~') {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Path("cannot expand ~: home directory unknown".to_string()))?;
        let home = home.to_string_lossy();
        root = format!("{}/{}", home, rest.trim_start_matches(['/', '\\']));
    }

    if !Path::new(&root).is_absolute() {
        let cwd = std::env::current_dir()?;
        root = format!("{}/{}", cwd.to_string_lossy(), root);
    }

    join(&[Some(&root)])
}

/// Re-express `path` relative to `base`, both in normalized form.
///
/// Shared leading segments are stripped; remaining `base` segments become
/// `..` hops, like `os.path.relpath`.
#[must_use]
pub fn relative_to(path: &str, base: &str) -> String {
    let path = clean(path);
    let base = clean(base);

    let path_parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
    let base_parts: Vec<&str> = base.split('/').filter(|s| !s.is_empty() && *s != ".").collect();

    let common = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    for _ in common..base_parts.len() {
        parts.push("..");
    }
    parts.extend(&path_parts[common..]);

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// The directory portion of a normalized path, if any.
#[must_use]
pub fn parent(path: &str) -> Option<&str> {
    path.rsplit_once('/')
        .map(|(dir, _)| dir)
        .filter(|dir| !dir.is_empty())
}

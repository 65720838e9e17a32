//! Architectural Enforcement
//!
//! Source scanners backing the workspace's architectural tests:
//! - No blocking I/O inside async functions
//! - No inline event handler attributes in generated markup
//! - No `unwrap()` / `expect()` in production code
//!
//! Only production code is scanned: everything from a file's first
//! `#[cfg(test)]` onwards is ignored, as are comment lines.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["lyphgui/core/src", "lyphgui/console/src"];

/// A rule broken at a specific line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// File containing the violation
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// What was found
    pub rule: &'static str,
    /// The offending line, trimmed
    pub text: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} - {}: {}",
            self.path.display(),
            self.line,
            self.rule,
            self.text
        )
    }
}

/// Workspace root (two levels above this package)
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// All `.rs` files below `dir`
#[must_use]
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect()
}

/// Production lines of a source file as `(index, code)`
///
/// Stops at the first `#[cfg(test)]`; drops comment lines and trailing `//`
/// comments.
#[must_use]
pub fn production_lines(content: &str) -> Vec<(usize, String)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .map(|(idx, line)| (idx, strip_trailing_comment(line).to_string()))
        .collect()
}

/// Drop a `// comment` that is not inside a string literal
fn strip_trailing_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut prev = ' ';
    for (i, c) in line.char_indices() {
        match c {
            '"' if prev != '\\' => in_string = !in_string,
            '/' if !in_string && prev == '/' => return &line[..i - 1],
            _ => {}
        }
        prev = c;
    }
    line
}

/// Whether the nearest enclosing `fn` above `idx` is async
#[must_use]
pub fn in_async_fn(lines: &[&str], idx: usize) -> bool {
    for line in lines[..=idx].iter().rev() {
        let line = line.trim();
        if line.contains("async fn ") || line.contains("async move") {
            return true;
        }
        if line.contains("fn ") {
            return false;
        }
    }
    false
}

/// Blocking calls that stall the runtime when made from async code
const BLOCKING_PATTERNS: &[(&str, &str)] = &[
    ("std::fs::", "Blocking file I/O"),
    ("std::net::", "Blocking network I/O"),
    ("std::thread::sleep", "Blocking sleep"),
    ("std::process::Command", "Blocking process I/O"),
    ("reqwest::blocking", "Blocking HTTP client"),
    ("std::io::stdin()", "Blocking stdin"),
    ("std::io::stdout()", "Blocking stdout"),
];

/// Blocking I/O inside async functions
#[must_use]
pub fn blocking_io_violations(path: &Path, content: &str) -> Vec<Violation> {
    let lines: Vec<&str> = content.lines().collect();
    let mut violations = Vec::new();

    for (idx, code) in production_lines(content) {
        for (pattern, rule) in BLOCKING_PATTERNS {
            if code.contains(pattern) && in_async_fn(&lines, idx) {
                violations.push(Violation {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    rule,
                    text: lines[idx].trim().to_string(),
                });
            }
        }
    }
    violations
}

/// Event handler attributes that would embed script in markup
const INLINE_HANDLERS: &[&str] = &[
    "onclick=",
    "ondblclick=",
    "onchange=",
    "onsubmit=",
    "onload=",
    "onerror=",
    "onmouseover=",
    "onfocus=",
    "onkeydown=",
];

/// Inline event handler attributes in production code
#[must_use]
pub fn inline_handler_violations(path: &Path, content: &str) -> Vec<Violation> {
    let lines: Vec<&str> = content.lines().collect();
    production_lines(content)
        .into_iter()
        .filter(|(_, code)| {
            let lower = code.to_ascii_lowercase();
            INLINE_HANDLERS.iter().any(|attr| lower.contains(attr))
        })
        .map(|(idx, _)| Violation {
            path: path.to_path_buf(),
            line: idx + 1,
            rule: "Inline event handler",
            text: lines[idx].trim().to_string(),
        })
        .collect()
}

/// `unwrap()` / `expect(` in production code
#[must_use]
pub fn panic_violations(path: &Path, content: &str) -> Vec<Violation> {
    let lines: Vec<&str> = content.lines().collect();
    production_lines(content)
        .into_iter()
        .filter(|(_, code)| code.contains(".unwrap()") || code.contains(".expect("))
        .map(|(idx, _)| Violation {
            path: path.to_path_buf(),
            line: idx + 1,
            rule: "Panicking unwrap",
            text: lines[idx].trim().to_string(),
        })
        .collect()
}

/// Run a scanner over every production file
pub fn scan_production<F>(scanner: F) -> Vec<Violation>
where
    F: Fn(&Path, &str) -> Vec<Violation>,
{
    let root = workspace_root();
    let mut violations = Vec::new();

    for dir in PRODUCTION_DIRS {
        for file in rust_files(&root.join(dir)) {
            let Ok(content) = fs::read_to_string(&file) else {
                continue;
            };
            violations.extend(scanner(&file, &content));
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_tests() {
        let src = "fn a() {}\n// note\n#[cfg(test)]\nmod tests { fn b() {} }\n";
        let lines = production_lines(src);
        assert_eq!(lines, vec![(0, "fn a() {}".to_string())]);
    }

    #[test]
    fn test_trailing_comment_outside_string() {
        assert_eq!(strip_trailing_comment("let x = 1; // one"), "let x = 1; ");
        assert_eq!(
            strip_trailing_comment(r#"let u = "http://host";"#),
            r#"let u = "http://host";"#
        );
    }

    #[test]
    fn test_blocking_in_async_detected() {
        let src = "async fn load() {\n    let s = std::fs::read_to_string(p);\n}\n\
                   fn sync_load() {\n    let s = std::fs::read_to_string(p);\n}\n";
        let violations = blocking_io_violations(Path::new("x.rs"), src);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 2);
    }

    #[test]
    fn test_inline_handler_detected() {
        let src = "fn r() -> String {\n    \"<a onClick=\\\"go()\\\">\".into()\n}\n";
        assert_eq!(inline_handler_violations(Path::new("x.rs"), src).len(), 1);

        let clean = "fn r() -> String {\n    \"<a data-action=\\\"go\\\">\".into()\n}\n";
        assert!(inline_handler_violations(Path::new("x.rs"), clean).is_empty());
    }

    #[test]
    fn test_unwrap_or_is_allowed() {
        let src = "fn f() {\n    a.unwrap_or(1);\n    b.unwrap();\n}\n";
        let violations = panic_violations(Path::new("x.rs"), src);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 3);
    }
}

//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleeping and no wall clock in the reveal core
//! - No UI crates in the reveal core
//! - No panicking shortcuts in production code
//!
//! The helpers here scan workspace sources; the rules live in `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// A rule violation, printed as `path:line - code`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File the violation is in
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Offending line, trimmed
    pub code: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line, self.code)
    }
}

/// Workspace root, two levels above this package
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Every `.rs` file under `dir` (relative to the workspace root)
pub fn rust_sources(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Production lines of a source file as `(line_number, code)`
///
/// Comments are stripped and everything from the first `#[cfg(test)]` on is
/// dropped, since test modules sit at the bottom of each file.
pub fn production_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .map(|(idx, line)| (idx + 1, line.split("//").next().unwrap_or(line)))
        .filter(|(_, code)| !code.trim().is_empty())
        .collect()
}

/// Scan production code under `dir` for lines matching `is_violation`
pub fn scan<F>(dir: &str, is_violation: F) -> Vec<Violation>
where
    F: Fn(&Path, &[(usize, &str)], usize) -> bool,
{
    let mut violations = Vec::new();
    for path in rust_sources(dir) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let lines = production_lines(&content);
        for (idx, (line, code)) in lines.iter().enumerate() {
            if is_violation(&path, &lines, idx) {
                violations.push(Violation {
                    path: path.clone(),
                    line: *line,
                    code: code.trim().to_string(),
                });
            }
        }
    }
    violations
}

/// Panic with a readable report if `violations` is not empty
pub fn assert_clean(rule: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\n{rule}\n");
    for violation in violations {
        eprintln!("  {violation}");
    }
    panic!("\nFound {} violation(s): {rule}", violations.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let src = "fn a() {} // note\n\n#[cfg(test)]\nmod tests { fn b() {} }\n";
        assert_eq!(production_lines(src), vec![(1, "fn a() {} ")]);
    }

    #[test]
    fn test_workspace_root_contains_core() {
        assert!(workspace_root().join("reveal/core/Cargo.toml").exists());
        assert!(!rust_sources("reveal/core/src").is_empty());
    }
}

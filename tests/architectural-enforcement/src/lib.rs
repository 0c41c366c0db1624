//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - The sync core stays headless (no terminal or UI crates)
//! - No blocking I/O or thread sleeps in async production code
//! - Only the core talks HTTP
//!
//! The helpers below scan workspace sources as plain text.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Workspace root (two levels above this package)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// A matching line in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File, relative to the workspace root
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.file.display(), self.line, self.text)
    }
}

/// Production `.rs` files under `dir` (relative to the workspace root)
///
/// Skips `tests/` directories and `target/`.
pub fn production_sources(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    WalkDir::new(&root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "rs"))
        .filter(|path| {
            !path
                .strip_prefix(&root)
                .unwrap_or(path)
                .components()
                .any(|c| c.as_os_str() == "tests" || c.as_os_str() == "target")
        })
        .collect()
}

/// Lines containing `pattern` outside `#[cfg(test)]` modules and comments
pub fn find_in_production(dir: &str, pattern: &str) -> Vec<Violation> {
    let root = workspace_root();
    let mut violations = Vec::new();

    for path in production_sources(dir) {
        let Ok(source) = fs::read_to_string(&path) else {
            continue;
        };
        for (index, line) in source.lines().enumerate() {
            // test modules sit at the bottom of each file
            if line.trim_start().starts_with("#[cfg(test)]") {
                break;
            }
            let trimmed = line.trim();
            if trimmed.starts_with("//") {
                continue;
            }
            if trimmed.contains(pattern) {
                violations.push(Violation {
                    file: path.strip_prefix(&root).unwrap_or(&path).to_path_buf(),
                    line: index + 1,
                    text: trimmed.to_string(),
                });
            }
        }
    }

    violations
}

/// Dependency names declared in a crate's `Cargo.toml`
///
/// Reads `name = ...` and `name.workspace = true` keys from every
/// dependency table.
pub fn declared_dependencies(manifest_dir: &str) -> Vec<String> {
    let path = workspace_root().join(manifest_dir).join("Cargo.toml");
    let Ok(manifest) = fs::read_to_string(path) else {
        return Vec::new();
    };

    let mut in_deps = false;
    let mut deps = Vec::new();
    for line in manifest.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_deps = line.ends_with("dependencies]");
            continue;
        }
        if !in_deps || line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, _)) = line.split_once('=') {
            let name = key.trim().split('.').next().unwrap_or_default();
            deps.push(name.to_string());
        }
    }
    deps
}

/// Format violations for an assertion message
pub fn report(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

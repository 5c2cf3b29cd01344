//! Input discovery and line loading.
//!
//! Resolves the `--input` argument (a file, a directory, a `file://` URI, or
//! a file-name pattern such as `exports/food_*.csv`) to a sorted list of
//! files, then reads each one into [`SourceLine`]s with its header skipped.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use orders_core::error::{EtlError, Result};
use orders_core::models::SourceLine;
use regex::Regex;
use tracing::{debug, warn};

/// Header lines dropped from the top of every input file.
pub const DEFAULT_HEADER_LINES: usize = 1;

// ── InputSource ───────────────────────────────────────────────────────────────

/// A parsed `--input` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A single file, or a directory scanned for `.csv` files.
    Path(PathBuf),
    /// Files in `dir` whose name matches a `*` / `?` pattern.
    Pattern { dir: PathBuf, pattern: String },
}

impl InputSource {
    /// Parse a local path, `file://` URI, or file-name pattern.
    ///
    /// Any other URI scheme is rejected with [`EtlError::UnsupportedScheme`].
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(EtlError::Config("input path is empty".to_string()));
        }

        let local = match trimmed.split_once("://") {
            Some(("file", rest)) => rest,
            Some((scheme, _)) => return Err(EtlError::UnsupportedScheme(scheme.to_string())),
            None => trimmed,
        };

        let path = PathBuf::from(local);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if has_wildcard(&dir.to_string_lossy()) {
            return Err(EtlError::Config(format!(
                "wildcards are only supported in the file name: {}",
                input
            )));
        }

        if !has_wildcard(&name) {
            return Ok(InputSource::Path(path));
        }

        Ok(InputSource::Pattern { dir, pattern: name })
    }

    /// List the files this source refers to, sorted by path.
    ///
    /// Fails with [`EtlError::InputNotFound`] when nothing matches.
    pub fn resolve(&self, original: &str) -> Result<Vec<PathBuf>> {
        let files = match self {
            InputSource::Path(path) if path.is_file() => vec![path.clone()],
            InputSource::Path(path) if path.is_dir() => find_csv_files(path),
            InputSource::Path(_) => Vec::new(),
            InputSource::Pattern { dir, pattern } => find_matching_files(dir, pattern)?,
        };

        if files.is_empty() {
            return Err(EtlError::InputNotFound(original.to_string()));
        }
        Ok(files)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Resolve `input` and read every matching file.
///
/// Lines are returned file by file in path order; within a file, in file
/// order. `header_lines` lines are dropped from the top of each file.
pub fn load_lines(input: &str, header_lines: usize) -> Result<Vec<SourceLine>> {
    let source = InputSource::parse(input)?;
    let files = source.resolve(input)?;

    let mut lines = Vec::new();
    for file in &files {
        lines.extend(read_file(file, header_lines)?);
    }

    debug!("Read {} lines from {} files", lines.len(), files.len());
    Ok(lines)
}

/// Read one file, skipping `header_lines` and stripping trailing `\r`.
pub fn read_file(path: &Path, header_lines: usize) -> Result<Vec<SourceLine>> {
    let file = std::fs::File::open(path).map_err(|source| EtlError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = std::io::BufReader::new(file);

    let mut lines = Vec::new();
    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|source| EtlError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        if idx < header_lines {
            continue;
        }
        let text = line.strip_suffix('\r').unwrap_or(&line).to_string();
        lines.push(SourceLine::new(
            format!("{}:{}", path.display(), idx + 1),
            text,
        ));
    }

    debug!("File {}: {} data lines", path.display(), lines.len());
    Ok(lines)
}

/// Find all `.csv` files recursively under `dir`, sorted by path.
pub fn find_csv_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn has_wildcard(s: &str) -> bool {
    s.contains('*') || s.contains('?')
}

/// Translate a file-name pattern into an anchored regex.
fn pattern_to_regex(pattern: &str) -> Result<Regex> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|e| EtlError::Config(format!("invalid input pattern: {e}")))
}

/// Files directly inside `dir` whose name matches `pattern`.
fn find_matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        warn!("Input directory does not exist: {}", dir.display());
        return Ok(Vec::new());
    }

    let re = pattern_to_regex(pattern)?;
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file() && re.is_match(&entry.file_name().to_string_lossy())
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    Ok(files)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

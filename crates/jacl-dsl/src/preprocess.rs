//! Preprocessor: turns an authored game file into a compact, optionally
//! obfuscated one.
//!
//! `#include "file"` lines are expanded in place, lines are trimmed, blank
//! lines and comments are removed, and in release mode `debug` statements
//! are dropped. Text inside `print` blocks is passed through untouched.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::crypt::{self, PROCESSED_PREFIX};
use crate::error::{LoadError, LoadResult};
use crate::loader::PROCESSED_VERSION;

const INCLUDE_DIRECTIVE: &str = "#include";

/// Preprocessor settings.
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Obfuscate the output after an `#encrypted` marker.
    pub encrypt: bool,
    /// Drop `debug` statements.
    pub release: bool,
    /// Directory searched for included files. When unset, includes are
    /// resolved relative to the including file.
    pub include_dir: Option<PathBuf>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            encrypt: true,
            release: false,
            include_dir: None,
        }
    }
}

impl PreprocessConfig {
    pub fn with_encrypt(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }

    pub fn with_release(mut self, release: bool) -> Self {
        self.release = release;
        self
    }

    pub fn with_include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dir = Some(dir.into());
        self
    }
}

/// Preprocess `input` and write the result to `output`.
pub fn preprocess(input: &Path, output: &Path, config: &PreprocessConfig) -> LoadResult<()> {
    let bytes = render(input, config)?;
    std::fs::write(output, bytes).map_err(|e| LoadError::io(output, e))?;
    info!("preprocessed {} into {}", input.display(), output.display());
    Ok(())
}

/// Preprocess `input` into the bytes of a processed game file.
pub fn render(input: &Path, config: &PreprocessConfig) -> LoadResult<Vec<u8>> {
    let lines = preprocess_lines(input, config)?;
    let mut out = format!("{PROCESSED_PREFIX}{PROCESSED_VERSION}\n").into_bytes();
    if config.encrypt {
        out.extend(crypt::encode_lines(lines.iter().map(String::as_str)));
    } else {
        for line in &lines {
            out.extend_from_slice(line.as_bytes());
            out.push(b'\n');
        }
    }
    Ok(out)
}

/// The lines that survive preprocessing, with includes expanded.
pub fn preprocess_lines(input: &Path, config: &PreprocessConfig) -> LoadResult<Vec<String>> {
    let mut out = Vec::new();
    let mut stack = Vec::new();
    expand(input, config, &mut stack, &mut out)?;
    Ok(out)
}

fn expand(
    path: &Path,
    config: &PreprocessConfig,
    stack: &mut Vec<PathBuf>,
    out: &mut Vec<String>,
) -> LoadResult<()> {
    let canonical = path.canonicalize().map_err(|e| LoadError::io(path, e))?;
    if stack.contains(&canonical) {
        return Err(LoadError::Include(format!(
            "{} includes itself",
            path.display()
        )));
    }
    let bytes = std::fs::read(path).map_err(|e| LoadError::io(path, e))?;
    stack.push(canonical);
    debug!("expanding {}", path.display());

    let mut in_print = false;
    for (_, text) in crypt::decode_lines(&bytes) {
        if in_print {
            if text.trim_start().starts_with('.') {
                in_print = false;
                out.push(".".to_string());
            } else {
                out.push(text.trim_end().to_string());
            }
            continue;
        }

        let trimmed = text.trim();
        if let Some(target) = include_target(trimmed) {
            let base = match &config.include_dir {
                Some(dir) => dir.clone(),
                None => path.parent().map(Path::to_path_buf).unwrap_or_default(),
            };
            expand(&base.join(target), config, stack, out)?;
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let keyword = trimmed.split([' ', '\t', ':']).next().unwrap_or_default();
        if config.release && keyword == "debug" {
            continue;
        }
        if keyword == "print" {
            in_print = true;
        }
        out.push(trimmed.to_string());
    }

    stack.pop();
    Ok(())
}

/// The file named by an `#include "file"` line.
fn include_target(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(INCLUDE_DIRECTIVE)?.trim();
    let rest = rest.strip_prefix('"').unwrap_or(rest);
    let rest = rest.strip_suffix('"').unwrap_or(rest);
    (!rest.is_empty()).then_some(rest)
}

//! Reads the line-oriented specification file format of spec section 6,
//! grounded on `examples/original_source/scripts/generate.py`'s
//! `CollectSpecification` action: first non-blank line is the bare name,
//! every other non-blank line is `NAME  BODY`. A missing name or a
//! body-less line is a hard error in the original (`ValueError`); here it
//! is [`SpecFileError`].

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecFileError {
    #[error("could not read {0}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("{0}: missing specification name")]
    MissingName(PathBuf),
    #[error("{0}: specification name cannot contain whitespace")]
    NameHasWhitespace(PathBuf),
    #[error("{0}: line {1:?} has no body")]
    BodylessLine(PathBuf, String),
}

/// `(name, rules)` where each rule is `(rule_name, body)` in file order.
pub fn read(path: &Path) -> Result<(String, Vec<(String, String)>), SpecFileError> {
    let contents =
        fs::read_to_string(path).map_err(|e| SpecFileError::Io(path.to_path_buf(), e))?;
    let mut lines = contents.lines().filter(|line| !line.trim().is_empty());

    let name = lines
        .next()
        .ok_or_else(|| SpecFileError::MissingName(path.to_path_buf()))?
        .trim()
        .to_string();
    if name.is_empty() {
        return Err(SpecFileError::MissingName(path.to_path_buf()));
    }
    if name.split_whitespace().count() > 1 {
        return Err(SpecFileError::NameHasWhitespace(path.to_path_buf()));
    }

    let mut rules = Vec::new();
    for line in lines {
        let trimmed = line.trim_start();
        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let rule_name = parts.next().unwrap_or("").to_string();
        let body = parts.next().unwrap_or("").trim().to_string();
        if rule_name.is_empty() || body.is_empty() {
            return Err(SpecFileError::BodylessLine(
                path.to_path_buf(),
                line.to_string(),
            ));
        }
        rules.push((rule_name, body));
    }
    Ok((name, rules))
}

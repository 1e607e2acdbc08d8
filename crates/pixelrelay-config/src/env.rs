use std::sync::OnceLock;

use regex::{Captures, Regex};
use thiserror::Error;

/// Failure while substituting `{{ env.VAR }}` placeholders
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpandError {
    /// Placeholder names a variable that is unset and has no default
    #[error("environment variable not found: `{0}`")]
    MissingVariable(String),

    /// Placeholder uses a scope other than `env.`
    #[error("only variables scoped with 'env.' are supported: `{0}`")]
    UnsupportedScope(String),
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // group 1: scoped key, group 2: optional default("...") value
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([a-zA-Z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
            .expect("must be valid regex")
    })
}

/// Expand `{{ env.VAR }}` placeholders in raw TOML text
///
/// `{{ env.VAR | default("fallback") }}` substitutes the fallback when the
/// variable is unset. Comment lines are copied through untouched so that
/// commented-out settings never require their variables.
pub fn expand_env(input: &str) -> Result<String, ExpandError> {
    let mut output = String::with_capacity(input.len());

    for (index, line) in input.lines().enumerate() {
        if index > 0 {
            output.push('\n');
        }

        if line.trim_start().starts_with('#') {
            output.push_str(line);
        } else {
            output.push_str(&expand_line(line)?);
        }
    }

    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

fn expand_line(line: &str) -> Result<String, ExpandError> {
    let mut result = String::with_capacity(line.len());
    let mut last_end = 0;

    for captures in placeholder().captures_iter(line) {
        let Some(whole) = captures.get(0) else {
            continue;
        };

        result.push_str(&line[last_end..whole.start()]);
        result.push_str(&resolve(&captures)?);
        last_end = whole.end();
    }

    result.push_str(&line[last_end..]);
    Ok(result)
}

fn resolve(captures: &Captures<'_>) -> Result<String, ExpandError> {
    let key = captures.get(1).map_or("", |m| m.as_str());
    let default_value = captures.get(2).map(|m| m.as_str());

    let var_name = match key.split_once('.') {
        Some(("env", name)) if !name.is_empty() && !name.contains('.') => name,
        _ => return Err(ExpandError::UnsupportedScope(key.to_string())),
    };

    match (std::env::var(var_name), default_value) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_string()),
        (Err(_), None) => Err(ExpandError::MissingVariable(var_name.to_string())),
    }
}

// src/utils.rs
use crate::types::SifError;
use regex::Regex;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

/// Reads lines from a file into a vector of strings.
pub fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    reader.lines().collect()
}

/// Splits a text body into lines, dropping a trailing `\r` from each.
pub fn body_lines(body: &str) -> Vec<String> {
    body.lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

/// Parses `10`, `10s`, `500ms`, `2m` or `1h`. A bare number means seconds.
pub fn parse_duration(input: &str) -> Result<Duration, SifError> {
    let re = Regex::new(r"^\s*(\d+)\s*(ms|s|m|h)?\s*$")
        .map_err(|e| SifError::Parse(format!("Regex error: {}", e)))?;

    let caps = re
        .captures(input)
        .ok_or_else(|| SifError::Parse(format!("Invalid duration: {}", input)))?;

    let value: u64 = caps[1]
        .parse()
        .map_err(|e| SifError::Parse(format!("Invalid duration {}: {}", input, e)))?;

    let too_large = || SifError::Parse(format!("Duration out of range: {}", input));
    let duration = match caps.get(2).map(|m| m.as_str()) {
        Some("ms") => Duration::from_millis(value),
        Some("m") => Duration::from_secs(value.checked_mul(60).ok_or_else(too_large)?),
        Some("h") => Duration::from_secs(value.checked_mul(3600).ok_or_else(too_large)?),
        _ => Duration::from_secs(value),
    };

    Ok(duration)
}

/// clap value parser wrapper around [`parse_duration`].
pub fn duration_arg(input: &str) -> Result<Duration, String> {
    parse_duration(input).map_err(|e| e.to_string())
}

/// Splits comma separated values and drops empty entries.
pub fn split_csv(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Remove duplicates (case-insensitive), keeping first occurrence order.
pub fn deduplicate(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for item in items {
        if seen.insert(item.to_lowercase()) {
            unique.push(item);
        }
    }

    unique
}

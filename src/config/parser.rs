//! INI-style parser for llxc.conf and LXC container configs
//!
//! llxc.conf uses `[Section]` headers with `Key=Value` lines. LXC container
//! configs are flat `lxc.key = value` files with no sections; both share the
//! same line grammar.

use std::collections::HashMap;
use std::path::Path;

/// A section maps upper-cased keys to their values in file order
/// The u32 is the order the value appeared (for last-wins lookups)
pub type ParsedSection = HashMap<String, Vec<(u32, String)>>;

/// A parsed file is a map of section names to their contents
pub type ParsedFile = HashMap<String, ParsedSection>;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Section '{0}' appears more than once")]
    DuplicateSection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Parse an llxc.conf style file from a string
pub fn parse_file(content: &str) -> Result<ParsedFile, ParseError> {
    let mut sections = HashMap::new();
    let lines: Vec<&str> = content.lines().map(|s| s.trim()).collect();

    let mut lines_iter = lines.iter().peekable();

    // Skip lines before the first section
    while lines_iter.peek().map_or(false, |l| !l.starts_with('[')) {
        lines_iter.next();
    }

    let Some(first_section) = lines_iter.next() else {
        return Ok(sections);
    };

    let mut current_section_name = first_section.to_string();
    let mut current_section_lines = Vec::new();

    for line in lines_iter {
        if line.starts_with('[') {
            if sections.contains_key(&current_section_name) {
                return Err(ParseError::DuplicateSection(current_section_name));
            }
            sections.insert(
                current_section_name.clone(),
                parse_section(&current_section_lines),
            );
            current_section_name = line.to_string();
            current_section_lines.clear();
        } else {
            current_section_lines.push(*line);
        }
    }

    if sections.contains_key(&current_section_name) {
        return Err(ParseError::DuplicateSection(current_section_name));
    }
    sections.insert(current_section_name, parse_section(&current_section_lines));

    Ok(sections)
}

/// Parse a single section's lines into key-value pairs
fn parse_section(lines: &[&str]) -> ParsedSection {
    let mut entries: ParsedSection = HashMap::new();

    for (order, (name, value)) in lines.iter().filter_map(|l| split_line(l)).enumerate() {
        entries
            .entry(name.to_uppercase())
            .or_default()
            .push((order as u32, value.to_string()));
    }

    entries
}

/// Split `key = value`, skipping comments and blank lines
fn split_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.starts_with('#') || line.starts_with(';') || line.is_empty() {
        return None;
    }
    let (name, value) = line.split_once('=')?;
    Some((name.trim(), value.trim()))
}

/// Last value set for a key in a section (keys are matched case-insensitively)
pub fn last_value<'a>(section: &'a ParsedSection, key: &str) -> Option<&'a str> {
    section
        .get(&key.to_uppercase())
        .and_then(|values| values.iter().max_by_key(|(order, _)| *order))
        .map(|(_, v)| v.as_str())
}

/// Parse a flat LXC container config (`lxc.rootfs.path = dir:/...`)
///
/// Keys keep their case; repeated keys are all returned in file order.
pub fn parse_pairs(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .filter_map(split_line)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Read and parse a flat config from disk
pub async fn parse_pairs_file(path: &Path) -> Result<Vec<(String, String)>, ParseError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(parse_pairs(&content))
}

/// Parse a duration (e.g., "500ms", "2s", "5min", "1h", bare number = seconds)
pub fn parse_duration(s: &str) -> Option<std::time::Duration> {
    use std::time::Duration;

    let s = s.trim();

    if let Some(n) = s.strip_suffix("ms") {
        n.trim().parse().ok().map(Duration::from_millis)
    } else if let Some(n) = s.strip_suffix("min") {
        n.trim().parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else if let Some(n) = s.strip_suffix('s') {
        n.trim().parse().ok().map(Duration::from_secs)
    } else if let Some(n) = s.strip_suffix('h') {
        n.trim().parse::<u64>().ok().map(|h| Duration::from_secs(h * 3600))
    } else {
        s.parse().ok().map(Duration::from_secs)
    }
}

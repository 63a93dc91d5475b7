//! Minimal GenBank flat-file reader. Covers what the pipeline consumes:
//! record boundaries, the FEATURES table with multi-line locations and
//! qualifiers, and labelled top-level field blocks such as CONTIG.

use crate::domain::Strand;
use crate::error::ScanError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRecord {
    pub accession: String,
    pub features: Vec<FlatFeature>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatFeature {
    pub key: String,
    pub location: String,
    pub qualifiers: Vec<Qualifier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Qualifier {
    pub key: String,
    pub value: Option<String>,
}

impl FlatFeature {
    /// First value for a qualifier key, unquoted.
    pub fn qualifier(&self, key: &str) -> Option<&str> {
        self.qualifiers
            .iter()
            .find(|q| q.key == key)
            .and_then(|q| q.value.as_deref())
    }

    /// All values for a qualifier key, in file order.
    pub fn qualifier_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> {
        self.qualifiers
            .iter()
            .filter(move |q| q.key == key)
            .filter_map(|q| q.value.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
}

/// Parse one or more flat records out of raw efetch text. Records are
/// separated by `//` terminator lines; text before the first LOCUS line is
/// ignored.
pub fn parse_records(text: &str) -> Result<Vec<FlatRecord>, ScanError> {
    let mut records = Vec::new();
    let mut chunk: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim_end() == "//" {
            if !chunk.is_empty() {
                records.push(parse_record(&chunk)?);
                chunk.clear();
            }
            continue;
        }
        if chunk.is_empty() && !line.starts_with("LOCUS") {
            continue;
        }
        chunk.push(line);
    }
    if !chunk.is_empty() {
        records.push(parse_record(&chunk)?);
    }

    Ok(records)
}

fn parse_record(lines: &[&str]) -> Result<FlatRecord, ScanError> {
    let mut record = FlatRecord::default();

    for line in lines {
        if let Some(rest) = line.strip_prefix("VERSION") {
            if let Some(token) = rest.split_whitespace().next() {
                record.accession = token.to_string();
                break;
            }
        }
    }
    if record.accession.is_empty() {
        for line in lines {
            let rest = line
                .strip_prefix("ACCESSION")
                .or_else(|| line.strip_prefix("LOCUS"));
            if let Some(rest) = rest {
                if let Some(token) = rest.split_whitespace().next() {
                    record.accession = token.to_string();
                    break;
                }
            }
        }
    }
    if record.accession.is_empty() {
        return Err(ScanError::FlatRecord(
            "record carries no accession".to_string(),
        ));
    }

    let Some(table_start) = lines.iter().position(|line| line.starts_with("FEATURES")) else {
        return Ok(record);
    };

    let mut current: Option<FlatFeature> = None;
    let mut in_location = false;

    for line in &lines[table_start + 1..] {
        if !line.starts_with(' ') {
            break;
        }
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        let indent = line.len() - trimmed.len();

        if indent < 21 && !trimmed.starts_with('/') {
            // New feature: key column, then the location expression.
            if let Some(feature) = current.take() {
                record.features.push(feature);
            }
            let mut parts = trimmed.splitn(2, char::is_whitespace);
            let key = parts.next().unwrap_or_default().to_string();
            let location = parts.next().unwrap_or_default().trim().to_string();
            current = Some(FlatFeature {
                key,
                location,
                qualifiers: Vec::new(),
            });
            in_location = true;
            continue;
        }

        let Some(feature) = current.as_mut() else {
            continue;
        };

        if let Some(rest) = trimmed.strip_prefix('/') {
            in_location = false;
            match rest.split_once('=') {
                Some((key, value)) => feature.qualifiers.push(Qualifier {
                    key: key.to_string(),
                    value: Some(value.trim_matches('"').to_string()),
                }),
                None => feature.qualifiers.push(Qualifier {
                    key: rest.to_string(),
                    value: None,
                }),
            }
        } else if in_location {
            feature.location.push_str(trimmed);
        } else if let Some(last) = feature.qualifiers.last_mut() {
            // Continuation of a multi-line qualifier value.
            let continued = trimmed.trim_matches('"');
            match &mut last.value {
                Some(value) => {
                    value.push(' ');
                    value.push_str(continued);
                }
                None => last.value = Some(continued.to_string()),
            }
        }
    }
    if let Some(feature) = current.take() {
        record.features.push(feature);
    }

    Ok(record)
}

/// Resolve a location expression to a half-open zero-based span.
/// `complement(..)` flips the strand; `join(..)`/`order(..)` collapse to
/// the outermost bounds; `<` and `>` partial markers are ignored.
pub fn parse_span(location: &str) -> Result<Span, ScanError> {
    let strand = if location.contains("complement(") {
        Strand::Reverse
    } else {
        Strand::Forward
    };

    let bounds = location_bounds(location);
    let min = bounds.iter().copied().min();
    let max = bounds.iter().copied().max();
    match (min, max) {
        (Some(min), Some(max)) => Ok(Span {
            start: min.saturating_sub(1),
            end: max,
            strand,
        }),
        _ => Err(ScanError::FlatRecord(format!(
            "no coordinates in location '{location}'"
        ))),
    }
}

/// Positional bounds of a location expression. Digit runs glued to an
/// accession token (`J00194.1:100..202`) are not coordinates and are
/// skipped.
fn location_bounds(location: &str) -> Vec<u64> {
    let expr = location.replace("..", " ");
    let bytes = expr.as_bytes();
    let mut bounds = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let attached = i > 0 && (bytes[i - 1].is_ascii_alphanumeric() || bytes[i - 1] == b'.');
            let mut j = i;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if !attached {
                if let Ok(value) = expr[i..j].parse::<u64>() {
                    bounds.push(value);
                }
            }
            i = j;
        } else {
            i += 1;
        }
    }
    bounds
}

/// Isolate a labelled top-level field: the line whose content (ignoring
/// leading whitespace) starts with `label`, plus every following indented
/// line, joined with single spaces. Collection stops at the first
/// non-indented line after the field starts.
pub fn field_block(text: &str, label: &str) -> Option<String> {
    let mut collected: Vec<&str> = Vec::new();
    let mut in_block = false;

    for line in text.lines() {
        if in_block {
            if line.starts_with(' ') || line.starts_with('\t') {
                collected.push(line.trim());
                continue;
            }
            break;
        }
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix(label) {
            collected.push(rest.trim());
            in_block = true;
        }
    }

    if !in_block {
        return None;
    }
    Some(collected.join(" ").trim().to_string())
}

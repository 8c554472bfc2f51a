use std::str::FromStr;

use regex::{Captures, Regex};

use crate::error::{DecodeError, RowError};

/// One match of a pattern, with typed access to its named groups.
pub struct PatternMatch<'t> {
    index: usize,
    captures: Captures<'t>,
}

impl<'t> PatternMatch<'t> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Byte offset of the whole match in the scanned text.
    pub fn start(&self) -> usize {
        self.captures.get(0).map_or(0, |m| m.start())
    }

    pub fn as_str(&self) -> &'t str {
        self.captures.get(0).map_or("", |m| m.as_str())
    }

    pub fn name(&self, group: &str) -> Result<&'t str, RowError> {
        self.captures
            .name(group)
            .map(|m| m.as_str())
            .ok_or_else(|| RowError::MissingField(group.to_owned()))
    }

    pub fn parse<N: FromStr>(&self, group: &str) -> Result<N, RowError> {
        let raw = self.name(group)?;
        raw.trim().parse().map_err(|_| RowError::InvalidNumber {
            field: group.to_owned(),
            value: raw.to_owned(),
        })
    }
}

pub fn compile_pattern(pattern: &str) -> Result<Regex, DecodeError> {
    Regex::new(pattern).map_err(|e| DecodeError::InvalidPattern(e.to_string()))
}

/// Maps every match of `pattern` in `text` through `mapper`, dropping the
/// matches it rejects.
pub fn decode_pattern<'t, T, F>(text: &'t str, pattern: &Regex, mut mapper: F) -> Vec<T>
where
    F: FnMut(&PatternMatch<'t>) -> Result<T, RowError>,
{
    pattern
        .captures_iter(text)
        .enumerate()
        .filter_map(|(index, captures)| {
            let found = PatternMatch { index, captures };
            match mapper(&found) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::debug!(match_index = index, error = %e, "Dropping match");
                    None
                }
            }
        })
        .collect()
}

/// Named group of the first match, if any.
pub fn first_capture<'t>(text: &'t str, pattern: &Regex, group: &str) -> Option<&'t str> {
    pattern
        .captures(text)
        .and_then(|captures| captures.name(group))
        .map(|m| m.as_str())
}

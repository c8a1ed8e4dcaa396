use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::database::models::SessionStatus;

use super::includes::Expansion;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid include(s): {}. Valid options: {}", invalid.join(", "), valid.join(", "))]
    InvalidInclude { invalid: Vec<String>, valid: Vec<String> },

    #[error("Invalid status value(s): {}. Valid options: {}", invalid.join(", "), valid.join(", "))]
    InvalidStatus { invalid: Vec<String>, valid: Vec<String> },

    #[error("Invalid day format: {0}. Expected YYYY-MM-DD")]
    InvalidDay(String),
}

/// Query string accepted by every read endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub include: Option<String>,
    pub status: Option<String>,
    pub day: Option<String>,
}

/// Comma-separated values, trimmed, empties dropped, first occurrence kept
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.unwrap_or_default().split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() || out.iter().any(|v| v == trimmed) {
            continue;
        }
        out.push(trimmed.to_string());
    }
    out
}

/// Validate requested includes against a per-resource whitelist
pub fn parse_includes(raw: Option<&str>, valid: &[&str]) -> Result<Vec<String>, QueryError> {
    let requested = split_list(raw);
    let invalid: Vec<String> = requested
        .iter()
        .filter(|name| !valid.contains(&name.as_str()))
        .cloned()
        .collect();

    if !invalid.is_empty() {
        return Err(QueryError::InvalidInclude {
            invalid,
            valid: valid.iter().map(|v| v.to_string()).collect(),
        });
    }
    Ok(requested)
}

/// Typed variant of [`parse_includes`] for a resource's include set
pub fn resolve_includes<E: Expansion>(raw: Option<&str>) -> Result<Vec<E>, QueryError> {
    Ok(parse_includes(raw, E::VALID)?
        .iter()
        .filter_map(|name| E::from_name(name))
        .collect())
}

/// Session lifecycle filter; absent or blank means publicly visible sessions
pub fn parse_status_filter(raw: Option<&str>) -> Result<Vec<SessionStatus>, QueryError> {
    let requested = split_list(raw);
    if requested.is_empty() {
        return Ok(SessionStatus::PUBLIC.to_vec());
    }

    let mut statuses = Vec::with_capacity(requested.len());
    let mut invalid = Vec::new();
    for value in requested {
        match value.parse::<SessionStatus>() {
            Ok(status) => statuses.push(status),
            Err(_) => invalid.push(value),
        }
    }

    if !invalid.is_empty() {
        return Err(QueryError::InvalidStatus {
            invalid,
            valid: SessionStatus::ALL.iter().map(|s| s.as_str().to_string()).collect(),
        });
    }
    Ok(statuses)
}

/// Strict `YYYY-MM-DD` that must also be a real calendar date
pub fn parse_day_filter(raw: Option<&str>) -> Result<Option<NaiveDate>, QueryError> {
    let Some(value) = raw else {
        return Ok(None);
    };

    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(QueryError::InvalidDay(value.to_string()));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| QueryError::InvalidDay(value.to_string()))
}

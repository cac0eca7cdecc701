use crate::domain::model::Entry;
use crate::utils::error::{CmsError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Age {
    Stale,
    Fresh,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub stale: Vec<Entry>,
    pub fresh: Vec<Entry>,
}

/// Parses the `--unpublishOlderThan` value. Forms without an offset are UTC.
pub fn parse_threshold(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(CmsError::InvalidConfigValueError {
        field: "unpublishOlderThan".to_string(),
        value: raw.to_string(),
        reason: "Expected YYYY-MM-DD, YYYY-MM-DD HH:MM:SS or an RFC 3339 timestamp".to_string(),
    })
}

pub fn parse_created_at(entry: &Entry) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(entry.created_at.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|_| CmsError::MalformedTimestampError {
            entry_uid: entry.uid.clone(),
            value: entry.created_at.clone(),
        })
}

/// Stale iff `created_at < threshold`; an entry created exactly at the
/// threshold is fresh.
pub fn classify_entry(entry: &Entry, threshold: DateTime<Utc>) -> Result<Age> {
    let created_at = parse_created_at(entry)?;
    Ok(if created_at < threshold {
        Age::Stale
    } else {
        Age::Fresh
    })
}

pub fn classify(entries: Vec<Entry>, threshold: DateTime<Utc>) -> Result<Classification> {
    let mut classification = Classification::default();

    for entry in entries {
        match classify_entry(&entry, threshold)? {
            Age::Stale => classification.stale.push(entry),
            Age::Fresh => classification.fresh.push(entry),
        }
    }

    Ok(classification)
}

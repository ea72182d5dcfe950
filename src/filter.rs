use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::dataset::Dataset;
use crate::models::CallRecord;

/// A field value as the UI sends it. Anything that is not a number or text
/// lands in `Other` and is treated as unusable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawValue {
    /// Integer value. Floats truncate; text must be a trimmed integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            RawValue::Int(value) => Some(*value),
            RawValue::Float(value) => float_to_int(*value),
            RawValue::Text(text) => text.trim().parse::<i64>().ok(),
            RawValue::Other(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Int(value)
    }
}

fn float_to_int(value: f64) -> Option<i64> {
    (value.is_finite() && value.abs() < i64::MAX as f64).then(|| value.trunc() as i64)
}

/// Null, a single name or a list; non-text entries keep their JSON spelling.
fn lenient_destinations<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let name = |value: serde_json::Value| match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(name) => Some(name),
        other => Some(other.to_string()),
    };

    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(values) => values.into_iter().filter_map(name).collect(),
        value => name(value).into_iter().collect(),
    })
}

/// Unvalidated filter inputs, exactly as received from the UI or the command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFilterInput {
    pub start_date: Option<RawValue>,
    pub start_hour: Option<RawValue>,
    pub start_minute: Option<RawValue>,
    pub end_date: Option<RawValue>,
    pub end_hour: Option<RawValue>,
    pub end_minute: Option<RawValue>,
    #[serde(deserialize_with = "lenient_destinations")]
    pub destinations: Vec<String>,
}

impl RawFilterInput {
    /// The inputs the dashboard starts with: the whole range, every destination.
    pub fn defaults_for(dataset: &Dataset) -> Self {
        Self {
            start_date: Some(RawValue::Text(dataset.min_timestamp().date().to_string())),
            start_hour: Some(RawValue::Int(0)),
            start_minute: Some(RawValue::Int(0)),
            end_date: Some(RawValue::Text(dataset.max_timestamp().date().to_string())),
            end_hour: Some(RawValue::Int(23)),
            end_minute: Some(RawValue::Int(59)),
            destinations: dataset.destinations().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Empty means every destination passes.
    pub destinations: Vec<String>,
}

/// The records matching a [`FilterCriteria`], in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    records: Vec<&'a CallRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn new(records: Vec<&'a CallRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[&'a CallRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn clamp_field(raw: Option<&RawValue>, max: i64, default: u32, field: &str) -> u32 {
    match raw.and_then(RawValue::as_int) {
        Some(value) if (0..=max).contains(&value) => value as u32,
        _ => {
            debug!(field, value = ?raw, default, "filter input out of range, using default");
            default
        }
    }
}

fn combine(date: Option<&RawValue>, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date?.as_text()?.trim(), "%Y-%m-%d").ok()?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    Some(date.and_time(time))
}

/// Turns raw inputs into criteria. Never fails: bad hours and minutes fall back
/// to the edges of the day, bad dates to the edges of the dataset.
pub fn criteria(raw: &RawFilterInput, dataset: &Dataset) -> FilterCriteria {
    let start_hour = clamp_field(raw.start_hour.as_ref(), 23, 0, "start_hour");
    let start_minute = clamp_field(raw.start_minute.as_ref(), 59, 0, "start_minute");
    let end_hour = clamp_field(raw.end_hour.as_ref(), 23, 23, "end_hour");
    let end_minute = clamp_field(raw.end_minute.as_ref(), 59, 59, "end_minute");

    let start = combine(raw.start_date.as_ref(), start_hour, start_minute).unwrap_or_else(|| {
        debug!(value = ?raw.start_date, "start date unusable, using earliest record");
        dataset.min_timestamp()
    });
    let end = combine(raw.end_date.as_ref(), end_hour, end_minute).unwrap_or_else(|| {
        debug!(value = ?raw.end_date, "end date unusable, using latest record");
        dataset.max_timestamp()
    });

    FilterCriteria {
        start,
        end,
        destinations: raw.destinations.clone(),
    }
}

/// Selects the records inside `[start, end]` whose destination is selected.
/// An inverted range selects nothing.
pub fn apply<'a>(criteria: &FilterCriteria, dataset: &'a Dataset) -> FilteredView<'a> {
    let selected: HashSet<&str> = criteria.destinations.iter().map(String::as_str).collect();
    let records = dataset
        .records()
        .iter()
        .filter(|record| record.timestamp >= criteria.start && record.timestamp <= criteria.end)
        .filter(|record| selected.is_empty() || selected.contains(record.destination.as_str()))
        .collect();

    FilteredView::new(records)
}

pub fn evaluate<'a>(raw: &RawFilterInput, dataset: &'a Dataset) -> FilteredView<'a> {
    let criteria = criteria(raw, dataset);
    let view = apply(&criteria, dataset);
    debug!(
        start = %criteria.start,
        end = %criteria.end,
        destinations = criteria.destinations.len(),
        matched = view.len(),
        "filter evaluated"
    );
    view
}

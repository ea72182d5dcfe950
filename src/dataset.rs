use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, bail, Context};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use crate::models::{self, Bucket, CallRecord, DayType};

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// The call log as loaded at startup. Never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<CallRecord>,
    destinations: Vec<String>,
    min_timestamp: NaiveDateTime,
    max_timestamp: NaiveDateTime,
}

impl Dataset {
    pub fn from_records(records: Vec<CallRecord>) -> anyhow::Result<Self> {
        let min_timestamp = records
            .iter()
            .map(|record| record.timestamp)
            .min()
            .context("call log contains no records")?;
        let max_timestamp = records
            .iter()
            .map(|record| record.timestamp)
            .max()
            .context("call log contains no records")?;
        let destinations: BTreeSet<&str> = records
            .iter()
            .map(|record| record.destination.as_str())
            .collect();
        let destinations = destinations.into_iter().map(str::to_string).collect();

        Ok(Self {
            records,
            destinations,
            min_timestamp,
            max_timestamp,
        })
    }

    pub fn records(&self) -> &[CallRecord] {
        &self.records
    }

    /// Distinct destination names, sorted.
    pub fn destinations(&self) -> &[String] {
        &self.destinations
    }

    pub fn min_timestamp(&self) -> NaiveDateTime {
        self.min_timestamp
    }

    pub fn max_timestamp(&self) -> NaiveDateTime {
        self.max_timestamp
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

pub fn load(path: &Path, delimiter: u8) -> anyhow::Result<Dataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open call log {}", path.display()))?;
    let dataset = load_from_reader(file, delimiter)
        .with_context(|| format!("failed to load call log {}", path.display()))?;

    info!(
        path = %path.display(),
        records = dataset.len(),
        destinations = dataset.destinations().len(),
        from = %dataset.min_timestamp(),
        to = %dataset.max_timestamp(),
        "call log loaded"
    );
    Ok(dataset)
}

#[derive(serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Data")]
    timestamp: String,
    #[serde(rename = "destino_nome")]
    destination: String,
    #[serde(rename = "atendida")]
    answered: String,
    #[serde(rename = "duracao_segundos")]
    duration_secs: f64,
    #[serde(rename = "data")]
    date: String,
    #[serde(rename = "dia_semana")]
    weekday: String,
    #[serde(rename = "hora")]
    hour: u32,
    #[serde(rename = "faixa_horaria")]
    bucket: String,
    #[serde(rename = "tipo_dia")]
    day_type: String,
}

impl CsvRow {
    fn into_record(self) -> anyhow::Result<CallRecord> {
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            bail!("duracao_segundos must be a non-negative number");
        }
        if self.hour > 23 {
            bail!("hora {} is outside 0-23", self.hour);
        }

        Ok(CallRecord {
            timestamp: parse_timestamp(&self.timestamp)?,
            answered: parse_flag(&self.answered)?,
            duration_secs: self.duration_secs,
            date: NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
                .with_context(|| format!("invalid data {:?}", self.date))?,
            weekday: models::parse_weekday(&self.weekday)
                .ok_or_else(|| anyhow!("unknown dia_semana {:?}", self.weekday))?,
            hour: self.hour,
            bucket: Bucket::parse(&self.bucket)
                .ok_or_else(|| anyhow!("unknown faixa_horaria {:?}", self.bucket))?,
            day_type: DayType::parse(&self.day_type)
                .ok_or_else(|| anyhow!("unknown tipo_dia {:?}", self.day_type))?,
            destination: self.destination,
        })
    }
}

pub fn load_from_reader<R: Read>(input: R, delimiter: u8) -> anyhow::Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(input);
    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for result in reader.records() {
        let raw = result?;
        let line = raw.position().map(|position| position.line()).unwrap_or_default();
        let record = raw
            .deserialize::<CsvRow>(Some(&headers))
            .map_err(anyhow::Error::from)
            .and_then(CsvRow::into_record)
            .with_context(|| format!("invalid record on line {line}"))?;
        records.push(record);
    }

    Dataset::from_records(records)
}

fn parse_timestamp(value: &str) -> anyhow::Result<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| anyhow!("invalid Data timestamp {value:?}"))
}

fn parse_flag(value: &str) -> anyhow::Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" => Ok(true),
        "0" | "0.0" | "false" => Ok(false),
        _ => bail!("invalid atendida flag {value:?}"),
    }
}

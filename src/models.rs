use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;

pub const BUCKET_LABELS: [&str; 12] = [
    "00–02h", "02–04h", "04–06h", "06–08h", "08–10h", "10–12h", "12–14h", "14–16h", "16–18h",
    "18–20h", "20–22h", "22–24h",
];

/// Weekdays in heatmap row order, paired with the names used in the call log.
pub const WEEKDAYS: [(Weekday, &str); 7] = [
    (Weekday::Mon, "Segunda-feira"),
    (Weekday::Tue, "Terça-feira"),
    (Weekday::Wed, "Quarta-feira"),
    (Weekday::Thu, "Quinta-feira"),
    (Weekday::Fri, "Sexta-feira"),
    (Weekday::Sat, "Sábado"),
    (Weekday::Sun, "Domingo"),
];

pub fn parse_weekday(label: &str) -> Option<Weekday> {
    let label = label.trim();
    WEEKDAYS
        .iter()
        .find(|(_, name)| name.eq_ignore_ascii_case(label))
        .map(|(weekday, _)| *weekday)
}

/// One of the twelve two-hour intervals of the day, `0` being midnight to 2am.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bucket(u8);

impl Bucket {
    pub fn from_index(index: usize) -> Option<Self> {
        (index < BUCKET_LABELS.len()).then(|| Bucket(index as u8))
    }

    pub fn from_hour(hour: u32) -> Option<Self> {
        Self::from_index((hour / 2) as usize).filter(|_| hour < 24)
    }

    /// Accepts `08–10h` as written by the export, and the ASCII `08-10h`.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        let body = label.strip_suffix('h')?;
        let (start, end) = body.split_once('–').or_else(|| body.split_once('-'))?;
        let start: u32 = start.trim().parse().ok()?;
        let end: u32 = end.trim().parse().ok()?;
        if start % 2 != 0 || end != start + 2 {
            return None;
        }
        Self::from_hour(start)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    BusinessDay,
    Weekend,
}

impl DayType {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "Dia útil" => Some(DayType::BusinessDay),
            "Final de semana" => Some(DayType::Weekend),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayType::BusinessDay => "Dia útil",
            DayType::Weekend => "Final de semana",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallRecord {
    pub timestamp: NaiveDateTime,
    pub destination: String,
    pub answered: bool,
    pub duration_secs: f64,
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub hour: u32,
    pub bucket: Bucket,
    pub day_type: DayType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicators {
    pub total: usize,
    pub answered: usize,
    pub unanswered: usize,
    pub answer_rate: f64,
    pub mean_duration_secs: f64,
    pub mean_daily_talk_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCount {
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapRow {
    pub weekday: &'static str,
    pub hours: [usize; 24],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTypeCount {
    pub day_type: DayType,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub daily: Vec<DailyCount>,
    pub buckets: Vec<BucketCount>,
    pub heatmap: Vec<HeatmapRow>,
    pub day_types: Vec<DayTypeCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_labels_parse_in_both_dash_styles() {
        assert_eq!(Bucket::parse("08–10h"), Bucket::from_index(4));
        assert_eq!(Bucket::parse("22-24h"), Bucket::from_index(11));
        assert_eq!(Bucket::parse("01–03h"), None);
        assert_eq!(Bucket::parse("08–12h"), None);
        assert_eq!(Bucket::parse("24–26h"), None);
    }

    #[test]
    fn bucket_from_hour_covers_the_day() {
        assert_eq!(Bucket::from_hour(0).map(Bucket::index), Some(0));
        assert_eq!(Bucket::from_hour(23).map(Bucket::index), Some(11));
        assert_eq!(Bucket::from_hour(24), None);
    }

    #[test]
    fn weekday_names_parse_in_row_order() {
        for (row, (weekday, name)) in WEEKDAYS.into_iter().enumerate() {
            assert_eq!(parse_weekday(name), Some(weekday));
            assert_eq!(weekday.num_days_from_monday() as usize, row);
        }
        assert_eq!(parse_weekday("Funday"), None);
    }

    #[test]
    fn day_type_labels() {
        assert_eq!(DayType::parse("Dia útil"), Some(DayType::BusinessDay));
        assert_eq!(DayType::parse(" Final de semana "), Some(DayType::Weekend));
        assert_eq!(DayType::parse("Feriado"), None);
    }
}

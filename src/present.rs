use serde::Serialize;

use crate::aggregate;
use crate::dataset::Dataset;
use crate::filter::{self, RawFilterInput};
use crate::models::{BucketCount, DailyCount, HeatmapRow, Indicators, Series};

pub const ANSWER_RATE_ALERT_BELOW: f64 = 85.0;
pub const MEAN_DURATION_WARNING_ABOVE: f64 = 300.0;
pub const EMPTY_CHART_MESSAGE: &str = "no data to display";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Normal,
    Alert,
    Warning,
}

impl Style {
    pub fn color(self) -> &'static str {
        match self {
            Style::Normal => "#162447",
            Style::Alert => "red",
            Style::Warning => "orange",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: &'static str,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    Line {
        title: &'static str,
        points: Vec<DailyCount>,
    },
    Bar {
        title: &'static str,
        bars: Vec<BucketCount>,
    },
    Heatmap {
        title: &'static str,
        rows: Vec<HeatmapRow>,
    },
    Pie {
        title: &'static str,
        slices: Vec<PieSlice>,
    },
    Empty {
        title: &'static str,
        message: &'static str,
    },
}

impl Chart {
    fn empty(title: &'static str) -> Self {
        Chart::Empty {
            title,
            message: EMPTY_CHART_MESSAGE,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Chart::Line { title, .. }
            | Chart::Bar { title, .. }
            | Chart::Heatmap { title, .. }
            | Chart::Pie { title, .. }
            | Chart::Empty { title, .. } => *title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    pub daily: Chart,
    pub buckets: Chart,
    pub heatmap: Chart,
    pub day_types: Chart,
}

/// Everything the dashboard shows for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayBundle {
    pub total: String,
    pub answered: String,
    pub unanswered: String,
    pub answer_rate: String,
    pub answer_rate_style: Style,
    pub mean_duration: String,
    pub mean_duration_style: Style,
    pub mean_daily_talk: String,
    pub charts: Charts,
    pub values: Indicators,
}

/// Human readable duration, most significant unit first, zero parts dropped.
/// Fractional seconds are truncated.
pub fn format_duration(seconds: f64) -> String {
    // `as` saturates: NaN and negatives become 0.
    let seconds = seconds as u64;
    if seconds < 60 {
        return format!("{seconds}s");
    }

    let (hours, minutes, secs) = (seconds / 3600, seconds % 3600 / 60, seconds % 60);
    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}min"));
    }
    if secs > 0 {
        parts.push(format!("{secs}s"));
    }
    parts.join(" ")
}

/// `1234567` as `1,234,567`.
pub fn format_count(count: usize) -> String {
    let digits = count.to_string();
    let mut output = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            output.push(',');
        }
        output.push(digit);
    }
    output
}

pub fn answer_rate_style(answer_rate: f64) -> Style {
    if answer_rate < ANSWER_RATE_ALERT_BELOW {
        Style::Alert
    } else {
        Style::Normal
    }
}

pub fn mean_duration_style(mean_duration_secs: f64) -> Style {
    if mean_duration_secs > MEAN_DURATION_WARNING_ABOVE {
        Style::Warning
    } else {
        Style::Normal
    }
}

fn charts(series: Series) -> Charts {
    let daily_total: usize = series.daily.iter().map(|day| day.count).sum();
    let bucket_total: usize = series.buckets.iter().map(|bucket| bucket.count).sum();
    let heatmap_total: usize = series.heatmap.iter().flat_map(|row| row.hours).sum();
    let day_type_total: usize = series.day_types.iter().map(|slice| slice.count).sum();

    let daily = match daily_total {
        0 => Chart::empty("Calls per day"),
        _ => Chart::Line {
            title: "Calls per day",
            points: series.daily,
        },
    };
    let buckets = match bucket_total {
        0 => Chart::empty("Calls per time bucket"),
        _ => Chart::Bar {
            title: "Calls per time bucket",
            bars: series.buckets,
        },
    };
    let heatmap = match heatmap_total {
        0 => Chart::empty("Hour x weekday heatmap"),
        _ => Chart::Heatmap {
            title: "Hour x weekday heatmap",
            rows: series.heatmap,
        },
    };
    let day_types = match day_type_total {
        0 => Chart::empty("Business days vs weekends"),
        total => Chart::Pie {
            title: "Business days vs weekends",
            slices: series
                .day_types
                .into_iter()
                .map(|slice| PieSlice {
                    label: slice.label,
                    count: slice.count,
                    percent: slice.count as f64 / total as f64 * 100.0,
                })
                .collect(),
        },
    };

    Charts {
        daily,
        buckets,
        heatmap,
        day_types,
    }
}

pub fn present(indicators: &Indicators, series: Series) -> DisplayBundle {
    DisplayBundle {
        total: format_count(indicators.total),
        answered: format_count(indicators.answered),
        unanswered: format_count(indicators.unanswered),
        answer_rate: format!("{:.1}%", indicators.answer_rate),
        answer_rate_style: answer_rate_style(indicators.answer_rate),
        mean_duration: format_duration(indicators.mean_duration_secs),
        mean_duration_style: mean_duration_style(indicators.mean_duration_secs),
        mean_daily_talk: format_duration(indicators.mean_daily_talk_secs),
        charts: charts(series),
        values: indicators.clone(),
    }
}

/// Filter, aggregate and present in one pass.
pub fn dashboard(raw: &RawFilterInput, dataset: &Dataset) -> DisplayBundle {
    let view = filter::evaluate(raw, dataset);
    let (indicators, series) = aggregate::aggregate(&view);
    present(&indicators, series)
}

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::filter::FilteredView;
use crate::models::{
    BucketCount, DailyCount, DayType, DayTypeCount, HeatmapRow, Indicators, Series,
    BUCKET_LABELS, WEEKDAYS,
};

pub fn indicators(view: &FilteredView<'_>) -> Indicators {
    let total = view.len();
    let mut answered = 0usize;
    let mut answered_secs = 0.0;
    let mut talk_per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for record in view.records().iter().filter(|record| record.answered) {
        answered += 1;
        answered_secs += record.duration_secs;
        *talk_per_day.entry(record.date).or_insert(0.0) += record.duration_secs;
    }

    Indicators {
        total,
        answered,
        unanswered: total - answered,
        answer_rate: if view.is_empty() {
            0.0
        } else {
            answered as f64 / total as f64 * 100.0
        },
        mean_duration_secs: if answered == 0 {
            0.0
        } else {
            answered_secs / answered as f64
        },
        mean_daily_talk_secs: if talk_per_day.is_empty() {
            0.0
        } else {
            talk_per_day.values().sum::<f64>() / talk_per_day.len() as f64
        },
    }
}

/// Groups the view four ways. Buckets and weekdays always carry their full
/// label set so chart axes stay put; days and day-types only list what is present.
pub fn series(view: &FilteredView<'_>) -> Series {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    let mut per_bucket = [0usize; BUCKET_LABELS.len()];
    let mut per_weekday_hour = [[0usize; 24]; WEEKDAYS.len()];
    let mut per_day_type: BTreeMap<DayType, usize> = BTreeMap::new();

    for record in view.records() {
        *per_day.entry(record.date).or_insert(0) += 1;
        per_bucket[record.bucket.index()] += 1;
        per_weekday_hour[record.weekday.num_days_from_monday() as usize][record.hour as usize] += 1;
        *per_day_type.entry(record.day_type).or_insert(0) += 1;
    }

    Series {
        daily: per_day
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect(),
        buckets: BUCKET_LABELS
            .into_iter()
            .zip(per_bucket)
            .map(|(label, count)| BucketCount { label, count })
            .collect(),
        heatmap: WEEKDAYS
            .into_iter()
            .zip(per_weekday_hour)
            .map(|((_, weekday), hours)| HeatmapRow { weekday, hours })
            .collect(),
        day_types: per_day_type
            .into_iter()
            .map(|(day_type, count)| DayTypeCount {
                day_type,
                label: day_type.label(),
                count,
            })
            .collect(),
    }
}

pub fn aggregate(view: &FilteredView<'_>) -> (Indicators, Series) {
    (indicators(view), series(view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::{dataset_from_rows, sample_dataset};
    use crate::filter::{self, RawFilterInput};

    fn whole(dataset: &crate::dataset::Dataset) -> FilteredView<'_> {
        filter::evaluate(&RawFilterInput::default(), dataset)
    }

    #[test]
    fn two_answered_one_missed_on_one_day() {
        let dataset = dataset_from_rows(&[
            "2025-03-04 10:00:00;Recepção;1;100;2025-03-04;Terça-feira;10;10–12h;Dia útil",
            "2025-03-04 11:00:00;Recepção;1;300;2025-03-04;Terça-feira;11;10–12h;Dia útil",
            "2025-03-04 12:00:00;Recepção;0;0;2025-03-04;Terça-feira;12;12–14h;Dia útil",
        ]);
        let indicators = indicators(&whole(&dataset));
        assert_eq!(indicators.total, 3);
        assert_eq!(indicators.answered, 2);
        assert_eq!(indicators.unanswered, 1);
        assert!((indicators.answer_rate - 66.666).abs() < 0.01);
        assert_eq!(indicators.mean_duration_secs, 200.0);
        assert_eq!(indicators.mean_daily_talk_secs, 400.0);
    }

    #[test]
    fn daily_talk_time_averages_per_day_totals() {
        let dataset = sample_dataset();
        let indicators = indicators(&whole(&dataset));
        // 400s on the 3rd and 45s on the 8th; the 9th has no answered call.
        assert_eq!(indicators.mean_daily_talk_secs, 222.5);
        assert!((indicators.mean_duration_secs - 445.0 / 3.0).abs() < 1e-9);
        assert!((indicators.answer_rate - 60.0).abs() < 1e-9);
    }

    #[test]
    fn empty_view_yields_zeroes() {
        let view = FilteredView::new(Vec::new());
        let (indicators, series) = aggregate(&view);
        assert_eq!(
            indicators,
            Indicators {
                total: 0,
                answered: 0,
                unanswered: 0,
                answer_rate: 0.0,
                mean_duration_secs: 0.0,
                mean_daily_talk_secs: 0.0,
            }
        );
        assert!(series.daily.is_empty());
        assert!(series.day_types.is_empty());
        assert_eq!(series.buckets.len(), 12);
        assert_eq!(series.heatmap.len(), 7);
    }

    #[test]
    fn fixed_universes_are_complete_and_sum_to_view() {
        let dataset = sample_dataset();
        let view = whole(&dataset);
        let series = series(&view);

        let labels: Vec<_> = series.buckets.iter().map(|bucket| bucket.label).collect();
        assert_eq!(labels, BUCKET_LABELS);
        assert_eq!(
            series.buckets.iter().map(|bucket| bucket.count).sum::<usize>(),
            view.len()
        );
        assert_eq!(series.buckets[4].count, 2);
        assert_eq!(series.buckets[0].count, 0);

        let weekdays: Vec<_> = series.heatmap.iter().map(|row| row.weekday).collect();
        assert_eq!(weekdays, WEEKDAYS.map(|(_, name)| name));
        assert_eq!(
            series
                .heatmap
                .iter()
                .flat_map(|row| row.hours)
                .sum::<usize>(),
            view.len()
        );
        assert_eq!(series.heatmap[0].hours[8], 1);
        assert_eq!(series.heatmap[5].hours[22], 1);
        assert_eq!(series.heatmap[6].hours[3], 1);
    }

    #[test]
    fn daily_and_day_type_series_list_present_groups() {
        let dataset = sample_dataset();
        let series = series(&whole(&dataset));
        let days: Vec<_> = series
            .daily
            .iter()
            .map(|day| (day.date.to_string(), day.count))
            .collect();
        assert_eq!(
            days,
            vec![
                ("2025-03-03".to_string(), 3),
                ("2025-03-08".to_string(), 1),
                ("2025-03-09".to_string(), 1),
            ]
        );
        assert_eq!(series.day_types.len(), 2);
        assert_eq!(series.day_types[0].day_type, DayType::BusinessDay);
        assert_eq!(series.day_types[0].count, 3);

        let weekdays_only = dataset_from_rows(&[
            "2025-03-04 10:00:00;Recepção;1;100;2025-03-04;Terça-feira;10;10–12h;Dia útil",
        ]);
        let series = super::series(&whole(&weekdays_only));
        assert_eq!(series.day_types.len(), 1);
    }
}

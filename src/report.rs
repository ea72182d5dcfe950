use std::fmt::Write;

use crate::filter::FilterCriteria;
use crate::present::{Chart, DisplayBundle, Style};

fn style_marker(style: Style) -> &'static str {
    match style {
        Style::Normal => "",
        Style::Alert => " (alert)",
        Style::Warning => " (warning)",
    }
}

fn write_chart(output: &mut String, chart: &Chart) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## {}", chart.title());

    match chart {
        Chart::Empty { message, .. } => {
            let _ = writeln!(output, "_{message}_");
        }
        Chart::Line { points, .. } => {
            let _ = writeln!(output, "| Day | Calls |");
            let _ = writeln!(output, "|-----|------:|");
            for point in points {
                let _ = writeln!(output, "| {} | {} |", point.date, point.count);
            }
        }
        Chart::Bar { bars, .. } => {
            let _ = writeln!(output, "| Bucket | Calls |");
            let _ = writeln!(output, "|--------|------:|");
            for bar in bars {
                let _ = writeln!(output, "| {} | {} |", bar.label, bar.count);
            }
        }
        Chart::Heatmap { rows, .. } => {
            let hours: Vec<String> = (0..24).map(|hour| format!("{hour:02}")).collect();
            let _ = writeln!(output, "| Weekday | {} |", hours.join(" | "));
            let _ = writeln!(output, "|---------|{}", "---:|".repeat(24));
            for row in rows {
                let cells: Vec<String> = row.hours.iter().map(usize::to_string).collect();
                let _ = writeln!(output, "| {} | {} |", row.weekday, cells.join(" | "));
            }
        }
        Chart::Pie { slices, .. } => {
            for slice in slices {
                let _ = writeln!(
                    output,
                    "- {}: {} calls ({:.1}%)",
                    slice.label, slice.count, slice.percent
                );
            }
        }
    }
}

pub fn build_report(criteria: &FilterCriteria, bundle: &DisplayBundle) -> String {
    let mut output = String::new();
    let destinations = if criteria.destinations.is_empty() {
        "all destinations".to_string()
    } else {
        criteria.destinations.join(", ")
    };

    let _ = writeln!(output, "# Call Log Report");
    let _ = writeln!(
        output,
        "Calls from {} to {} for {}",
        criteria.start.format("%Y-%m-%d %H:%M"),
        criteria.end.format("%Y-%m-%d %H:%M"),
        destinations
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Indicators");
    let _ = writeln!(output, "| Indicator | Value |");
    let _ = writeln!(output, "|-----------|------:|");
    let _ = writeln!(output, "| Total calls | {} |", bundle.total);
    let _ = writeln!(output, "| Answered | {} |", bundle.answered);
    let _ = writeln!(output, "| Unanswered | {} |", bundle.unanswered);
    let _ = writeln!(
        output,
        "| Answer rate | {}{} |",
        bundle.answer_rate,
        style_marker(bundle.answer_rate_style)
    );
    let _ = writeln!(
        output,
        "| Mean duration (answered) | {}{} |",
        bundle.mean_duration,
        style_marker(bundle.mean_duration_style)
    );
    let _ = writeln!(output, "| Talk time per day | {} |", bundle.mean_daily_talk);

    for chart in [
        &bundle.charts.daily,
        &bundle.charts.buckets,
        &bundle.charts.heatmap,
        &bundle.charts.day_types,
    ] {
        write_chart(&mut output, chart);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::sample_dataset;
    use crate::filter::{self, RawFilterInput};
    use crate::present;

    #[test]
    fn report_lists_indicators_and_charts() {
        let dataset = sample_dataset();
        let raw = RawFilterInput::defaults_for(&dataset);
        let criteria = filter::criteria(&raw, &dataset);
        let report = build_report(&criteria, &present::dashboard(&raw, &dataset));

        assert!(report.contains("Calls from 2025-03-03 00:00 to 2025-03-09 23:59"));
        assert!(report.contains("Almoxarifado, Comando, Recepção"));
        assert!(report.contains("| Total calls | 5 |"));
        assert!(report.contains("| Answer rate | 60.0% (alert) |"));
        assert!(report.contains("| 2025-03-03 | 3 |"));
        assert!(report.contains("| 08–10h | 2 |"));
        assert!(report.contains("- Dia útil: 3 calls (60.0%)"));
    }

    #[test]
    fn empty_selection_prints_placeholders() {
        let dataset = sample_dataset();
        let raw = RawFilterInput {
            destinations: vec!["Ouvidoria".to_string()],
            ..RawFilterInput::default()
        };
        let criteria = filter::criteria(&raw, &dataset);
        let report = build_report(&criteria, &present::dashboard(&raw, &dataset));

        assert!(report.contains("for Ouvidoria"));
        assert_eq!(report.matches("_no data to display_").count(), 4);
    }
}

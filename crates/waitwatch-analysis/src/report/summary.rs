//! The markdown summary report.

use chrono::NaiveDateTime;

use waitwatch_core::calendar::WEEKDAY_NAMES;
use waitwatch_core::datefmt::{DATE_FORMAT, TIMESTAMP_FORMAT};

use super::aggregate;
use crate::merged::MergedRow;
use crate::preprocess::{summary_stats, SummaryStats};

/// How many hours and weekdays the summary recommends.
const BEST_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    pub stats: SummaryStats,
    /// `(hour, mean wait)`, lowest first.
    pub best_hours: Vec<(u32, f64)>,
    /// `(weekday, mean wait)` with Monday = 0, lowest first.
    pub best_weekdays: Vec<(u32, f64)>,
}

/// `None` for an empty table.
#[must_use]
pub fn build_summary(rows: &[MergedRow]) -> Option<AnalysisSummary> {
    Some(AnalysisSummary {
        stats: summary_stats(rows)?,
        best_hours: aggregate::best_hours(rows, BEST_COUNT),
        best_weekdays: aggregate::best_weekdays(rows, BEST_COUNT),
    })
}

#[must_use]
pub fn render_markdown(summary: &AnalysisSummary, generated_at: NaiveDateTime) -> String {
    let stats = &summary.stats;
    let mut lines = vec![
        "# Barber Shop Analysis Report".to_string(),
        format!("Generated: {}", generated_at.format(TIMESTAMP_FORMAT)),
        String::new(),
        "## Summary Statistics".to_string(),
        format!("- Total Records: {}", group_thousands(stats.total_records)),
        format!(
            "- Date Range: {} to {}",
            stats.first_date.format(DATE_FORMAT),
            stats.last_date.format(DATE_FORMAT)
        ),
        format!("- Number of Stores: {}", stats.stores),
        format!("- Average Wait Time: {} people", fixed(stats.mean_wait, 1)),
        format!("- Maximum Wait Time: {} people", fixed(stats.max_wait, 0)),
        format!("- Minimum Wait Time: {} people", fixed(stats.min_wait, 0)),
        String::new(),
        "## Best Times to Visit".to_string(),
        "### Best Hours (lowest wait times):".to_string(),
    ];
    lines.extend(
        summary
            .best_hours
            .iter()
            .map(|(hour, mean)| format!("- {hour:02}:00 - Average wait: {mean:.1} people")),
    );
    lines.push(String::new());
    lines.push("### Best Days (lowest wait times):".to_string());
    lines.extend(summary.best_weekdays.iter().map(|(weekday, mean)| {
        let name = WEEKDAY_NAMES.get(*weekday as usize).copied().unwrap_or("?");
        format!("- {name} - Average wait: {mean:.1} people")
    }));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn fixed(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.precision$}"))
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::report::fixtures::row;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    #[test]
    fn group_thousands_inserts_commas() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn empty_table_has_no_summary() {
        assert_eq!(build_summary(&[]), None);
    }

    #[test]
    fn markdown_lists_stats_and_best_times() {
        // 2024-01-01 Monday, 2024-01-02 Tuesday.
        let rows = vec![
            row("a", 1, 9, Some(6.0)),
            row("a", 1, 12, Some(2.0)),
            row("b", 2, 9, Some(4.0)),
            row("b", 2, 15, Some(2.0)),
            row("b", 2, 18, None),
        ];
        let summary = build_summary(&rows).unwrap();
        let markdown = render_markdown(&summary, generated_at());

        assert!(markdown.starts_with(
            "# Barber Shop Analysis Report\nGenerated: 2024-02-01 08:30:00\n"
        ));
        assert!(markdown.contains("- Total Records: 5\n"));
        assert!(markdown.contains("- Date Range: 2024-01-01 to 2024-01-02\n"));
        assert!(markdown.contains("- Number of Stores: 2\n"));
        assert!(markdown.contains("- Average Wait Time: 3.5 people\n"));
        assert!(markdown.contains("- Maximum Wait Time: 6 people\n"));
        assert!(markdown.contains("- Minimum Wait Time: 2 people\n"));
        assert!(markdown.contains(
            "### Best Hours (lowest wait times):\n\
             - 12:00 - Average wait: 2.0 people\n\
             - 15:00 - Average wait: 2.0 people\n\
             - 09:00 - Average wait: 5.0 people\n"
        ));
        assert!(markdown.contains(
            "### Best Days (lowest wait times):\n\
             - Tuesday - Average wait: 3.0 people\n\
             - Monday - Average wait: 4.0 people\n"
        ));
    }

    #[test]
    fn all_null_waits_render_as_not_available() {
        let rows = vec![row("a", 1, 9, None)];
        let markdown = render_markdown(&build_summary(&rows).unwrap(), generated_at());

        assert!(markdown.contains("- Average Wait Time: n/a people\n"));
        assert!(markdown.contains("### Best Hours (lowest wait times):\n\n"));
    }

    #[test]
    fn markdown_sections_are_separated_by_single_blank_lines() {
        let rows = vec![row("a", 1, 9, Some(3.0))];
        let markdown = render_markdown(&build_summary(&rows).unwrap(), generated_at());

        assert!(markdown.contains("Generated: 2024-02-01 08:30:00\n\n## Summary Statistics\n"));
        assert!(markdown.contains("- Minimum Wait Time: 3 people\n\n## Best Times to Visit\n"));
        assert!(markdown.contains("- 09:00 - Average wait: 3.0 people\n\n### Best Days"));
        assert!(markdown.ends_with("- Monday - Average wait: 3.0 people\n"));
        assert!(!markdown.ends_with("\n\n"));
    }
}

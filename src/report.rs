use std::collections::HashMap;
use std::fmt::Write;

use chrono::NaiveDate;

use crate::metrics::{dominance_index, gini_index, mean};
use crate::models::LogEntry;

pub trait Reportable {
    fn display_name(&self) -> &str;
    fn status_label(&self) -> String;
    /// The number the board ranks this screen by.
    fn headline(&self) -> f64;
    fn headline_label() -> &'static str;
    fn log(&self) -> &[LogEntry];
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusSummary {
    pub status: String,
    pub count: usize,
    pub avg_headline: f64,
}

pub fn summarize_by_status<T: Reportable>(items: &[T]) -> Vec<StatusSummary> {
    let mut map: HashMap<String, (usize, f64)> = HashMap::new();

    for item in items {
        let entry = map.entry(item.status_label()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += item.headline();
    }

    let mut summaries: Vec<StatusSummary> = map
        .into_iter()
        .map(|(status, (count, total))| StatusSummary {
            status,
            count,
            avg_headline: if count == 0 { 0.0 } else { total / count as f64 },
        })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.status.cmp(&b.status)));
    summaries
}

pub fn build_report<T: Reportable>(title: &str, items: &[T], today: NaiveDate) -> String {
    let summaries = summarize_by_status(items);
    let headlines: Vec<f64> = items.iter().map(Reportable::headline).collect();
    let label = T::headline_label();

    let mut output = String::new();

    let _ = writeln!(output, "# {title} Board Report");
    let _ = writeln!(output, "Generated {} for {} records", today, items.len());
    let _ = writeln!(output);
    let _ = writeln!(output, "## Status Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No records on this screen.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} records (avg {} {:.1})",
                summary.status, summary.count, label, summary.avg_headline
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Headline Metrics");
    let _ = writeln!(output, "- Average {}: {:.1}", label, mean(&headlines));
    let _ = writeln!(output, "- Inequality (Gini): {:.2}", gini_index(&headlines));
    let _ = writeln!(
        output,
        "- Dominance (top share): {:.0}%",
        dominance_index(&headlines) * 100.0
    );

    let mut ranked: Vec<&T> = items.iter().collect();
    ranked.sort_by(|a, b| b.headline().total_cmp(&a.headline()));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Records by {label}");

    if ranked.is_empty() {
        let _ = writeln!(output, "No records on this screen.");
    } else {
        for item in ranked.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} ({}) {} {:.1}",
                item.display_name(),
                item.status_label(),
                label,
                item.headline()
            );
        }
    }

    let mut notes: Vec<(&str, &LogEntry)> = items
        .iter()
        .flat_map(|item| item.log().iter().map(move |entry| (item.display_name(), entry)))
        .collect();
    notes.sort_by(|a, b| b.1.date.cmp(&a.1.date));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Log Notes");

    if notes.is_empty() {
        let _ = writeln!(output, "No log entries recorded.");
    } else {
        for (name, entry) in notes.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} ({}) on {}: {}",
                name, entry.kind, entry.date, entry.note
            );
        }
    }

    output
}

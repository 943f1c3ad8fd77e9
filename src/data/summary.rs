use std::collections::{BTreeMap, HashMap};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use super::filter::{filtered_indices, FilterSelection};
use super::model::{DayOrNight, Visit, VisitDataset, YearMonth};

/// How many specialisations the ranking keeps.
pub const TOP_SPECIALISATIONS: usize = 10;

/// Per-month averages are taken over a full calendar year.
const MONTHS_PER_YEAR: f64 = 12.0;

// ---------------------------------------------------------------------------
// Aggregate types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCount {
    pub period: YearMonth,
    pub visits: usize,
    /// Percent change against the previous month in the series.
    pub change_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub visits: usize,
}

/// Every figure the dashboard shows, computed from one filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub filters: FilterSelection,
    pub total_visits: usize,
    pub day_visits: usize,
    pub night_visits: usize,
    pub average_day_visits: f64,
    pub average_night_visits: f64,
    /// Total divided by the number of distinct months present.
    pub average_visits_per_month: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Months present in the filtered view, ascending.
    pub visits_by_month: Vec<MonthCount>,
    pub peak_month: Option<MonthCount>,
    /// Descending by count.
    pub visits_by_type: Vec<CategoryCount>,
    /// At most [`TOP_SPECIALISATIONS`] entries, descending by count.
    pub top_specialisations: Vec<CategoryCount>,
    /// Months of the whole dataset regardless of filters.
    pub all_months: Vec<MonthCount>,
}

impl DashboardSummary {
    pub fn is_empty(&self) -> bool {
        self.total_visits == 0
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Filter the dataset and summarise the result.
pub fn compute_dashboard(dataset: &VisitDataset, selection: &FilterSelection) -> DashboardSummary {
    let indices = filtered_indices(dataset, selection);
    summarize(dataset, &indices, selection)
}

/// Summarise the visits at `indices`.
pub fn summarize(
    dataset: &VisitDataset,
    indices: &[usize],
    selection: &FilterSelection,
) -> DashboardSummary {
    let visible: Vec<&Visit> = indices
        .iter()
        .filter_map(|&i| dataset.visits.get(i))
        .collect();

    let total_visits = visible.len();
    let day_visits = visible
        .iter()
        .filter(|v| v.day_or_night == DayOrNight::Day)
        .count();
    let night_visits = total_visits - day_visits;

    let visits_by_month = monthly_counts(visible.iter().copied());
    let average_visits_per_month =
        (!visits_by_month.is_empty()).then(|| total_visits as f64 / visits_by_month.len() as f64);

    DashboardSummary {
        filters: selection.clone(),
        total_visits,
        day_visits,
        night_visits,
        average_day_visits: day_visits as f64 / MONTHS_PER_YEAR,
        average_night_visits: night_visits as f64 / MONTHS_PER_YEAR,
        average_visits_per_month,
        start_date: visible.iter().map(|v| v.created_on.date()).min(),
        end_date: visible.iter().map(|v| v.created_on.date()).max(),
        peak_month: peak_month(&visits_by_month),
        visits_by_month,
        visits_by_type: category_counts(visible.iter().map(|v| v.visit_type.as_deref()), None),
        top_specialisations: category_counts(
            visible.iter().map(|v| v.specialisation.as_deref()),
            Some(TOP_SPECIALISATIONS),
        ),
        all_months: monthly_counts(dataset.visits.iter()),
    }
}

/// Visits per calendar month (only months that occur), ascending, with
/// month-over-month change.
pub fn monthly_counts<'a>(visits: impl Iterator<Item = &'a Visit>) -> Vec<MonthCount> {
    let mut by_month: BTreeMap<YearMonth, usize> = BTreeMap::new();
    for visit in visits {
        *by_month.entry(visit.period()).or_default() += 1;
    }
    let counts: Vec<usize> = by_month.values().copied().collect();
    let changes = percent_change(&counts);

    by_month
        .into_iter()
        .zip(changes)
        .map(|((period, visits), change_pct)| MonthCount {
            period,
            visits,
            change_pct,
        })
        .collect()
}

/// `change[i] = (c[i] - c[i-1]) / c[i-1] * 100`.
///
/// The first entry has no predecessor and is `None`, as is any entry whose
/// predecessor is zero.
pub fn percent_change(counts: &[usize]) -> Vec<Option<f64>> {
    let mut changes = Vec::with_capacity(counts.len());
    if counts.is_empty() {
        return changes;
    }
    changes.push(None);
    for pair in counts.windows(2) {
        let (prev, cur) = (pair[0] as f64, pair[1] as f64);
        changes.push((pair[0] != 0).then(|| (cur - prev) / prev * 100.0));
    }
    changes
}

/// Highest month; the earliest one wins a tie.
fn peak_month(months: &[MonthCount]) -> Option<MonthCount> {
    months
        .iter()
        .fold(None::<&MonthCount>, |best, m| match best {
            Some(b) if b.visits >= m.visits => Some(b),
            _ => Some(m),
        })
        .cloned()
}

/// Count non-empty labels, sort descending (ties alphabetical) and keep at
/// most `limit` entries.
pub fn category_counts<'a>(
    labels: impl Iterator<Item = Option<&'a str>>,
    limit: Option<usize>,
) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels.flatten() {
        *counts.entry(label).or_default() += 1;
    }
    let mut sorted: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(label, visits)| CategoryCount {
            label: label.to_string(),
            visits,
        })
        .collect();
    sorted.sort_by(|a, b| b.visits.cmp(&a.visits).then_with(|| a.label.cmp(&b.label)));
    if let Some(limit) = limit {
        sorted.truncate(limit);
    }
    sorted
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Write the summary as pretty-printed JSON.
pub fn write_json(path: &Path, summary: &DashboardSummary) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary).context("writing summary JSON")?;
    writer.flush().context("flushing summary JSON")?;
    Ok(())
}

use serde::Serialize;
use thiserror::Error;

use super::model::{parse_month_abbr, Quarter, Visit, VisitDataset, MONTH_ABBREVIATIONS};

// ---------------------------------------------------------------------------
// Filter predicate: one optional selection per sidebar control
// ---------------------------------------------------------------------------

/// Current sidebar selections. `None` means "All" for that control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub year: Option<i32>,
    pub quarter: Option<Quarter>,
    /// 1-based month number.
    pub month: Option<u32>,
    pub visit_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterParseError {
    #[error("'{0}' is not a year")]
    Year(String),
    #[error("'{0}' is not a quarter (expected Q1..Q4)")]
    Quarter(String),
    #[error("'{0}' is not a month (expected Jan..Dec)")]
    Month(String),
}

/// `"All"` (any case) or an empty string means no selection.
fn is_all(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s.eq_ignore_ascii_case("all")
}

impl FilterSelection {
    /// True when every control is set to "All".
    pub fn is_unfiltered(&self) -> bool {
        *self == FilterSelection::default()
    }

    pub fn parse_year(s: &str) -> Result<Option<i32>, FilterParseError> {
        if is_all(s) {
            return Ok(None);
        }
        s.trim()
            .parse()
            .map(Some)
            .map_err(|_| FilterParseError::Year(s.to_string()))
    }

    pub fn parse_quarter(s: &str) -> Result<Option<Quarter>, FilterParseError> {
        if is_all(s) {
            return Ok(None);
        }
        s.parse()
            .map(Some)
            .map_err(|_| FilterParseError::Quarter(s.to_string()))
    }

    pub fn parse_month(s: &str) -> Result<Option<u32>, FilterParseError> {
        if is_all(s) {
            return Ok(None);
        }
        parse_month_abbr(s)
            .map(Some)
            .ok_or_else(|| FilterParseError::Month(s.to_string()))
    }

    pub fn parse_visit_type(s: &str) -> Option<String> {
        (!is_all(s)).then(|| s.trim().to_string())
    }

    /// Whether a single visit passes every active control.
    ///
    /// Controls combine conjunctively, so a quarter and a month outside it
    /// select nothing.
    pub fn matches(&self, visit: &Visit) -> bool {
        if let Some(year) = self.year {
            if visit.year() != year {
                return false;
            }
        }
        if let Some(quarter) = self.quarter {
            if !quarter.contains(visit.month()) {
                return false;
            }
        }
        if let Some(month) = self.month {
            if visit.month() != month {
                return false;
            }
        }
        if let Some(kind) = &self.visit_type {
            if visit.visit_type.as_deref() != Some(kind.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Return indices of visits that pass all active filters.
pub fn filtered_indices(dataset: &VisitDataset, selection: &FilterSelection) -> Vec<usize> {
    dataset
        .visits
        .iter()
        .enumerate()
        .filter(|(_, visit)| selection.matches(visit))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Options offered by the sidebar controls
// ---------------------------------------------------------------------------

/// Choices for each control, excluding the implicit "All".
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub quarters: Vec<Quarter>,
    /// `(month number, abbreviation)`
    pub months: Vec<(u32, &'static str)>,
    pub visit_types: Vec<String>,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &VisitDataset) -> Self {
        FilterOptions {
            years: dataset.years.iter().copied().collect(),
            quarters: Quarter::ALL.to_vec(),
            months: MONTH_ABBREVIATIONS
                .iter()
                .enumerate()
                .map(|(i, name)| (i as u32 + 1, *name))
                .collect(),
            visit_types: dataset.visit_types.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::DayOrNight;
    use chrono::{NaiveDate, NaiveTime};

    fn visit(y: i32, m: u32, kind: &str) -> Visit {
        Visit {
            created_on: NaiveDate::from_ymd_opt(y, m, 15)
                .unwrap()
                .and_time(NaiveTime::MIN),
            visit_type: Some(kind.to_string()),
            day_or_night: DayOrNight::Night,
            specialisation: None,
        }
    }

    fn dataset() -> VisitDataset {
        VisitDataset::from_visits(
            vec![
                visit(2023, 1, "Home"),
                visit(2023, 4, "Clinic"),
                visit(2024, 2, "Home"),
                visit(2024, 4, "Home"),
                visit(2024, 11, "Clinic"),
            ],
            0,
        )
    }

    #[test]
    fn all_returns_everything() {
        let ds = dataset();
        let selection = FilterSelection::default();
        assert!(selection.is_unfiltered());
        assert_eq!(filtered_indices(&ds, &selection), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn year_filter_keeps_only_that_year() {
        let ds = dataset();
        let selection = FilterSelection {
            year: Some(2024),
            ..Default::default()
        };
        let idx = filtered_indices(&ds, &selection);
        assert_eq!(idx, vec![2, 3, 4]);
        assert!(idx.iter().all(|&i| ds.visits[i].year() == 2024));
    }

    #[test]
    fn quarter_and_month_are_conjunctive() {
        let ds = dataset();
        let q2 = FilterSelection {
            quarter: Some(Quarter::Q2),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &q2), vec![1, 3]);

        let q1_april = FilterSelection {
            quarter: Some(Quarter::Q1),
            month: Some(4),
            ..Default::default()
        };
        assert!(filtered_indices(&ds, &q1_april).is_empty());
    }

    #[test]
    fn visit_type_filter() {
        let ds = dataset();
        let selection = FilterSelection {
            year: Some(2024),
            visit_type: Some("Clinic".into()),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &selection), vec![4]);
    }

    #[test]
    fn parsing_text_selections() {
        assert_eq!(FilterSelection::parse_year("All"), Ok(None));
        assert_eq!(FilterSelection::parse_year("2024"), Ok(Some(2024)));
        assert!(FilterSelection::parse_year("twenty").is_err());
        assert_eq!(FilterSelection::parse_quarter("q2"), Ok(Some(Quarter::Q2)));
        assert_eq!(FilterSelection::parse_month("Mar"), Ok(Some(3)));
        assert_eq!(
            FilterSelection::parse_month("March"),
            Err(FilterParseError::Month("March".into()))
        );
        assert_eq!(FilterSelection::parse_visit_type(""), None);
        assert_eq!(
            FilterSelection::parse_visit_type("Home"),
            Some("Home".to_string())
        );
    }

    #[test]
    fn options_follow_the_data() {
        let options = FilterOptions::from_dataset(&dataset());
        assert_eq!(options.years, vec![2023, 2024]);
        assert_eq!(options.quarters.len(), 4);
        assert_eq!(options.months.len(), 12);
        assert_eq!(options.months[0], (1, "Jan"));
        assert_eq!(options.visit_types, vec!["Clinic", "Home"]);
    }
}

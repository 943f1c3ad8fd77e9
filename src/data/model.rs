use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Calendar helpers
// ---------------------------------------------------------------------------

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Abbreviated English month name for a 1-based month number.
pub fn month_abbr(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_ABBREVIATIONS.get(i as usize))
        .copied()
        .unwrap_or("???")
}

/// Parse `"Jan"`..`"Dec"` (case-insensitive) into a 1-based month number.
pub fn parse_month_abbr(s: &str) -> Option<u32> {
    let s = s.trim();
    MONTH_ABBREVIATIONS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(s))
        .map(|i| i as u32 + 1)
}

// ---------------------------------------------------------------------------
// DayOrNight
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayOrNight {
    Day,
    Night,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected 'Day' or 'Night', got '{0}'")]
pub struct UnknownDayOrNight(pub String);

impl FromStr for DayOrNight {
    type Err = UnknownDayOrNight;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("day") {
            Ok(DayOrNight::Day)
        } else if s.eq_ignore_ascii_case("night") {
            Ok(DayOrNight::Night)
        } else {
            Err(UnknownDayOrNight(s.to_string()))
        }
    }
}

impl fmt::Display for DayOrNight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayOrNight::Day => write!(f, "Day"),
            DayOrNight::Night => write!(f, "Night"),
        }
    }
}

// ---------------------------------------------------------------------------
// Quarter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown quarter '{0}' (expected Q1..Q4)")]
pub struct UnknownQuarter(pub String);

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    /// The three 1-based months making up this quarter.
    pub fn months(self) -> [u32; 3] {
        let first = self.index() * 3 + 1;
        [first, first + 1, first + 2]
    }

    pub fn contains(self, month: u32) -> bool {
        Quarter::of_month(month) == Some(self)
    }

    pub fn of_month(month: u32) -> Option<Quarter> {
        match month {
            1..=3 => Some(Quarter::Q1),
            4..=6 => Some(Quarter::Q2),
            7..=9 => Some(Quarter::Q3),
            10..=12 => Some(Quarter::Q4),
            _ => None,
        }
    }

    fn index(self) -> u32 {
        match self {
            Quarter::Q1 => 0,
            Quarter::Q2 => 1,
            Quarter::Q3 => 2,
            Quarter::Q4 => 3,
        }
    }
}

impl FromStr for Quarter {
    type Err = UnknownQuarter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quarter::ALL
            .into_iter()
            .find(|q| q.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownQuarter(s.to_string()))
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.index() + 1)
    }
}

// ---------------------------------------------------------------------------
// YearMonth – monthly period used for bucketing
// ---------------------------------------------------------------------------

/// A calendar month. Field order gives chronological `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(timestamp: &NaiveDateTime) -> Self {
        YearMonth {
            year: timestamp.year(),
            month: timestamp.month(),
        }
    }

    /// Compact axis label, e.g. `2024-01`.
    pub fn label(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", month_abbr(self.month), self.year)
    }
}

// ---------------------------------------------------------------------------
// Visit – one row of the source file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    pub created_on: NaiveDateTime,
    pub visit_type: Option<String>,
    pub day_or_night: DayOrNight,
    pub specialisation: Option<String>,
}

impl Visit {
    pub fn period(&self) -> YearMonth {
        YearMonth::of(&self.created_on)
    }

    pub fn year(&self) -> i32 {
        self.created_on.year()
    }

    pub fn month(&self) -> u32 {
        self.created_on.month()
    }
}

// ---------------------------------------------------------------------------
// VisitDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed filter indices.
#[derive(Debug, Clone, Default)]
pub struct VisitDataset {
    /// All visits (rows that decoded cleanly).
    pub visits: Vec<Visit>,
    /// Sorted distinct visit types (empty values excluded).
    pub visit_types: BTreeSet<String>,
    /// Sorted distinct calendar years of `created_on`.
    pub years: BTreeSet<i32>,
    /// Rows dropped by the loader because they could not be decoded.
    pub skipped_rows: usize,
}

impl VisitDataset {
    /// Build the indices from the loaded visits.
    pub fn from_visits(visits: Vec<Visit>, skipped_rows: usize) -> Self {
        let visit_types = visits
            .iter()
            .filter_map(|v| v.visit_type.clone())
            .collect();
        let years = visits.iter().map(Visit::year).collect();
        VisitDataset {
            visits,
            visit_types,
            years,
            skipped_rows,
        }
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn visit(y: i32, m: u32, kind: &str) -> Visit {
        Visit {
            created_on: NaiveDate::from_ymd_opt(y, m, 1)
                .unwrap()
                .and_time(NaiveTime::MIN),
            visit_type: Some(kind.to_string()),
            day_or_night: DayOrNight::Day,
            specialisation: None,
        }
    }

    #[test]
    fn day_or_night_parsing() {
        assert_eq!("Day".parse::<DayOrNight>(), Ok(DayOrNight::Day));
        assert_eq!(" night ".parse::<DayOrNight>(), Ok(DayOrNight::Night));
        assert!("Dusk".parse::<DayOrNight>().is_err());
    }

    #[test]
    fn quarters_cover_the_year() {
        assert_eq!(Quarter::Q1.months(), [1, 2, 3]);
        assert_eq!(Quarter::Q4.months(), [10, 11, 12]);
        for month in 1..=12 {
            let q = Quarter::of_month(month).unwrap();
            assert!(q.months().contains(&month));
            assert!(q.contains(month));
        }
        assert_eq!(Quarter::of_month(13), None);
        assert_eq!("q3".parse::<Quarter>(), Ok(Quarter::Q3));
        assert!("Q5".parse::<Quarter>().is_err());
    }

    #[test]
    fn month_names() {
        assert_eq!(month_abbr(1), "Jan");
        assert_eq!(month_abbr(12), "Dec");
        assert_eq!(parse_month_abbr("sep"), Some(9));
        assert_eq!(parse_month_abbr("Sept"), None);
    }

    #[test]
    fn year_month_orders_chronologically() {
        let a = YearMonth { year: 2023, month: 12 };
        let b = YearMonth { year: 2024, month: 1 };
        assert!(a < b);
        assert_eq!(b.to_string(), "Jan 2024");
        assert_eq!(a.label(), "2023-12");
    }

    #[test]
    fn dataset_indices() {
        let ds = VisitDataset::from_visits(
            vec![
                visit(2024, 3, "Home"),
                visit(2023, 1, "Clinic"),
                visit(2024, 5, "Home"),
            ],
            2,
        );
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.years.iter().copied().collect::<Vec<_>>(), vec![2023, 2024]);
        assert_eq!(
            ds.visit_types.iter().cloned().collect::<Vec<_>>(),
            vec!["Clinic".to_string(), "Home".to_string()]
        );
        assert_eq!(ds.skipped_rows, 2);
    }
}

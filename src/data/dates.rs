use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Spreadsheet serial dates
// ---------------------------------------------------------------------------

/// Serial day numbers count from 1899-12-30, so serial 1 is 1899-12-31 and
/// 45292 is 2024-01-01. The fractional part is the time of day.
const EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serial number of the day after 9999-12-31; anything at or past this does
/// not fit a four-digit year.
const SERIAL_LIMIT: f64 = 2_958_466.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DateDecodeError {
    #[error("date offset {0} is negative")]
    Negative(f64),
    #[error("date offset is not a finite number")]
    NotFinite,
    #[error("date offset {0} is past 9999-12-31")]
    OutOfRange(f64),
}

fn epoch() -> NaiveDateTime {
    let (y, m, d) = EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN)
}

/// Decode a serial day offset into a timestamp, rounding to the second.
pub fn decode_serial_date(offset: f64) -> Result<NaiveDateTime, DateDecodeError> {
    if !offset.is_finite() {
        return Err(DateDecodeError::NotFinite);
    }
    if offset < 0.0 {
        return Err(DateDecodeError::Negative(offset));
    }
    if offset >= SERIAL_LIMIT {
        return Err(DateDecodeError::OutOfRange(offset));
    }

    let seconds = (offset * SECONDS_PER_DAY).round() as i64;
    Duration::try_seconds(seconds)
        .and_then(|delta| epoch().checked_add_signed(delta))
        .ok_or(DateDecodeError::OutOfRange(offset))
}

/// Inverse of [`decode_serial_date`].
pub fn encode_serial_date(timestamp: NaiveDateTime) -> f64 {
    (timestamp - epoch()).num_seconds() as f64 / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(NaiveTime::MIN)
    }

    #[test]
    fn zero_is_the_epoch() {
        assert_eq!(decode_serial_date(0.0).unwrap(), ymd(1899, 12, 30));
    }

    #[test]
    fn known_serials() {
        assert_eq!(decode_serial_date(45292.0).unwrap(), ymd(2024, 1, 1));
        assert_eq!(decode_serial_date(44927.0).unwrap(), ymd(2023, 1, 1));
        assert_eq!(decode_serial_date(45657.0).unwrap(), ymd(2024, 12, 31));
    }

    #[test]
    fn fraction_is_time_of_day() {
        let ts = decode_serial_date(45292.75).unwrap();
        assert_eq!(ts.date().day(), 1);
        assert_eq!(ts.hour(), 18);
        assert_eq!(ts.minute(), 0);
    }

    #[test]
    fn rejects_invalid_offsets() {
        assert_eq!(
            decode_serial_date(-1.0),
            Err(DateDecodeError::Negative(-1.0))
        );
        assert_eq!(decode_serial_date(f64::NAN), Err(DateDecodeError::NotFinite));
        assert_eq!(
            decode_serial_date(f64::INFINITY),
            Err(DateDecodeError::NotFinite)
        );
        assert!(matches!(
            decode_serial_date(3_000_000.0),
            Err(DateDecodeError::OutOfRange(_))
        ));
    }

    #[test]
    fn encode_inverts_decode() {
        let ts = decode_serial_date(45400.5).unwrap();
        assert!((encode_serial_date(ts) - 45400.5).abs() < 1e-9);
    }
}

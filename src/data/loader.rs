use std::borrow::Cow;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::dates::{decode_serial_date, DateDecodeError};
use super::model::{DayOrNight, UnknownDayOrNight, Visit, VisitDataset};

pub const COL_CREATED_ON: &str = "visit_created_on";
pub const COL_VISIT_TYPE: &str = "visit_type";
pub const COL_DAY_OR_NIGHT: &str = "DayOrNight";
pub const COL_SPECIALISATION: &str = "attending_doctor_specialisation";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a visit dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row; UTF-8 or ISO-8859-1 text
/// * `.json`    – `[{ "visit_created_on": 45292.4, "visit_type": ..., ... }, ...]`
/// * `.parquet` – flat table with the same column names
///
/// Rows that fail to decode are skipped and counted in
/// [`VisitDataset::skipped_rows`]; structural problems (missing columns,
/// unreadable file) fail the whole load.
pub fn load_file(path: &Path) -> Result<VisitDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    if dataset.skipped_rows > 0 {
        log::warn!(
            "{}: skipped {} malformed rows",
            path.display(),
            dataset.skipped_rows
        );
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Row decoding shared by all formats
// ---------------------------------------------------------------------------

/// Why a single row was dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("missing visit_created_on")]
    MissingDate,
    #[error("visit_created_on '{0}' is not a number")]
    NotANumber(String),
    #[error(transparent)]
    Date(#[from] DateDecodeError),
    #[error(transparent)]
    DayOrNight(#[from] UnknownDayOrNight),
}

/// One row as read from the file, before validation.
struct RawVisit<'a> {
    created_on: Result<f64, RowError>,
    visit_type: Option<&'a str>,
    day_or_night: Option<&'a str>,
    specialisation: Option<&'a str>,
}

impl RawVisit<'_> {
    fn into_visit(self) -> Result<Visit, RowError> {
        let created_on = decode_serial_date(self.created_on?)?;
        let day_or_night: DayOrNight = self.day_or_night.unwrap_or("").parse()?;
        Ok(Visit {
            created_on,
            visit_type: non_empty(self.visit_type),
            day_or_night,
            specialisation: non_empty(self.specialisation),
        })
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_offset(text: Option<&str>) -> Result<f64, RowError> {
    let text = text.map(str::trim).unwrap_or("");
    if text.is_empty() {
        return Err(RowError::MissingDate);
    }
    text.parse()
        .map_err(|_| RowError::NotANumber(text.to_string()))
}

/// Collects decoded rows. Row numbers count data rows from 1.
#[derive(Default)]
struct RowCollector {
    visits: Vec<Visit>,
    skipped: usize,
}

impl RowCollector {
    fn push(&mut self, row_no: usize, row: Result<Visit, RowError>) {
        match row {
            Ok(visit) => self.visits.push(visit),
            Err(e) => {
                log::warn!("Row {row_no}: {e}");
                self.skipped += 1;
            }
        }
    }

    fn finish(self) -> VisitDataset {
        VisitDataset::from_visits(self.visits, self.skipped)
    }
}

/// Positions of the required columns in a header row.
struct ColumnIndex {
    created_on: usize,
    visit_type: usize,
    day_or_night: usize,
    specialisation: usize,
}

impl ColumnIndex {
    fn locate<S: AsRef<str>>(headers: &[S]) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.as_ref() == name)
                .with_context(|| format!("missing '{name}' column"))
        };
        Ok(ColumnIndex {
            created_on: find(COL_CREATED_ON)?,
            visit_type: find(COL_VISIT_TYPE)?,
            day_or_night: find(COL_DAY_OR_NIGHT)?,
            specialisation: find(COL_SPECIALISATION)?,
        })
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Exports of this dataset are usually ISO-8859-1; UTF-8 is accepted too.
fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
    }
}

fn load_csv(path: &Path) -> Result<VisitDataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .byte_headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| decode_text(h).trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    let columns = ColumnIndex::locate(&headers).context("CSV header")?;

    let mut rows = RowCollector::default();

    for (row_no, result) in (1..).zip(reader.byte_records()) {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let field = |idx: usize| record.get(idx).map(decode_text);

        let created_on = field(columns.created_on);
        let visit_type = field(columns.visit_type);
        let day_or_night = field(columns.day_or_night);
        let specialisation = field(columns.specialisation);

        let raw = RawVisit {
            created_on: parse_offset(created_on.as_deref()),
            visit_type: visit_type.as_deref(),
            day_or_night: day_or_night.as_deref(),
            specialisation: specialisation.as_deref(),
        };
        rows.push(row_no, raw.into_visit());
    }

    Ok(rows.finish())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "visit_created_on": 45292.41,
///     "visit_type": "Home Visit",
///     "DayOrNight": "Day",
///     "attending_doctor_specialisation": "General Practice"
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<VisitDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut rows = RowCollector::default();

    for (row_no, rec) in (1..).zip(records) {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {row_no} is not a JSON object"))?;

        let created_on = match obj.get(COL_CREATED_ON) {
            None | Some(JsonValue::Null) => Err(RowError::MissingDate),
            Some(JsonValue::Number(n)) => n
                .as_f64()
                .ok_or_else(|| RowError::NotANumber(n.to_string())),
            Some(JsonValue::String(s)) => parse_offset(Some(s.as_str())),
            Some(other) => Err(RowError::NotANumber(other.to_string())),
        };
        let text = |key: &str| obj.get(key).and_then(JsonValue::as_str);

        let raw = RawVisit {
            created_on,
            visit_type: text(COL_VISIT_TYPE),
            day_or_night: text(COL_DAY_OR_NIGHT),
            specialisation: text(COL_SPECIALISATION),
        };
        rows.push(row_no, raw.into_visit());
    }

    Ok(rows.finish())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of visits.
///
/// `visit_created_on` may be Float64, Float32, Int64 or Int32; the text
/// columns Utf8 or LargeUtf8. Works with files written by both **Pandas**
/// and **Polars**.
fn load_parquet(path: &Path) -> Result<VisitDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = RowCollector::default();
    let mut row_no = 1;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        let columns = ColumnIndex::locate(&names).context("parquet schema")?;

        let created_col = batch.column(columns.created_on);
        let type_col = batch.column(columns.visit_type);
        let shift_col = batch.column(columns.day_or_night);
        let spec_col = batch.column(columns.specialisation);

        for row in 0..batch.num_rows() {
            let visit_type = string_at(type_col, row);
            let day_or_night = string_at(shift_col, row);
            let specialisation = string_at(spec_col, row);

            let raw = RawVisit {
                created_on: numeric_at(created_col, row),
                visit_type: visit_type.as_deref(),
                day_or_night: day_or_night.as_deref(),
                specialisation: specialisation.as_deref(),
            };
            rows.push(row_no, raw.into_visit());
            row_no += 1;
        }
    }

    Ok(rows.finish())
}

// -- Arrow helpers --

/// Read a day offset from a numeric (or numeric text) column.
fn numeric_at(col: &ArrayRef, row: usize) -> Result<f64, RowError> {
    if col.is_null(row) {
        return Err(RowError::MissingDate);
    }
    let value = match col.data_type() {
        DataType::Float64 => col.as_primitive_opt::<Float64Type>().map(|a| a.value(row)),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| a.value(row) as f64),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| a.value(row) as f64),
        DataType::Utf8 | DataType::LargeUtf8 => {
            return parse_offset(string_at(col, row).as_deref());
        }
        _ => None,
    };
    value.ok_or_else(|| RowError::NotANumber(format!("{:?}", col.data_type())))
}

/// Read a text cell; nulls and non-text columns yield `None`.
fn string_at(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col.as_string_opt::<i32>().map(|a| a.value(row).to_string()),
        DataType::LargeUtf8 => col.as_string_opt::<i64>().map(|a| a.value(row).to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{
        Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray,
    };
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use chrono::{Datelike, NaiveDate};
    use parquet::arrow::ArrowWriter;

    fn temp_file(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    const HEADER: &str =
        "id,visit_created_on,visit_type,DayOrNight,attending_doctor_specialisation\n";

    #[test]
    fn csv_rows_decode() {
        let body = format!(
            "{HEADER}1,45292.5,Home Visit,Day,Cardiology\n2,45323,Clinic,Night,\n"
        );
        let file = temp_file(".csv", body.as_bytes());
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.skipped_rows, 0);
        let first = &ds.visits[0];
        assert_eq!(first.created_on.date().year(), 2024);
        assert_eq!(first.created_on.date().month(), 1);
        assert_eq!(first.visit_type.as_deref(), Some("Home Visit"));
        assert_eq!(first.day_or_night, DayOrNight::Day);
        assert_eq!(first.specialisation.as_deref(), Some("Cardiology"));

        let second = &ds.visits[1];
        assert_eq!(second.created_on.date().month(), 2);
        assert_eq!(second.day_or_night, DayOrNight::Night);
        assert_eq!(second.specialisation, None);
    }

    #[test]
    fn csv_latin1_text_is_decoded() {
        let mut body = HEADER.as_bytes().to_vec();
        body.extend_from_slice(b"1,45292,Home,Day,M\xe9decine g\xe9n\xe9rale\n");
        let file = temp_file(".csv", &body);
        let ds = load_file(file.path()).unwrap();
        assert_eq!(
            ds.visits[0].specialisation.as_deref(),
            Some("Médecine générale")
        );
    }

    #[test]
    fn csv_bad_rows_are_skipped() {
        let body = format!(
            "{HEADER}1,-3,Home,Day,X\n2,soon,Home,Day,X\n3,,Home,Day,X\n\
             4,45292,Home,Dusk,X\n5,45292,Home,Night,X\n"
        );
        let file = temp_file(".csv", body.as_bytes());
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.skipped_rows, 4);
    }

    #[test]
    fn csv_missing_column_is_an_error() {
        let file = temp_file(".csv", b"visit_created_on,visit_type,DayOrNight\n45292,Home,Day\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains(COL_SPECIALISATION));
    }

    #[test]
    fn json_records() {
        let body = r#"[
            {"visit_created_on": 45292.25, "visit_type": "Home", "DayOrNight": "Day",
             "attending_doctor_specialisation": "Paediatrics"},
            {"visit_created_on": "45300", "visit_type": "Clinic", "DayOrNight": "Night",
             "attending_doctor_specialisation": null},
            {"visit_created_on": null, "visit_type": "Clinic", "DayOrNight": "Night"}
        ]"#;
        let file = temp_file(".json", body.as_bytes());
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.skipped_rows, 1);
        assert_eq!(ds.visits[1].specialisation, None);
    }

    #[test]
    fn parquet_table() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(COL_CREATED_ON, DataType::Float64, true),
            Field::new(COL_VISIT_TYPE, DataType::Utf8, true),
            Field::new(COL_DAY_OR_NIGHT, DataType::Utf8, false),
            Field::new(COL_SPECIALISATION, DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![Some(45292.0), None, Some(45400.0)])),
                Arc::new(StringArray::from(vec![Some("Home"), Some("Home"), None])),
                Arc::new(StringArray::from(vec!["Day", "Day", "Night"])),
                Arc::new(StringArray::from(vec![Some("GP"), None, None])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.skipped_rows, 1);
        assert_eq!(ds.visits[1].visit_type, None);
        assert_eq!(ds.visits[1].day_or_night, DayOrNight::Night);
    }

    fn parquet_file(batch: &RecordBatch) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer =
            ArrowWriter::try_new(file.reopen().unwrap(), batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
        file
    }

    fn large_text(values: Vec<Option<&str>>) -> ArrayRef {
        Arc::new(LargeStringArray::from(values))
    }

    #[test]
    fn parquet_integer_offsets_and_large_text() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(COL_CREATED_ON, DataType::Int64, false),
            Field::new(COL_VISIT_TYPE, DataType::LargeUtf8, true),
            Field::new(COL_DAY_OR_NIGHT, DataType::LargeUtf8, false),
            Field::new(COL_SPECIALISATION, DataType::LargeUtf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![45292, 45300])),
                large_text(vec![Some("Clinic"), None]),
                large_text(vec![Some("Day"), Some("Night")]),
                large_text(vec![None, Some("Urology")]),
            ],
        )
        .unwrap();
        let file = parquet_file(&batch);

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.skipped_rows, 0);
        assert_eq!(ds.visits[0].created_on.date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(ds.visits[1].created_on.date(), NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
        assert_eq!(ds.visits[0].visit_type.as_deref(), Some("Clinic"));
        assert_eq!(ds.visits[0].specialisation, None);
        assert_eq!(ds.visits[1].visit_type, None);
        assert_eq!(ds.visits[1].day_or_night, DayOrNight::Night);
        assert_eq!(ds.visits[1].specialisation.as_deref(), Some("Urology"));
    }

    #[test]
    fn parquet_narrow_numeric_offsets() {
        let text = |v: &str| -> ArrayRef { Arc::new(StringArray::from(vec![v])) };
        let narrow: [(DataType, ArrayRef); 2] = [
            (DataType::Float32, Arc::new(Float32Array::from(vec![45292.5_f32]))),
            (DataType::Int32, Arc::new(Int32Array::from(vec![45292]))),
        ];
        for (data_type, created_on) in narrow {
            let schema = Arc::new(Schema::new(vec![
                Field::new(COL_CREATED_ON, data_type.clone(), false),
                Field::new(COL_VISIT_TYPE, DataType::Utf8, false),
                Field::new(COL_DAY_OR_NIGHT, DataType::Utf8, false),
                Field::new(COL_SPECIALISATION, DataType::Utf8, false),
            ]));
            let batch = RecordBatch::try_new(
                schema,
                vec![created_on, text("Home"), text("Day"), text("GP")],
            )
            .unwrap();
            let file = parquet_file(&batch);

            let ds = load_file(file.path()).unwrap();
            assert_eq!(ds.len(), 1, "{data_type:?}");
            assert_eq!(
                ds.visits[0].created_on.date(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                "{data_type:?}"
            );
        }
    }

    #[test]
    fn csv_ragged_row_is_an_error() {
        let body = format!("{HEADER}1,45292,Home,Day,GP\n2,45293\n");
        let file = temp_file(".csv", body.as_bytes());
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("CSV row 2"), "{err:#}");
    }

    #[test]
    fn json_rows_are_numbered_from_one() {
        let body = r#"[
            {"visit_created_on": 45292, "visit_type": "Home", "DayOrNight": "Day"},
            42
        ]"#;
        let file = temp_file(".json", body.as_bytes());
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Row 2 is not a JSON object"), "{err:#}");
    }

    #[test]
    fn unsupported_extension() {
        let file = temp_file(".xlsx", b"");
        assert!(load_file(file.path()).is_err());
    }
}

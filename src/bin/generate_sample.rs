use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate, Timelike};
use parquet::arrow::ArrowWriter;

use visit_dashboard::data::dates::{decode_serial_date, encode_serial_date};
use visit_dashboard::data::loader::{
    COL_CREATED_ON, COL_DAY_OR_NIGHT, COL_SPECIALISATION, COL_VISIT_TYPE,
};

const VISIT_TYPES: [(&str, f64); 4] = [
    ("Home Visit", 0.45),
    ("Clinic", 0.3),
    ("Telehealth", 0.2),
    ("Emergency", 0.05),
];

const SPECIALISATIONS: [&str; 14] = [
    "General Practice",
    "Paediatrics",
    "Cardiology",
    "Dermatology",
    "Orthopaedics",
    "Psychiatry",
    "Neurology",
    "Obstetrics",
    "Ophthalmology",
    "Oncology",
    "Gériatrie",
    "Radiology",
    "Urology",
    "Endocrinology",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Pick an index from cumulative-free weights.
    fn weighted(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let mut target = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            if target < *w {
                return i;
            }
            target -= w;
        }
        weights.len() - 1
    }

    /// Zipf-like rank: lower indices are much more common.
    fn ranked(&mut self, n: usize) -> usize {
        let weights: Vec<f64> = (1..=n).map(|r| 1.0 / r as f64).collect();
        self.weighted(&weights)
    }
}

struct SampleVisit {
    created_on: f64,
    visit_type: &'static str,
    day_or_night: &'static str,
    specialisation: &'static str,
}

fn generate(rng: &mut SimpleRng, start: NaiveDate, days: i64) -> Vec<SampleVisit> {
    let type_weights: Vec<f64> = VISIT_TYPES.iter().map(|(_, w)| *w).collect();
    let mut visits = Vec::new();

    for day in 0..days {
        let date = start + Duration::days(day);
        let midnight = encode_serial_date(date.and_time(chrono::NaiveTime::MIN));

        // Busier in winter months.
        let seasonal = 1.0 + 0.5 * (day as f64 / 365.0 * std::f64::consts::TAU).cos();
        let count = (6.0 * seasonal + rng.next_f64() * 4.0) as usize;

        for _ in 0..count {
            let created_on = midnight + rng.next_f64();
            let hour = decode_serial_date(created_on)
                .map(|ts| ts.hour())
                .unwrap_or(12);
            visits.push(SampleVisit {
                created_on: (created_on * 1e5).round() / 1e5,
                visit_type: VISIT_TYPES[rng.weighted(&type_weights)].0,
                day_or_night: if (7..19).contains(&hour) { "Day" } else { "Night" },
                specialisation: SPECIALISATIONS[rng.ranked(SPECIALISATIONS.len())],
            });
        }
    }
    visits
}

/// Encode as ISO-8859-1, the encoding of the real exports.
fn latin1(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn write_csv(path: &Path, visits: &[SampleVisit]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record([
        "visit_id",
        COL_CREATED_ON,
        COL_VISIT_TYPE,
        COL_DAY_OR_NIGHT,
        COL_SPECIALISATION,
    ])?;
    for (i, v) in visits.iter().enumerate() {
        writer.write_record([
            (i + 1).to_string().into_bytes(),
            v.created_on.to_string().into_bytes(),
            latin1(v.visit_type),
            latin1(v.day_or_night),
            latin1(v.specialisation),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, visits: &[SampleVisit]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(COL_CREATED_ON, DataType::Float64, false),
        Field::new(COL_VISIT_TYPE, DataType::Utf8, false),
        Field::new(COL_DAY_OR_NIGHT, DataType::Utf8, false),
        Field::new(COL_SPECIALISATION, DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from_iter_values(visits.iter().map(|v| v.created_on))),
            Arc::new(StringArray::from_iter_values(visits.iter().map(|v| v.visit_type))),
            Arc::new(StringArray::from_iter_values(visits.iter().map(|v| v.day_or_night))),
            Arc::new(StringArray::from_iter_values(visits.iter().map(|v| v.specialisation))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let stem = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_visits".to_string());

    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).context("start date")?;
    let visits = generate(&mut rng, start, 731);

    let csv_path = format!("{stem}.csv");
    let parquet_path = format!("{stem}.parquet");
    write_csv(Path::new(&csv_path), &visits)?;
    write_parquet(Path::new(&parquet_path), &visits)?;

    println!(
        "Wrote {} visits to {csv_path} and {parquet_path}",
        visits.len()
    );
    Ok(())
}

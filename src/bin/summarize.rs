//! Print the dashboard figures for a data file as JSON.
//!
//! ```text
//! summarize PATH [--year YYYY] [--quarter Qn] [--month Mon] [--visit-type TYPE]
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use visit_dashboard::data::filter::FilterSelection;
use visit_dashboard::data::loader::load_file;
use visit_dashboard::data::summary::compute_dashboard;

const USAGE: &str =
    "usage: summarize PATH [--year YYYY] [--quarter Qn] [--month Mon] [--visit-type TYPE]";

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<(PathBuf, FilterSelection)> {
    let mut args = args.into_iter();
    let mut path = None;
    let mut selection = FilterSelection::default();

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .with_context(|| format!("{flag} needs a value\n{USAGE}"))
        };
        match arg.as_str() {
            "--year" => selection.year = FilterSelection::parse_year(&value("--year")?)?,
            "--quarter" => {
                selection.quarter = FilterSelection::parse_quarter(&value("--quarter")?)?
            }
            "--month" => selection.month = FilterSelection::parse_month(&value("--month")?)?,
            "--visit-type" => {
                selection.visit_type = FilterSelection::parse_visit_type(&value("--visit-type")?)
            }
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
            _ if path.is_none() => path = Some(PathBuf::from(arg)),
            _ => bail!("unexpected argument {arg}\n{USAGE}"),
        }
    }

    let path = path.context(USAGE)?;
    Ok((path, selection))
}

fn main() -> Result<()> {
    env_logger::init();

    let (path, selection) = parse_args(std::env::args().skip(1))?;
    let dataset = load_file(&path).with_context(|| format!("loading {}", path.display()))?;
    log::info!(
        "Loaded {} visits ({} rows skipped)",
        dataset.len(),
        dataset.skipped_rows
    );

    let summary = compute_dashboard(&dataset, &selection);

    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &summary).context("writing summary")?;
    writeln!(out)?;
    Ok(())
}

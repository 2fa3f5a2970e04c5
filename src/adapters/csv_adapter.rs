//! CSV file data adapter.
//!
//! Each symbol lives in `<base_path>/<SYMBOL>.csv` with a header row.
//! Columns are located by name, so their order does not matter.

use crate::domain::error::AlgolabError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::signal::ExternalSignals;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const TIMESTAMP_COLUMNS: [&str; 2] = ["timestamp", "date"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Raw integer signals from the `signal` column of `path`. When the file
    /// also has a timestamp or date column the signals are keyed by it,
    /// otherwise they are positional. Values are not range-checked here.
    pub fn read_signals(path: &Path) -> Result<ExternalSignals, AlgolabError> {
        let mut rdr = open_reader(path)?;
        let headers = read_headers(&mut rdr)?;
        let column = find_column(&headers, &["signal"])?;
        let timestamp_column = find_column(&headers, &TIMESTAMP_COLUMNS).ok();

        let mut values = Vec::new();
        let mut timestamps = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(csv_error)?;
            let row = row_number(&record);
            if let Some(index) = timestamp_column {
                timestamps.push(timestamp(&record, index, row)?);
            }
            let raw = cell(&record, column, "signal", row)?;
            let value = raw.parse::<i64>().map_err(|e| AlgolabError::InvalidField {
                row,
                field: "signal".into(),
                reason: format!("{raw:?}: {e}"),
            })?;
            values.push(value);
        }

        debug!(
            path = %path.display(),
            rows = values.len(),
            dated = timestamp_column.is_some(),
            "signals read"
        );
        Ok(match timestamp_column {
            Some(_) => ExternalSignals::Dated(timestamps.into_iter().zip(values).collect()),
            None => ExternalSignals::Positional(values),
        })
    }
}

struct Columns {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, AlgolabError> {
        Ok(Columns {
            timestamp: find_column(headers, &TIMESTAMP_COLUMNS)?,
            open: find_column(headers, &["open"])?,
            high: find_column(headers, &["high"])?,
            low: find_column(headers, &["low"])?,
            close: find_column(headers, &["close"])?,
            volume: find_column(headers, &["volume"])?,
        })
    }

    fn parse(&self, record: &StringRecord) -> Result<PriceBar, AlgolabError> {
        let row = row_number(record);

        Ok(PriceBar {
            timestamp: timestamp(record, self.timestamp, row)?,
            open: number(record, self.open, "open", row)?,
            high: number(record, self.high, "high", row)?,
            low: number(record, self.low, "low", row)?,
            close: number(record, self.close, "close", row)?,
            volume: number(record, self.volume, "volume", row)?,
        })
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<fs::File>, AlgolabError> {
    let file = fs::File::open(path).map_err(|e| AlgolabError::Data {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;
    Ok(csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file))
}

fn read_headers(rdr: &mut csv::Reader<fs::File>) -> Result<StringRecord, AlgolabError> {
    rdr.headers().cloned().map_err(csv_error)
}

fn csv_error(e: csv::Error) -> AlgolabError {
    AlgolabError::Data {
        reason: format!("CSV parse error: {}", e),
    }
}

/// Index of the first header matching one of `names`, case-insensitively.
fn find_column(headers: &StringRecord, names: &[&str]) -> Result<usize, AlgolabError> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
        .ok_or_else(|| AlgolabError::MissingField {
            row: 1,
            field: names.join(" or "),
        })
}

/// 1-based line number in the file; the header is line 1.
fn row_number(record: &StringRecord) -> usize {
    record.position().map(|p| p.line() as usize).unwrap_or(0)
}

fn cell<'r>(
    record: &'r StringRecord,
    index: usize,
    field: &str,
    row: usize,
) -> Result<&'r str, AlgolabError> {
    match record.get(index) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AlgolabError::MissingField {
            row,
            field: field.to_string(),
        }),
    }
}

fn number(record: &StringRecord, index: usize, field: &str, row: usize) -> Result<f64, AlgolabError> {
    let raw = cell(record, index, field, row)?;
    raw.parse::<f64>().map_err(|e| AlgolabError::InvalidField {
        row,
        field: field.to_string(),
        reason: format!("{raw:?}: {e}"),
    })
}

fn timestamp(record: &StringRecord, index: usize, row: usize) -> Result<NaiveDateTime, AlgolabError> {
    let raw = cell(record, index, "timestamp", row)?;
    parse_timestamp(raw).ok_or_else(|| AlgolabError::InvalidField {
        row,
        field: "timestamp".into(),
        reason: format!("unrecognized timestamp {raw:?}"),
    })
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, AlgolabError> {
        let path = self.csv_path(symbol);
        let mut rdr = open_reader(&path)?;
        let columns = Columns::locate(&read_headers(&mut rdr)?)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(csv_error)?;
            let bar = columns.parse(&record)?;
            let date = bar.timestamp.date();

            if start_date.is_some_and(|s| date < s) || end_date.is_some_and(|e| date > e) {
                continue;
            }
            bars.push(bar);
        }

        debug!(symbol, bars = bars.len(), path = %path.display(), "loaded bars");
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, AlgolabError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| AlgolabError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| AlgolabError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

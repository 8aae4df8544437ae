use crate::error::DataError;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use core_types::Candle;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Epoch values at or above this are read as milliseconds, below as seconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

#[derive(Debug, Deserialize)]
struct OhlcvRecord {
    timestamp: String,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: String,
}

/// What `prepare_candles` found and removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataQualityReport {
    pub rows_read: usize,
    pub duplicates: usize,
    pub out_of_order: usize,
    pub invalid: usize,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,
}

impl DataQualityReport {
    pub fn rows_kept(&self) -> usize {
        self.rows_read - self.duplicates - self.invalid
    }
}

/// Reads every row of an OHLCV CSV as-is, in file order.
pub fn read_candles<R: Read>(reader: R) -> Result<Vec<Candle>, DataError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut candles = Vec::new();

    for (index, record) in csv_reader.deserialize::<OhlcvRecord>().enumerate() {
        // Header is line 1.
        let row = index + 2;
        let record = record?;
        candles.push(Candle {
            timestamp: parse_timestamp(&record.timestamp)
                .ok_or_else(|| DataError::Parse {
                    row,
                    message: format!("unrecognised timestamp '{}'", record.timestamp),
                })?,
            open: parse_decimal(&record.open, "open", row)?,
            high: parse_decimal(&record.high, "high", row)?,
            low: parse_decimal(&record.low, "low", row)?,
            close: parse_decimal(&record.close, "close", row)?,
            volume: parse_decimal(&record.volume, "volume", row)?,
        });
    }

    Ok(candles)
}

/// Loads a CSV file and returns the cleaned candle series with its quality report.
pub fn load_candles_csv(path: &Path) -> Result<(Vec<Candle>, DataQualityReport), DataError> {
    let file = File::open(path).map_err(|source| DataError::Io { path: path.to_path_buf(), source })?;
    let raw = read_candles(file)?;
    let (candles, report) = prepare_candles(raw);

    if report.duplicates > 0 || report.out_of_order > 0 || report.invalid > 0 {
        tracing::warn!(
            path = %path.display(),
            duplicates = report.duplicates,
            out_of_order = report.out_of_order,
            invalid = report.invalid,
            "Candle file needed cleaning"
        );
    }
    tracing::info!(path = %path.display(), candles = candles.len(), "Loaded candles");

    Ok((candles, report))
}

/// Orders candles by time, keeps the first candle seen for each timestamp and
/// drops rows that cannot be traded on (non-positive close, negative values,
/// or a high below the low).
pub fn prepare_candles(raw: Vec<Candle>) -> (Vec<Candle>, DataQualityReport) {
    let mut report = DataQualityReport { rows_read: raw.len(), ..Default::default() };

    report.out_of_order = raw.windows(2).filter(|w| w[1].timestamp < w[0].timestamp).count();

    let mut candles: Vec<Candle> = raw.into_iter().filter(is_plausible).collect();
    report.invalid = report.rows_read - candles.len();

    // Stable, so the earliest row for a timestamp survives the dedup.
    candles.sort_by_key(|c| c.timestamp);
    let before = candles.len();
    candles.dedup_by_key(|c| c.timestamp);
    report.duplicates = before - candles.len();

    report.first_timestamp = candles.first().map(|c| c.timestamp);
    report.last_timestamp = candles.last().map(|c| c.timestamp);

    (candles, report)
}

/// Candles within `[start, end]`; either bound may be open.
pub fn filter_range(
    candles: &[Candle],
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Vec<Candle> {
    candles
        .iter()
        .filter(|c| start.is_none_or(|s| c.timestamp >= s))
        .filter(|c| end.is_none_or(|e| c.timestamp <= e))
        .cloned()
        .collect()
}

fn is_plausible(candle: &Candle) -> bool {
    candle.close > Decimal::ZERO
        && candle.high >= candle.low
        && !candle.open.is_sign_negative()
        && !candle.low.is_sign_negative()
        && !candle.volume.is_sign_negative()
}

fn parse_decimal(value: &str, field: &str, row: usize) -> Result<Decimal, DataError> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|e| DataError::Parse { row, message: format!("invalid {field} '{value}': {e}") })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(epoch) = value.parse::<i64>() {
        return if epoch >= EPOCH_MILLIS_THRESHOLD {
            Utc.timestamp_millis_opt(epoch).single()
        } else {
            Utc.timestamp_opt(epoch, 0).single()
        };
    }
    None
}

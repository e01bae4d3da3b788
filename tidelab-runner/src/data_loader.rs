//! CSV bar loading and validation.
//!
//! The engine assumes it is always handed a valid, ordered, fully-fetched
//! bar sequence, so every check lives here: timestamps must be strictly
//! increasing, OHLC must be internally consistent, and prices must be
//! finite. A file that fails any check is rejected with a descriptive
//! error, never passed through partially.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;
use tidelab_core::domain::Bar;

/// Errors from the CSV loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to parse '{path}' row {row}: {source}")]
    Csv {
        path: String,
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("'{path}' row {row}: timestamp {timestamp} is not a valid ms epoch")]
    BadTimestamp {
        path: String,
        row: usize,
        timestamp: i64,
    },

    #[error("'{path}' row {row}: timestamps not strictly increasing ({prev} >= {next})")]
    OutOfOrder {
        path: String,
        row: usize,
        prev: i64,
        next: i64,
    },

    #[error("'{path}' row {row}: inconsistent OHLC (open={open}, high={high}, low={low}, close={close})")]
    BadOhlc {
        path: String,
        row: usize,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },

    #[error("'{path}' contains no bars")]
    Empty { path: String },
}

/// One CSV row: `timestamp,open,high,low,close,volume`, timestamp in
/// milliseconds since the epoch.
#[derive(Debug, Deserialize)]
struct CsvBar {
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Load and validate one symbol's bars from a CSV file.
pub fn load_bars_csv(path: &Path, symbol: &str) -> Result<Vec<Bar>, LoadError> {
    let display = path.display().to_string();
    let mut reader = csv::Reader::from_path(path).map_err(|source| LoadError::Open {
        path: display.clone(),
        source,
    })?;

    let mut bars = Vec::new();
    let mut prev_ts: Option<i64> = None;

    for (row, record) in reader.deserialize::<CsvBar>().enumerate() {
        // Row numbers are 1-based and skip the header.
        let row = row + 1;
        let raw = record.map_err(|source| LoadError::Csv {
            path: display.clone(),
            row,
            source,
        })?;

        let timestamp = parse_timestamp(raw.timestamp).ok_or(LoadError::BadTimestamp {
            path: display.clone(),
            row,
            timestamp: raw.timestamp,
        })?;

        if let Some(prev) = prev_ts {
            if raw.timestamp <= prev {
                return Err(LoadError::OutOfOrder {
                    path: display,
                    row,
                    prev,
                    next: raw.timestamp,
                });
            }
        }
        prev_ts = Some(raw.timestamp);

        let bar = Bar {
            symbol: symbol.to_string(),
            timestamp,
            open: raw.open,
            high: raw.high,
            low: raw.low,
            close: raw.close,
            volume: raw.volume,
        };
        if !bar.is_sane() {
            return Err(LoadError::BadOhlc {
                path: display,
                row,
                open: raw.open,
                high: raw.high,
                low: raw.low,
                close: raw.close,
            });
        }
        bars.push(bar);
    }

    if bars.is_empty() {
        return Err(LoadError::Empty { path: display });
    }
    Ok(bars)
}

fn parse_timestamp(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const HEADER: &str = "timestamp,open,high,low,close,volume\n";

    #[test]
    fn loads_valid_file() {
        let file = write_csv(&format!(
            "{HEADER}\
             1700000000000,100.0,105.0,99.0,102.0,1500.0\n\
             1700003600000,102.0,108.0,101.0,106.0,1800.0\n"
        ));
        let bars = load_bars_csv(file.path(), "BTCUSDT").unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].symbol, "BTCUSDT");
        assert_eq!(bars[0].close, 102.0);
        assert!(bars[1].timestamp > bars[0].timestamp);
    }

    #[test]
    fn rejects_out_of_order_timestamps() {
        let file = write_csv(&format!(
            "{HEADER}\
             1700003600000,100.0,105.0,99.0,102.0,1500.0\n\
             1700000000000,102.0,108.0,101.0,106.0,1800.0\n"
        ));
        let err = load_bars_csv(file.path(), "BTCUSDT").unwrap_err();
        assert!(matches!(err, LoadError::OutOfOrder { row: 2, .. }));
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let file = write_csv(&format!(
            "{HEADER}\
             1700000000000,100.0,105.0,99.0,102.0,1500.0\n\
             1700000000000,102.0,108.0,101.0,106.0,1800.0\n"
        ));
        assert!(matches!(
            load_bars_csv(file.path(), "BTCUSDT").unwrap_err(),
            LoadError::OutOfOrder { .. }
        ));
    }

    #[test]
    fn rejects_inconsistent_ohlc() {
        // High below low.
        let file = write_csv(&format!(
            "{HEADER}1700000000000,100.0,99.0,105.0,102.0,1500.0\n"
        ));
        assert!(matches!(
            load_bars_csv(file.path(), "BTCUSDT").unwrap_err(),
            LoadError::BadOhlc { row: 1, .. }
        ));
    }

    #[test]
    fn rejects_empty_file() {
        let file = write_csv(HEADER);
        assert!(matches!(
            load_bars_csv(file.path(), "BTCUSDT").unwrap_err(),
            LoadError::Empty { .. }
        ));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = load_bars_csv(Path::new("/nonexistent/bars.csv"), "BTCUSDT").unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }

    #[test]
    fn rejects_malformed_row() {
        let file = write_csv(&format!("{HEADER}1700000000000,abc,105.0,99.0,102.0,1500.0\n"));
        assert!(matches!(
            load_bars_csv(file.path(), "BTCUSDT").unwrap_err(),
            LoadError::Csv { row: 1, .. }
        ));
    }
}

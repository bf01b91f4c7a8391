use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, ArrayRef, AsArray, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray, TimestampMicrosecondArray, TimestampMillisecondArray,
    TimestampNanosecondArray, TimestampSecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{AlertLevel, EarthquakeCatalog, Event};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an earthquake catalog from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.xls` – delimited text with a header row (the published
///   cleaned dataset ships as CSV under an `.xls` name)
/// * `.json`         – `[{ "magnitude": 5.1, "continent": "Asia", ... }, ...]`
/// * `.parquet`      – flat columns named like the CSV header
pub fn load_file(path: &Path) -> Result<EarthquakeCatalog> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (events, skipped) = match ext.as_str() {
        "csv" | "xls" | "txt" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    if skipped > 0 {
        log::warn!(
            "Skipped {skipped} rows without a numeric magnitude in {}",
            path.display()
        );
    }
    Ok(EarthquakeCatalog::from_events(events))
}

// ---------------------------------------------------------------------------
// Row schema shared by the text formats
// ---------------------------------------------------------------------------

/// Parsed rows plus the number of rows dropped for lacking a magnitude.
type Rows = (Vec<Event>, usize);

/// One record as it appears in CSV / JSON.  Extra columns are ignored.
/// A blank or null magnitude reads as `None`; `nan` parses to NaN.
#[derive(Debug, Deserialize)]
struct RawRecord {
    magnitude: Option<f64>,
    latitude: f64,
    longitude: f64,
    continent: String,
    date: String,
    #[serde(default)]
    place: Option<String>,
    #[serde(default)]
    alert: Option<String>,
}

impl RawRecord {
    /// `Ok(None)` for a row without a finite magnitude, which no filter
    /// could ever keep.
    fn into_event(self) -> Result<Option<Event>> {
        let Some(magnitude) = self.magnitude.filter(|m| m.is_finite()) else {
            return Ok(None);
        };
        let date = parse_date(&self.date)?;
        let alert = match self.alert.as_deref() {
            Some(raw) => AlertLevel::parse_cell(raw)?,
            None => None,
        };
        Ok(Some(Event {
            magnitude,
            latitude: self.latitude,
            longitude: self.longitude,
            continent: self.continent,
            date,
            place: self.place.unwrap_or_default(),
            alert,
        }))
    }
}

fn collect_rows(rows: impl IntoIterator<Item = Result<Option<Event>>>) -> Result<Rows> {
    let mut events = Vec::new();
    let mut skipped = 0;
    for row in rows {
        match row? {
            Some(event) => events.push(event),
            None => skipped += 1,
        }
    }
    Ok((events, skipped))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row naming at least `magnitude`, `latitude`,
/// `longitude`, `continent`, `date`, `place`, `alert`.
fn load_csv(path: &Path) -> Result<Rows> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?;
    if !headers.iter().any(|h| h == "magnitude") {
        bail!("CSV missing 'magnitude' column");
    }

    collect_rows(
        reader
            .deserialize::<RawRecord>()
            .enumerate()
            .map(|(row_no, result)| {
                result
                    .map_err(anyhow::Error::from)
                    .and_then(RawRecord::into_event)
                    .with_context(|| format!("CSV row {row_no}"))
            }),
    )
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn load_json(path: &Path) -> Result<Rows> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let records: Vec<RawRecord> = serde_json::from_str(&text).context("parsing JSON")?;

    collect_rows(
        records
            .into_iter()
            .enumerate()
            .map(|(i, raw)| raw.into_event().with_context(|| format!("JSON record {i}"))),
    )
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse a date cell into a naive (UTC) timestamp.
///
/// Accepts RFC 3339, the common `YYYY-MM-DD HH:MM:SS` variants and bare
/// dates, which land at midnight.
pub fn parse_date(raw: &str) -> Result<NaiveDateTime> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d.and_time(chrono::NaiveTime::MIN));
        }
    }
    bail!("unparseable date '{raw}'")
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per event attribute.
///
/// * numeric columns may be Float64, Float32, Int32 or Int64
/// * `date` may be Utf8, Date32 or any Timestamp unit
/// * `place` and `alert` may be null
/// * rows whose `magnitude` is null or NaN are skipped
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Rows> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut events = Vec::new();
    let mut skipped = 0;
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        skipped += read_batch(&batch, &mut events)?;
    }
    Ok((events, skipped))
}

fn required_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

fn optional_column<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a ArrayRef> {
    batch.schema().index_of(name).ok().map(|idx| batch.column(idx))
}

/// Append the batch's rows to `events`; returns how many rows were skipped.
fn read_batch(batch: &RecordBatch, events: &mut Vec<Event>) -> Result<usize> {
    let magnitude = required_column(batch, "magnitude")?;
    let latitude = required_column(batch, "latitude")?;
    let longitude = required_column(batch, "longitude")?;
    let continent = required_column(batch, "continent")?;
    let date = required_column(batch, "date")?;
    let place = optional_column(batch, "place");
    let alert = optional_column(batch, "alert");

    let mut skipped = 0;
    for row in 0..batch.num_rows() {
        if magnitude.is_null(row) {
            skipped += 1;
            continue;
        }
        let magnitude = extract_f64(magnitude, row)
            .with_context(|| format!("Row {row}: failed to read 'magnitude'"))?;
        if !magnitude.is_finite() {
            skipped += 1;
            continue;
        }
        let alert = match alert.and_then(|col| extract_string(col, row)) {
            Some(raw) => AlertLevel::parse_cell(&raw).with_context(|| format!("Row {row}"))?,
            None => None,
        };

        events.push(Event {
            magnitude,
            latitude: extract_f64(latitude, row)
                .with_context(|| format!("Row {row}: failed to read 'latitude'"))?,
            longitude: extract_f64(longitude, row)
                .with_context(|| format!("Row {row}: failed to read 'longitude'"))?,
            continent: extract_string(continent, row)
                .with_context(|| format!("Row {row}: 'continent' is null"))?,
            date: extract_datetime(date, row)
                .with_context(|| format!("Row {row}: failed to read 'date'"))?,
            place: place.and_then(|col| extract_string(col, row)).unwrap_or_default(),
            alert,
        });
    }
    Ok(skipped)
}

// -- Parquet / Arrow helpers --

fn extract_f64(col: &ArrayRef, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in numeric column");
    }
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        Ok(arr.value(row) as f64)
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Ok(arr.value(row) as f64)
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Ok(arr.value(row) as f64)
    } else {
        bail!("expected a numeric column, got {:?}", col.data_type())
    }
}

fn extract_string(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| s.value(row).to_string()),
        DataType::LargeUtf8 => col
            .as_any()
            .downcast_ref::<LargeStringArray>()
            .map(|s| s.value(row).to_string()),
        DataType::Dictionary(_, _) => {
            let dict = col.as_any_dictionary_opt()?;
            let key = dict.normalized_keys()[row];
            let values = dict.values();
            extract_string(values, key)
        }
        _ => None,
    }
}

fn extract_datetime(col: &ArrayRef, row: usize) -> Result<NaiveDateTime> {
    if col.is_null(row) {
        bail!("null date");
    }
    let any = col.as_any();
    let converted = match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            let raw = extract_string(col, row).context("date column is not text")?;
            return parse_date(&raw);
        }
        DataType::Date32 => any
            .downcast_ref::<Date32Array>()
            .and_then(|a| a.value_as_datetime(row)),
        DataType::Timestamp(TimeUnit::Second, _) => any
            .downcast_ref::<TimestampSecondArray>()
            .and_then(|a| a.value_as_datetime(row)),
        DataType::Timestamp(TimeUnit::Millisecond, _) => any
            .downcast_ref::<TimestampMillisecondArray>()
            .and_then(|a| a.value_as_datetime(row)),
        DataType::Timestamp(TimeUnit::Microsecond, _) => any
            .downcast_ref::<TimestampMicrosecondArray>()
            .and_then(|a| a.value_as_datetime(row)),
        DataType::Timestamp(TimeUnit::Nanosecond, _) => any
            .downcast_ref::<TimestampNanosecondArray>()
            .and_then(|a| a.value_as_datetime(row)),
        other => bail!("unsupported date column type {other:?}"),
    };
    converted.context("date out of range")
}

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use thiserror::Error;

use super::model::{FieldValue, Listing, ListingDataset, ReviewCategory, ReviewScores};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fatal load-time problems. Nothing is rendered when one of these occurs.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("no listing has a parseable price ({dropped} row(s) dropped)")]
    NoPricedListings { dropped: usize },
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

const ID: &str = "id";
const NAME: &str = "name";
const PRICE: &str = "price";
const NEIGHBOURHOOD: &str = "neighbourhood_cleansed";
const ROOM_TYPE: &str = "room_type";
const REVIEWS_PER_MONTH: &str = "reviews_per_month";
const HOST_ACCEPTANCE_RATE: &str = "host_acceptance_rate";

/// Columns every listings file must carry.
pub fn required_columns() -> Vec<&'static str> {
    let mut cols = vec![
        ID,
        NAME,
        PRICE,
        NEIGHBOURHOOD,
        ROOM_TYPE,
        REVIEWS_PER_MONTH,
        HOST_ACCEPTANCE_RATE,
    ];
    cols.extend(ReviewCategory::ALL.iter().map(|c| c.column()));
    cols
}

/// Position of each required column in the source header.
struct ColumnIndex {
    positions: Vec<usize>,
}

impl ColumnIndex {
    fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self, LoadError> {
        let mut positions = Vec::new();
        let mut missing = Vec::new();
        for col in required_columns() {
            match headers.iter().position(|h| h.as_ref().trim() == col) {
                Some(pos) => positions.push(pos),
                None => missing.push(col.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(ColumnIndex { positions })
        } else {
            Err(LoadError::MissingColumns(missing))
        }
    }

    /// Source position of the `n`-th required column.
    fn at(&self, n: usize) -> usize {
        self.positions[n]
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listings dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – comma-delimited text with a header row
/// * `.tsv`     – tab-delimited text with a header row
/// * `.parquet` – Parquet file written by Pandas or Polars
pub fn load_file(path: &Path) -> Result<ListingDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" | "txt" => load_delimited(open(path)?, b',')?,
        "tsv" => load_delimited(open(path)?, b'\t')?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    };

    log::info!(
        "Loaded {} listings from {} ({} dropped for unparseable price)",
        dataset.len(),
        path.display(),
        dataset.dropped_rows
    );
    Ok(dataset)
}

fn open(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

/// Parse a currency string: `$` and `,` are stripped before parsing.
/// Non-finite and negative prices are rejected.
pub fn parse_price(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
    let price = cleaned.trim().parse::<f64>().ok()?;
    (price.is_finite() && price >= 0.0).then_some(price)
}

fn price_from_cell(cell: &FieldValue) -> Option<f64> {
    match cell {
        FieldValue::String(s) => parse_price(s),
        other => other.as_f64().filter(|p| p.is_finite() && *p >= 0.0),
    }
}

/// Parse a percentage such as `"95%"` into `95.0`.
pub fn parse_percentage(cell: &FieldValue) -> Option<f64> {
    match cell {
        FieldValue::String(s) => {
            let v = s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?;
            (!v.is_nan()).then_some(v)
        }
        other => other.as_f64(),
    }
}

/// Build a listing from the required cells, in [`required_columns`] order.
/// Returns `None` when the price does not parse.
fn listing_from_cells(mut cells: Vec<FieldValue>) -> Option<Listing> {
    let price = price_from_cell(&cells[2])?;
    let mut take = |n: usize| std::mem::replace(&mut cells[n], FieldValue::Null);

    let id = take(0).as_text().unwrap_or_default();
    let name = take(1).as_text().unwrap_or_default();
    let neighbourhood = take(3).as_text();
    let room_type = take(4).as_text();
    let reviews_per_month = take(5);
    let host_acceptance_rate = take(6);

    let mut review_scores = ReviewScores::default();
    for (offset, category) in ReviewCategory::ALL.iter().enumerate() {
        review_scores.set(*category, take(7 + offset));
    }

    Some(Listing {
        id,
        name,
        price,
        neighbourhood,
        room_type,
        reviews_per_month,
        host_acceptance_rate,
        review_scores,
    })
}

/// Collects cleaned listings and counts dropped rows.
#[derive(Default)]
struct ListingSink {
    listings: Vec<Listing>,
    dropped: usize,
}

impl ListingSink {
    fn push(&mut self, cells: Vec<FieldValue>) {
        match listing_from_cells(cells) {
            Some(listing) => self.listings.push(listing),
            None => self.dropped += 1,
        }
    }

    fn finish(self) -> Result<ListingDataset, LoadError> {
        if self.listings.is_empty() {
            return Err(LoadError::NoPricedListings {
                dropped: self.dropped,
            });
        }
        if self.dropped > 0 {
            log::warn!("Dropped {} row(s) with unparseable price", self.dropped);
        }
        Ok(ListingDataset::from_listings(self.listings, self.dropped))
    }
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names; the required columns may appear in any
/// order and extra columns are ignored.  Identifier and text columns are kept
/// as trimmed text, the rest go through [`FieldValue::guess`].
pub fn load_delimited<R: Read>(input: R, delimiter: u8) -> Result<ListingDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let index = ColumnIndex::resolve(&headers)?;

    let verbatim = [0, 1, 2, 3, 4, 6];
    let mut sink = ListingSink::default();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("row {row_no}"))?;
        let cells = (0..index.positions.len())
            .map(|n| {
                let raw = record.get(index.at(n)).unwrap_or("");
                if raw.trim().is_empty() {
                    FieldValue::Null
                } else if verbatim.contains(&n) {
                    FieldValue::String(raw.trim().to_string())
                } else {
                    FieldValue::guess(raw)
                }
            })
            .collect();
        sink.push(cells);
    }

    Ok(sink.finish()?)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the same columns as the CSV export.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`); price may be stored either as the
/// original currency string or as a float.
fn load_parquet(path: &Path) -> Result<ListingDataset> {
    let file = open(path)?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let index = {
        let names: Vec<&String> = builder.schema().fields().iter().map(|f| f.name()).collect();
        ColumnIndex::resolve(&names)?
    };
    let reader = builder.build().context("building parquet reader")?;

    let mut sink = ListingSink::default();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = (0..index.positions.len())
                .map(|n| extract_field_value(batch.column(index.at(n)), row))
                .collect();
            sink.push(cells);
        }
    }

    Ok(sink.finish()?)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_field_value(col: &Arc<dyn Array>, row: usize) -> FieldValue {
    if col.is_null(row) {
        return FieldValue::Null;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Utf8 => FieldValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => FieldValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map_or(FieldValue::Null, |a| FieldValue::Integer(i64::from(a.value(row)))),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map_or(FieldValue::Null, |a| FieldValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map_or(FieldValue::Null, |a| FieldValue::Float(f64::from(a.value(row)))),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map_or(FieldValue::Null, |a| FieldValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map_or(FieldValue::Null, |a| FieldValue::Bool(a.value(row))),
        other => {
            log::debug!("Unsupported parquet column type {other:?}; treating as null");
            FieldValue::Null
        }
    }
}

use polars::prelude::*;
use std::path::Path;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;
use tracing::debug;

use crate::error::LoadError;
use crate::series::{PriceRecord, PriceSeries, CANONICAL_COLUMNS};

/// ISO dates, as found in files downloaded from the quote history page.
const DOWNLOADED_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// "Apr 15, 2024" and "Apr 5, 2024", as found in tables copied from the history page.
const PASTED_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:short case_sensitive:false] [day padding:none], [year]");
const PASTED_DATE_PADDED: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:short case_sensitive:false] [day], [year]");

/// The layout of a price history file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated with a canonical header row and ISO dates, oldest or newest first.
    Downloaded,
    /// Tab-separated without a header, thousands separators and "Mon DD, YYYY" dates,
    /// in any row order.
    Pasted,
}

impl SourceFormat {
    fn separator(self) -> u8 {
        match self {
            SourceFormat::Downloaded => b',',
            SourceFormat::Pasted => b'\t',
        }
    }

    fn has_header(self) -> bool {
        matches!(self, SourceFormat::Downloaded)
    }
}

/// Loads a price history file into a `PriceSeries` named after the file stem.
///
/// Every column is read as text and coerced by [`parse_price_df`].
///
/// # Errors
/// Returns an error if the file cannot be read, a required column is missing,
/// or any cell cannot be coerced.
pub fn load(path: impl AsRef<Path>, format: SourceFormat) -> Result<PriceSeries, LoadError> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_has_header(format.has_header())
        // Zero inference rows leaves every column as String.
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_separator(format.separator()))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    debug!(path = %path.display(), rows = df.height(), ?format, "read price file");

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_price_df(&df, name, format)
}

/// Parses a text-typed price DataFrame into a `PriceSeries`.
///
/// `Downloaded` frames are looked up by canonical column name, `Pasted` frames
/// are read positionally. Records of both are sorted ascending by date.
///
/// # Errors
/// Returns an error if a column is missing or not text, or if a cell is malformed.
pub fn parse_price_df(
    df: &DataFrame,
    name: impl Into<std::sync::Arc<str>>,
    format: SourceFormat,
) -> Result<PriceSeries, LoadError> {
    let mut columns = Vec::with_capacity(CANONICAL_COLUMNS.len());
    for (idx, col_name) in CANONICAL_COLUMNS.iter().enumerate() {
        let column = match format {
            SourceFormat::Downloaded => df.column(col_name).ok(),
            SourceFormat::Pasted => df.select_at_idx(idx),
        }
        .ok_or_else(|| LoadError::MissingColumn((*col_name).to_string()))?;
        columns.push(column.str()?);
    }

    let date_format = match format {
        SourceFormat::Downloaded => DOWNLOADED_DATE,
        SourceFormat::Pasted => PASTED_DATE,
    };

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let cell = |col: usize| columns[col].get(row).unwrap_or("").trim();

        let date = parse_date(cell(0), date_format, format)
            .ok_or_else(|| LoadError::MalformedDate {
                row,
                value: cell(0).to_string(),
            })?;
        let price = |col: usize| parse_price(cell(col), row, CANONICAL_COLUMNS[col]);
        records.push(PriceRecord::new(
            date,
            price(1)?,
            price(2)?,
            price(3)?,
            price(4)?,
            price(5)?,
            parse_number::<i64>(cell(6), row, CANONICAL_COLUMNS[6])?,
        ));
    }

    let series = PriceSeries::from_unsorted(name, records)?;
    debug!(name = series.name(), records = series.len(), "parsed price series");
    Ok(series)
}

fn parse_date(
    value: &str,
    date_format: &[BorrowedFormatItem<'_>],
    format: SourceFormat,
) -> Option<Date> {
    Date::parse(value, date_format)
        .or_else(|e| match format {
            SourceFormat::Pasted => Date::parse(value, PASTED_DATE_PADDED),
            SourceFormat::Downloaded => Err(e),
        })
        .ok()
}

/// Parses a price. "NaN" and "inf" parse as `f64` but are not prices.
fn parse_price(value: &str, row: usize, column: &'static str) -> Result<f64, LoadError> {
    let price = parse_number::<f64>(value, row, column)?;
    if !price.is_finite() {
        return Err(LoadError::MalformedNumber {
            row,
            column,
            value: value.to_string(),
        });
    }
    Ok(price)
}

/// Parses a number, dropping thousands separators first.
fn parse_number<T: std::str::FromStr>(
    value: &str,
    row: usize,
    column: &'static str,
) -> Result<T, LoadError> {
    value
        .replace(',', "")
        .parse::<T>()
        .map_err(|_| LoadError::MalformedNumber {
            row,
            column,
            value: value.to_string(),
        })
}

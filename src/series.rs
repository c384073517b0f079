use polars::prelude::*;
use std::sync::Arc;
use time::macros::date;
use time::Date;

use crate::error::LoadError;

/// Canonical column names shared by both source formats.
pub const CANONICAL_COLUMNS: [&str; 7] = [
    "Date",
    "Open",
    "High",
    "Low",
    "Close",
    "Adj Close",
    "Volume",
];

const UNIX_EPOCH: Date = date!(1970 - 01 - 01);

/// One row of a price table.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    /// 0-based position after sorting by date. Assigned by `PriceSeries::new`.
    pub ordinal: usize,
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: f64,
    pub volume: i64,
}

impl PriceRecord {
    pub fn new(
        date: Date,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        adjusted_close: f64,
        volume: i64,
    ) -> Self {
        PriceRecord {
            ordinal: 0,
            date,
            open,
            high,
            low,
            close,
            adjusted_close,
            volume,
        }
    }
}

/// A named price history, ascending by date with no duplicate dates.
///
/// The series is immutable once built; simulations borrow it and return
/// their own derived values.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    name: Arc<str>,
    records: Vec<PriceRecord>,
}

impl PriceSeries {
    /// Builds a series from records that are already in date order.
    ///
    /// Ordinals are re-derived from the record positions.
    ///
    /// # Errors
    /// Returns `LoadError::DuplicateDate` when two neighbours share a date and
    /// `LoadError::Unordered` when a date goes backwards.
    pub fn new(name: impl Into<Arc<str>>, mut records: Vec<PriceRecord>) -> Result<Self, LoadError> {
        for row in 1..records.len() {
            let (prev, curr) = (records[row - 1].date, records[row].date);
            if curr == prev {
                return Err(LoadError::DuplicateDate(curr));
            }
            if curr < prev {
                return Err(LoadError::Unordered { row, date: curr });
            }
        }
        for (ordinal, record) in records.iter_mut().enumerate() {
            record.ordinal = ordinal;
        }
        Ok(PriceSeries {
            name: name.into(),
            records,
        })
    }

    /// Sorts records ascending by date before building the series.
    pub fn from_unsorted(
        name: impl Into<Arc<str>>,
        mut records: Vec<PriceRecord>,
    ) -> Result<Self, LoadError> {
        records.sort_by_key(|r| r.date);
        Self::new(name, records)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the same records under another identifier.
    pub fn with_name(self, name: impl Into<Arc<str>>) -> Self {
        PriceSeries {
            name: name.into(),
            records: self.records,
        }
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dates(&self) -> Vec<Date> {
        self.records.iter().map(|r| r.date).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.open).collect()
    }

    /// Renders the series as the canonical table.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let records = &self.records;
        let float_column = |name: &str, f: fn(&PriceRecord) -> f64| {
            Column::new(name.into(), records.iter().map(f).collect::<Vec<f64>>())
        };
        DataFrame::new(vec![
            date_column("Date", records.iter().map(|r| r.date))?,
            float_column("Open", |r| r.open),
            float_column("High", |r| r.high),
            float_column("Low", |r| r.low),
            float_column("Close", |r| r.close),
            float_column("Adj Close", |r| r.adjusted_close),
            Column::new(
                "Volume".into(),
                records.iter().map(|r| r.volume).collect::<Vec<i64>>(),
            ),
        ])
    }
}

/// Builds a polars `Date` column (days since the Unix epoch).
pub(crate) fn date_column(name: &str, dates: impl Iterator<Item = Date>) -> PolarsResult<Column> {
    let days: Vec<i32> = dates
        .map(|d| (d - UNIX_EPOCH).whole_days() as i32)
        .collect();
    Column::new(name.into(), days).cast(&DataType::Date)
}

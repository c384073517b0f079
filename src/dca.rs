use polars::prelude::*;
use std::sync::Arc;
use time::Date;
use tracing::debug;

use crate::error::SimulationError;
use crate::series::{date_column, PriceSeries};

/// The result of buying a fixed amount of a series at every record's open price.
///
/// All vectors share the date axis of the source series, one entry per record.
#[derive(Debug, Clone, PartialEq)]
pub struct DcaTrace {
    pub name: Arc<str>,
    pub periodic_investment: f64,
    pub dates: Vec<Date>,
    pub shares_bought: Vec<f64>,
    pub cumulative_shares: Vec<f64>,
    /// Mark-to-market value of all shares held, at the record's open price.
    pub wallet_value: Vec<f64>,
}

impl DcaTrace {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Cash put in over the whole trace: one contribution per record.
    pub fn total_invested(&self) -> f64 {
        self.periodic_investment * self.len() as f64
    }

    pub fn final_wallet_value(&self) -> Option<f64> {
        self.wallet_value.last().copied()
    }

    /// Renders the derived columns as their own table, keyed by date.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            date_column("Date", self.dates.iter().copied())?,
            Column::new("Shares bought".into(), self.shares_bought.as_slice()),
            Column::new("Cumulative shares".into(), self.cumulative_shares.as_slice()),
            Column::new("Wallet value".into(), self.wallet_value.as_slice()),
        ])
    }
}

/// Cash accumulated by saving the periodic amount instead of investing it.
#[derive(Debug, Clone, PartialEq)]
pub struct UninvestedCashTrace {
    pub dates: Vec<Date>,
    /// `periodic_investment * (i + 1)` for record `i`.
    pub amounts: Vec<f64>,
}

/// Simulates dollar-cost averaging over `series`.
///
/// One purchase of `periodic_investment` happens at every record's open price,
/// whatever the calendar spacing between records. The series is only read.
///
/// # Errors
/// Returns `SimulationError::InvalidInput` if the amount is not a positive finite
/// number or the series is empty, and `SimulationError::Division` if any open
/// price is not a positive finite number.
pub fn simulate_dca(
    series: &PriceSeries,
    periodic_investment: f64,
) -> Result<DcaTrace, SimulationError> {
    validate(series, periodic_investment)?;
    if let Some(bad) = series
        .records()
        .iter()
        .find(|r| !(r.open.is_finite() && r.open > 0.0))
    {
        return Err(SimulationError::Division {
            ordinal: bad.ordinal,
            date: bad.date,
            open: bad.open,
        });
    }

    let n = series.len();
    let mut dates = Vec::with_capacity(n);
    let mut shares_bought = Vec::with_capacity(n);
    let mut cumulative_shares = Vec::with_capacity(n);
    let mut wallet_value = Vec::with_capacity(n);

    let mut running_shares = 0.0;
    for record in series.records() {
        let bought = periodic_investment / record.open;
        running_shares += bought;
        dates.push(record.date);
        shares_bought.push(bought);
        cumulative_shares.push(running_shares);
        wallet_value.push(running_shares * record.open);
    }

    debug!(
        name = series.name(),
        records = n,
        periodic_investment,
        final_value = running_shares * series.records()[n - 1].open,
        "simulated DCA"
    );

    Ok(DcaTrace {
        name: Arc::from(series.name()),
        periodic_investment,
        dates,
        shares_bought,
        cumulative_shares,
        wallet_value,
    })
}

/// Builds the uninvested-cash reference on the date axis of `series`.
///
/// # Errors
/// Same parameter checks as [`simulate_dca`].
pub fn uninvested_cash(
    series: &PriceSeries,
    periodic_investment: f64,
) -> Result<UninvestedCashTrace, SimulationError> {
    validate(series, periodic_investment)?;
    Ok(UninvestedCashTrace {
        dates: series.dates(),
        amounts: (1..=series.len())
            .map(|periods| periodic_investment * periods as f64)
            .collect(),
    })
}

fn validate(series: &PriceSeries, periodic_investment: f64) -> Result<(), SimulationError> {
    if !(periodic_investment.is_finite() && periodic_investment > 0.0) {
        return Err(SimulationError::InvalidInput(format!(
            "periodic investment must be positive, got {periodic_investment}"
        )));
    }
    if series.is_empty() {
        return Err(SimulationError::InvalidInput(format!(
            "series {} is empty",
            series.name()
        )));
    }
    Ok(())
}

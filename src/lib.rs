pub mod comparator;
pub mod config;
pub mod dca;
pub mod error;
pub mod input_handler;
pub mod series;

pub use comparator::{compare_dca, compare_raw, ComparisonSet, Trace};
pub use config::ComparatorConfig;
pub use dca::{simulate_dca, uninvested_cash, DcaTrace, UninvestedCashTrace};
pub use error::{ComparisonError, ConfigError, Error, LoadError, Result, SimulationError};
pub use input_handler::{load, parse_price_df, SourceFormat};
pub use series::{PriceRecord, PriceSeries};

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, defaulting to this crate at info.
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "dca_backtester=info".into()),
        )
        .try_init();
}

#[cfg(feature = "python")]
mod python {
    use pyo3::prelude::*;
    use pyo3_polars::PyDataFrame;
    use std::fmt::Display;
    use std::path::PathBuf;

    use crate::{compare_dca, compare_raw, load, simulate_dca};
    use crate::{ComparatorConfig, PriceSeries, SourceFormat};

    fn value_error(context: &str, e: impl Display) -> PyErr {
        PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}: {}", context, e))
    }

    /// A price history loaded from a CSV file.
    #[pyclass(name = "Backtest")]
    struct PyBacktest {
        series: PriceSeries,
    }

    #[pymethods]
    impl PyBacktest {
        /// Load a downloaded CSV, or a tab-separated table copied from the
        /// quote history page when `is_copy_pasted_csv` is true.
        #[new]
        #[pyo3(signature = (csv_path, is_copy_pasted_csv = false))]
        fn new(csv_path: PathBuf, is_copy_pasted_csv: bool) -> PyResult<Self> {
            let format = if is_copy_pasted_csv {
                SourceFormat::Pasted
            } else {
                SourceFormat::Downloaded
            };
            let series = load(&csv_path, format)
                .map_err(|e| value_error("Error loading price data", e))?;
            Ok(PyBacktest { series })
        }

        #[getter]
        fn name(&self) -> String {
            self.series.name().to_string()
        }

        /// The canonical price table as a Polars DataFrame.
        fn frame(&self) -> PyResult<PyDataFrame> {
            let df = self
                .series
                .to_dataframe()
                .map_err(|e| value_error("Error building price frame", e))?;
            Ok(PyDataFrame(df))
        }

        /// DCA columns (shares bought, cumulative shares, wallet value) by date.
        fn dca(&self, monthly_invested: f64) -> PyResult<PyDataFrame> {
            let trace = simulate_dca(&self.series, monthly_invested)
                .map_err(|e| value_error("Error running DCA simulation", e))?;
            let df = trace
                .to_dataframe()
                .map_err(|e| value_error("Error building DCA frame", e))?;
            Ok(PyDataFrame(df))
        }
    }

    /// Compares several backtests; figures are returned as plotly JSON.
    #[pyclass(name = "BacktestComparator")]
    struct PyBacktestComparator {
        series: Vec<PriceSeries>,
        config: ComparatorConfig,
    }

    #[pymethods]
    impl PyBacktestComparator {
        #[new]
        fn new(backtests: Vec<PyRef<'_, PyBacktest>>) -> Self {
            PyBacktestComparator {
                series: backtests.iter().map(|b| b.series.clone()).collect(),
                config: ComparatorConfig::default(),
            }
        }

        fn raw_figure(&self) -> PyResult<String> {
            let set = compare_raw(&self.series, &self.config)
                .map_err(|e| value_error("Error comparing series", e))?;
            set.to_plotly_json()
                .map_err(|e| value_error("Error serializing figure", e))
        }

        fn dca_figure(&self, monthly_invested: f64) -> PyResult<String> {
            let set = compare_dca(&self.series, monthly_invested, &self.config)
                .map_err(|e| value_error("Error comparing DCA wallets", e))?;
            set.to_plotly_json()
                .map_err(|e| value_error("Error serializing figure", e))
        }
    }

    /// A Python module implemented in Rust using PyO3.
    #[pymodule]
    fn dca_backtester(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_class::<PyBacktest>()?;
        m.add_class::<PyBacktestComparator>()?;
        Ok(())
    }
}

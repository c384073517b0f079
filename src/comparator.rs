use serde_json::json;
use time::Date;
use tracing::{info, warn};

use crate::config::ComparatorConfig;
use crate::dca::{simulate_dca, uninvested_cash};
use crate::error::ComparisonError;
use crate::series::PriceSeries;

/// A named line ready for charting.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub name: String,
    pub x: Vec<Date>,
    pub y: Vec<f64>,
}

/// Traces plus the chart metadata a renderer needs.
///
/// Nothing here is drawn: callers hand the set to whichever renderer they use.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSet {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub traces: Vec<Trace>,
}

impl ComparisonSet {
    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.name == name)
    }

    /// Serializes the set as a plotly figure with one line per trace.
    pub fn to_plotly_json(&self) -> serde_json::Result<String> {
        let data: Vec<_> = self
            .traces
            .iter()
            .map(|t| {
                json!({
                    "type": "scatter",
                    "mode": "lines",
                    "name": t.name,
                    "x": t.x.iter().map(Date::to_string).collect::<Vec<_>>(),
                    "y": t.y,
                })
            })
            .collect();
        serde_json::to_string(&json!({
            "data": data,
            "layout": {
                "title": { "text": self.title },
                "xaxis": { "title": { "text": self.x_axis_title } },
                "yaxis": { "title": { "text": self.y_axis_title } },
            },
        }))
    }
}

/// Pairs each series' dates with its open prices.
///
/// Each trace keeps its own date axis; nothing is aligned or interpolated.
pub fn compare_raw(
    series_list: &[PriceSeries],
    config: &ComparatorConfig,
) -> Result<ComparisonSet, ComparisonError> {
    if series_list.is_empty() {
        return Err(ComparisonError::Empty);
    }
    let traces = series_list
        .iter()
        .map(|s| Trace {
            name: s.name().to_string(),
            x: s.dates(),
            y: s.opens(),
        })
        .collect();
    info!(series = series_list.len(), "assembled raw comparison");
    Ok(ComparisonSet {
        title: config.raw_title.clone(),
        x_axis_title: config.x_axis_title.clone(),
        y_axis_title: config.raw_y_axis_title.clone(),
        traces,
    })
}

/// Simulates DCA on every series and lines the wallets up against uninvested cash.
///
/// The uninvested-cash trace comes first and is built on the first series' axis.
/// Every other series must share that exact axis. Any failure aborts the whole
/// comparison.
pub fn compare_dca(
    series_list: &[PriceSeries],
    periodic_investment: f64,
    config: &ComparatorConfig,
) -> Result<ComparisonSet, ComparisonError> {
    let base = series_list.first().ok_or(ComparisonError::Empty)?;
    let base_dates = base.dates();
    for series in &series_list[1..] {
        if series.dates() != base_dates {
            warn!(
                name = series.name(),
                base = base.name(),
                "date axis differs from the uninvested cash reference"
            );
            return Err(ComparisonError::AxisMismatch {
                name: series.name().to_string(),
                base: base.name().to_string(),
                len: series.len(),
                base_len: base.len(),
            });
        }
    }

    let series_error = |series: &PriceSeries| {
        let name = series.name().to_string();
        move |source| ComparisonError::Series { name, source }
    };
    let wallets = series_list
        .iter()
        .map(|series| simulate_dca(series, periodic_investment).map_err(series_error(series)))
        .collect::<Result<Vec<_>, _>>()?;
    let cash = uninvested_cash(base, periodic_investment).map_err(series_error(base))?;
    let mut traces = Vec::with_capacity(series_list.len() + 1);
    traces.push(Trace {
        name: config.uninvested_cash_name.clone(),
        x: cash.dates,
        y: cash.amounts,
    });
    traces.extend(wallets.into_iter().map(|w| Trace {
        name: w.name.to_string(),
        x: w.dates,
        y: w.wallet_value,
    }));

    info!(
        series = series_list.len(),
        periodic_investment, "assembled DCA comparison"
    );
    Ok(ComparisonSet {
        title: config.dca_title.clone(),
        x_axis_title: config.x_axis_title.clone(),
        y_axis_title: config.dca_y_axis_title.clone(),
        traces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulationError;
    use crate::series::PriceRecord;
    use time::macros::date;

    fn make_series(name: &str, rows: &[(Date, f64)]) -> PriceSeries {
        let records = rows
            .iter()
            .map(|&(date, open)| PriceRecord::new(date, open, open, open, open, open, 0))
            .collect();
        PriceSeries::new(name, records).unwrap()
    }

    const JAN: Date = date!(2024 - 01 - 01);
    const FEB: Date = date!(2024 - 02 - 01);
    const MAR: Date = date!(2024 - 03 - 01);

    #[test]
    fn test_compare_raw_keeps_each_axis() {
        let a = make_series("A", &[(JAN, 1.0), (FEB, 2.0), (MAR, 3.0)]);
        let b = make_series("B", &[(FEB, 10.0)]);
        let set = compare_raw(&[a, b], &ComparatorConfig::default()).unwrap();

        assert_eq!(set.title, "Stock comparison");
        assert_eq!(set.y_axis_title, "Share value");
        assert_eq!(set.traces.len(), 2);
        assert_eq!(set.trace("A").unwrap().y, vec![1.0, 2.0, 3.0]);
        assert_eq!(set.trace("B").unwrap().x, vec![FEB]);
    }

    #[test]
    fn test_compare_dca_adds_cash_reference_first() {
        let a = make_series("A", &[(JAN, 100.0), (FEB, 50.0), (MAR, 200.0)]);
        let b = make_series("B", &[(JAN, 10.0), (FEB, 10.0), (MAR, 20.0)]);
        let set = compare_dca(&[a, b], 100.0, &ComparatorConfig::default()).unwrap();

        let names: Vec<&str> = set.traces.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Uninvested cash", "A", "B"]);
        assert_eq!(set.traces[0].y, vec![100.0, 200.0, 300.0]);
        assert_eq!(set.trace("A").unwrap().y, vec![100.0, 150.0, 700.0]);
        // B: 10 + 10 shares at 10, then 5 more; 25 shares at 20.
        assert_eq!(set.trace("B").unwrap().y, vec![100.0, 200.0, 500.0]);
        assert_eq!(set.title, "DCA comparison");
        assert_eq!(set.y_axis_title, "Wallet value");
    }

    #[test]
    fn test_compare_dca_rejects_differing_lengths() {
        let a = make_series("A", &[(JAN, 100.0), (FEB, 50.0), (MAR, 200.0)]);
        let b = make_series("B", &[(JAN, 10.0), (FEB, 10.0)]);
        let err = compare_dca(&[a, b], 100.0, &ComparatorConfig::default()).unwrap_err();
        match err {
            ComparisonError::AxisMismatch {
                name,
                base,
                len,
                base_len,
            } => {
                assert_eq!((name.as_str(), base.as_str()), ("B", "A"));
                assert_eq!((len, base_len), (2, 3));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_compare_dca_rejects_shifted_axis_of_equal_length() {
        let a = make_series("A", &[(JAN, 100.0), (FEB, 50.0)]);
        let b = make_series("B", &[(FEB, 10.0), (MAR, 10.0)]);
        assert!(matches!(
            compare_dca(&[a, b], 100.0, &ComparatorConfig::default()),
            Err(ComparisonError::AxisMismatch { .. })
        ));
    }

    #[test]
    fn test_compare_dca_fails_fast_on_bad_series() {
        let a = make_series("A", &[(JAN, 100.0), (FEB, 50.0)]);
        let b = make_series("B", &[(JAN, 10.0), (FEB, 0.0)]);
        let err = compare_dca(&[a, b], 100.0, &ComparatorConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ComparisonError::Series { ref name, source: SimulationError::Division { ordinal: 1, .. } }
                if name == "B"
        ));
    }

    #[test]
    fn test_compare_dca_invalid_amount_names_series() {
        let a = make_series("A", &[(JAN, 100.0)]);
        let err = compare_dca(&[a], 0.0, &ComparatorConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ComparisonError::Series { ref name, source: SimulationError::InvalidInput(_) }
                if name == "A"
        ));
    }

    #[test]
    fn test_compare_dca_empty_base_names_series() {
        let empty = PriceSeries::new("EMPTY", Vec::new()).unwrap();
        let err = compare_dca(&[empty], 100.0, &ComparatorConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ComparisonError::Series { ref name, source: SimulationError::InvalidInput(_) }
                if name == "EMPTY"
        ));
    }

    #[test]
    fn test_empty_list() {
        let cfg = ComparatorConfig::default();
        assert!(matches!(compare_raw(&[], &cfg), Err(ComparisonError::Empty)));
        assert!(matches!(compare_dca(&[], 100.0, &cfg), Err(ComparisonError::Empty)));
    }

    #[test]
    fn test_config_labels_are_used() {
        let cfg = ComparatorConfig {
            uninvested_cash_name: "Savings".into(),
            x_axis_title: "Month".into(),
            ..ComparatorConfig::default()
        };
        let a = make_series("A", &[(JAN, 100.0)]);
        let set = compare_dca(&[a], 100.0, &cfg).unwrap();
        assert_eq!(set.traces[0].name, "Savings");
        assert_eq!(set.x_axis_title, "Month");
    }

    #[test]
    fn test_plotly_json_layout() {
        let a = make_series("A", &[(JAN, 100.0), (FEB, 50.0)]);
        let set = compare_raw(&[a], &ComparatorConfig::default()).unwrap();
        let figure: serde_json::Value =
            serde_json::from_str(&set.to_plotly_json().unwrap()).unwrap();

        assert_eq!(figure["layout"]["title"]["text"], "Stock comparison");
        assert_eq!(figure["layout"]["xaxis"]["title"]["text"], "Date");
        let trace = &figure["data"][0];
        assert_eq!(trace["type"], "scatter");
        assert_eq!(trace["mode"], "lines");
        assert_eq!(trace["name"], "A");
        assert_eq!(trace["x"], json!(["2024-01-01", "2024-02-01"]));
        assert_eq!(trace["y"], json!([100.0, 50.0]));
    }
}

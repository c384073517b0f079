use dca_backtester::{compare_dca, compare_raw, init_tracing, simulate_dca};
use dca_backtester::{ComparatorConfig, PriceRecord, PriceSeries};
use time::macros::date;
use time::Duration;
use tracing::info;

/// Builds a four-weekly series whose open price is `open(period)`.
fn make_series(name: &str, open: impl Fn(usize) -> f64) -> dca_backtester::Result<PriceSeries> {
    let start = date!(2023 - 01 - 02);
    let records = (0..13)
        .map(|period| {
            let price = open(period);
            let date = start + Duration::weeks(4 * period as i64);
            PriceRecord::new(date, price, price, price, price, price, 1_000_000)
        })
        .collect();
    Ok(PriceSeries::new(name, records)?)
}

fn main() -> dca_backtester::Result<()> {
    init_tracing();

    // One steadily rising instrument and one that halves mid-year and recovers.
    let steady = make_series("STEADY", |p| 100.0 + 5.0 * p as f64)?;
    let dip = make_series("DIP", |p| {
        if p < 6 {
            100.0 - 10.0 * p as f64
        } else {
            40.0 + 10.0 * (p - 6) as f64
        }
    })?;
    let series = vec![steady, dip];

    for s in &series {
        let trace = simulate_dca(s, 100.0)?;
        info!(
            name = s.name(),
            invested = trace.total_invested(),
            final_value = trace.final_wallet_value(),
            "DCA summary"
        );
    }

    let config = ComparatorConfig::default();
    println!("{}", compare_raw(&series, &config)?.to_plotly_json()?);
    println!("{}", compare_dca(&series, 100.0, &config)?.to_plotly_json()?);
    Ok(())
}

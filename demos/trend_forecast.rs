//! Fit the chained trend model to a short series and print a ten-year forecast.
//!
//! Run from the project root:
//!   cargo run --example trend_forecast

use greening_trends::visualization::{
    print_forecast_table, print_model_summary, print_observation_table, print_trend_chart,
};
use greening_trends::{MissingDataPolicy, ObservationSeries, TrendAnalyzer};

fn main() {
    // Yearly means for a suburban tile; 2006 has no usable vegetation scene.
    let series = ObservationSeries::from_columns(
        &[2002, 2003, 2004, 2005, 2006, 2007, 2008, 2009],
        &[0.412, 0.418, 0.431, 0.427, f64::NAN, 0.446, 0.452, 0.449],
        &[31.8, 31.5, 31.1, 31.4, 30.9, 30.6, 30.2, 30.5],
    )
    .expect("years are strictly increasing");
    print_observation_table(&series);

    let analyzer = TrendAnalyzer::new(&series, MissingDataPolicy::Exclude);
    let report = analyzer
        .report(10, None, &[])
        .expect("enough complete years to fit");

    print_model_summary(&report.model);
    print_forecast_table(&report.forecast);
    print_trend_chart(&series, &report.forecast);

    // The same series with the legacy zero-fill handling, for comparison.
    match TrendAnalyzer::new(&series, MissingDataPolicy::ZeroFill).model() {
        Ok(model) => print_model_summary(&model),
        Err(e) => eprintln!("Zero-fill fit failed: {e}"),
    }
}

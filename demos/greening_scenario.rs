//! Sweep greening rates for a target year and export the full report.
//!
//! Run from the project root:
//!   cargo run --example greening_scenario

use greening_trends::io::{JsonFormat, SeriesWriter};
use greening_trends::visualization::print_scenario_table;
use greening_trends::{MissingDataPolicy, ObservationSeries, TrendAnalyzer};

fn main() {
    let series = ObservationSeries::from_columns(
        &[2002, 2003, 2004, 2005, 2006],
        &[0.50, 0.53, 0.55, 0.58, 0.60],
        &[20.1, 19.4, 19.0, 18.3, 18.0],
    )
    .expect("years are strictly increasing");

    let rates = [0.05, 0.10, 0.20, 0.30];
    let report = TrendAnalyzer::new(&series, MissingDataPolicy::Exclude)
        .report(5, Some(2015), &rates)
        .expect("series supports a fit");

    print_scenario_table(&report.scenarios);

    let out = std::env::temp_dir().join("greening_report.json");
    JsonFormat { pretty: true }
        .write_report(&report, &out)
        .expect("Failed to write report");
    println!("\nReport written to {}", out.display());
}

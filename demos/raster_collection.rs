//! Aggregate synthetic yearly rasters for a region into a series, then forecast.
//!
//! Run from the project root:
//!   cargo run --example raster_collection

use greening_trends::retrieval::InMemoryProvider;
use greening_trends::visualization::{print_forecast_table, print_observation_table};
use greening_trends::{
    collect_series, fit_and_forecast, Band, BoundingBox, MissingDataPolicy, RasterSample,
};

/// A 3x3 tile with one cloud-masked corner.
fn tile(year: i32, band: Band, value: f64) -> RasterSample {
    let mut values = vec![value; 9];
    values[8] = f64::NAN;
    RasterSample::new(year, band, 3, 3, values).expect("9 cells for a 3x3 tile")
}

fn main() {
    let mut provider = InMemoryProvider::new();
    for (i, year) in (2002..=2011).enumerate() {
        // 2005 has no temperature scene at all.
        provider.insert(tile(year, Band::Ndvi, 0.45 + 0.01 * i as f64));
        if year != 2005 {
            provider.insert(tile(year, Band::LstKelvin, 305.0 - 0.2 * i as f64));
        }
    }

    let bbox = BoundingBox::new(139.6, 35.6, 139.8, 35.8).expect("valid region");
    let series = collect_series(&provider, &bbox, 2002, 10, MissingDataPolicy::Exclude)
        .expect("rasters available");
    println!("Collected {} years for {bbox}", series.len());
    print_observation_table(&series);

    let forecast =
        fit_and_forecast(&series, 5, MissingDataPolicy::Exclude).expect("series supports a fit");
    print_forecast_table(&forecast);
}

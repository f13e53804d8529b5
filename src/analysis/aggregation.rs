use tracing::warn;

use crate::analysis::MissingDataPolicy;
use crate::error::TrendError;
use crate::models::{Band, Observation, ObservationSeries, RasterSample};

/// Spatial mean of a raster over its finite cells, in Celsius for temperature bands.
///
/// Returns `None` when the raster is absent or carries no finite cell.
pub fn spatial_mean(raster: Option<&RasterSample>) -> Option<f64> {
    let raster = raster?;
    match raster.band {
        Band::LstKelvin => raster.to_celsius().finite_mean(),
        Band::Ndvi => raster.finite_mean(),
    }
}

/// Reduce one year's pair of rasters to an observation.
///
/// An absent raster keeps its year in place; its value is taken from the policy
/// (NaN for `Exclude`, 0 for `ZeroFill`).
pub fn aggregate_year(
    year: i32,
    ndvi: Option<&RasterSample>,
    lst: Option<&RasterSample>,
    policy: MissingDataPolicy,
) -> Observation {
    Observation::new(
        year,
        spatial_mean(ndvi).unwrap_or_else(|| policy.missing_value()),
        spatial_mean(lst).unwrap_or_else(|| policy.missing_value()),
    )
}

/// Assemble an index-aligned observation series from per-year rasters.
///
/// Fails with `AllYearsMissing` when no year has either raster.
pub fn build_series(
    years: &[i32],
    ndvi: &[Option<RasterSample>],
    lst: &[Option<RasterSample>],
    policy: MissingDataPolicy,
) -> Result<ObservationSeries, TrendError> {
    if years.len() != ndvi.len() || years.len() != lst.len() {
        return Err(TrendError::ValidationError(format!(
            "Raster sequences differ in length: {} years, {} vegetation rasters, {} temperature rasters",
            years.len(),
            ndvi.len(),
            lst.len()
        )));
    }
    let (Some(&first_year), Some(&last_year)) = (years.first(), years.last()) else {
        return Err(TrendError::InvalidArgument(
            "No years requested for aggregation".to_string(),
        ));
    };

    check_rasters(years, ndvi, Band::Ndvi)?;
    check_rasters(years, lst, Band::LstKelvin)?;

    let mut observations = Vec::with_capacity(years.len());
    let mut missing_both = 0;

    for ((&year, ndvi), lst) in years.iter().zip(ndvi).zip(lst) {
        let ndvi_mean = spatial_mean(ndvi.as_ref());
        let lst_mean = spatial_mean(lst.as_ref());
        if ndvi_mean.is_none() && lst_mean.is_none() {
            missing_both += 1;
        } else if ndvi_mean.is_none() || lst_mean.is_none() {
            warn!(year, "only one band available for year");
        }
        observations.push(aggregate_year(year, ndvi.as_ref(), lst.as_ref(), policy));
    }

    if missing_both == years.len() {
        return Err(TrendError::AllYearsMissing {
            first_year,
            last_year,
        });
    }

    ObservationSeries::new(observations)
}

/// Every present raster must carry the expected band and the year of its slot.
fn check_rasters(
    years: &[i32],
    rasters: &[Option<RasterSample>],
    expected: Band,
) -> Result<(), TrendError> {
    for (&year, raster) in years.iter().zip(rasters) {
        let Some(r) = raster else { continue };
        if r.band != expected {
            return Err(TrendError::ValidationError(format!(
                "Expected {expected} raster for {year}, got {}",
                r.band
            )));
        }
        if r.year != year {
            return Err(TrendError::ValidationError(format!(
                "{expected} raster for {} was supplied in the slot for {year}",
                r.year
            )));
        }
    }
    Ok(())
}

mod directory;
mod memory;

use tracing::{debug, info, warn};

use crate::analysis::{build_series, MissingDataPolicy};
use crate::error::TrendError;
use crate::models::{year_span, Band, BoundingBox, ObservationSeries, RasterSample};

pub use directory::{parse_grid, read_grid, DirectoryProvider};
pub use memory::InMemoryProvider;

/// Source of yearly raster samples for a region.
///
/// `Ok(None)` means the provider has no data for that band and year.
pub trait BandProvider {
    fn fetch_band(
        &self,
        bbox: &BoundingBox,
        band: Band,
        year: i32,
    ) -> Result<Option<RasterSample>, TrendError>;
}

impl<P: BandProvider + ?Sized> BandProvider for &P {
    fn fetch_band(
        &self,
        bbox: &BoundingBox,
        band: Band,
        year: i32,
    ) -> Result<Option<RasterSample>, TrendError> {
        (**self).fetch_band(bbox, band, year)
    }
}

/// Retrieve both bands for `num_years` contiguous years starting at `start_year`
/// and aggregate them into an observation series.
///
/// A failed fetch is logged and treated as a missing year.
pub fn collect_series<P: BandProvider + ?Sized>(
    provider: &P,
    bbox: &BoundingBox,
    start_year: i32,
    num_years: u32,
    policy: MissingDataPolicy,
) -> Result<ObservationSeries, TrendError> {
    if num_years == 0 {
        return Err(TrendError::InvalidArgument(
            "Number of years must be at least 1".to_string(),
        ));
    }
    bbox.validate()?;

    let years: Vec<i32> = year_span(start_year, num_years)?.collect();
    info!(
        %bbox,
        start_year,
        num_years,
        %policy,
        "collecting raster series"
    );

    let fetch = |band: Band, year: i32| match provider.fetch_band(bbox, band, year) {
        Ok(sample) => {
            if sample.is_none() {
                debug!(year, %band, "no raster for year");
            }
            sample
        }
        Err(e) => {
            warn!(year, %band, error = %e, "raster retrieval failed, treating year as missing");
            None
        }
    };

    let ndvi: Vec<Option<RasterSample>> = years.iter().map(|&y| fetch(Band::Ndvi, y)).collect();
    let lst: Vec<Option<RasterSample>> =
        years.iter().map(|&y| fetch(Band::LstKelvin, y)).collect();

    build_series(&years, &ndvi, &lst, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    struct FailingProvider;

    impl BandProvider for FailingProvider {
        fn fetch_band(
            &self,
            _bbox: &BoundingBox,
            _band: Band,
            year: i32,
        ) -> Result<Option<RasterSample>, TrendError> {
            Err(TrendError::NotFound(format!("upstream timeout for {year}")))
        }
    }

    fn bbox() -> BoundingBox {
        BoundingBox::new(139.5, 35.5, 140.0, 35.9).unwrap()
    }

    fn provider() -> InMemoryProvider {
        let mut p = InMemoryProvider::new();
        for (i, year) in (2002..=2004).enumerate() {
            let ndvi = 0.50 + 0.05 * i as f64;
            let lst_k = 293.15 - i as f64;
            p.insert(RasterSample::new(year, Band::Ndvi, 1, 2, vec![ndvi, ndvi]).unwrap());
            p.insert(RasterSample::new(year, Band::LstKelvin, 1, 2, vec![lst_k, lst_k]).unwrap());
        }
        p
    }

    #[test]
    fn test_collect_series_worked_example() {
        let series =
            collect_series(&provider(), &bbox(), 2002, 3, MissingDataPolicy::Exclude).unwrap();
        assert_eq!(series.years(), vec![2002, 2003, 2004]);
        assert_approx_eq!(series.observations()[2].vegetation_index, 0.60, 1e-12);
        assert_approx_eq!(series.observations()[2].surface_temperature_celsius, 18.0, 1e-9);
    }

    #[test]
    fn test_collect_series_pads_missing_years() {
        let series =
            collect_series(&provider(), &bbox(), 2002, 5, MissingDataPolicy::Exclude).unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(series.last_year(), Some(2006));
        assert_eq!(series.num_missing(), 2);
    }

    #[test]
    fn test_collect_series_failures_become_missing() {
        let result = collect_series(&FailingProvider, &bbox(), 2002, 3, MissingDataPolicy::ZeroFill);
        assert!(matches!(result, Err(TrendError::AllYearsMissing { .. })));
    }

    #[test]
    fn test_collect_series_zero_years() {
        assert!(matches!(
            collect_series(&provider(), &bbox(), 2002, 0, MissingDataPolicy::Exclude),
            Err(TrendError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_collect_series_past_last_representable_year() {
        assert!(matches!(
            collect_series(&provider(), &bbox(), i32::MAX - 1, 3, MissingDataPolicy::Exclude),
            Err(TrendError::InvalidArgument(_))
        ));
        assert!(matches!(
            collect_series(&provider(), &bbox(), 2002, u32::MAX, MissingDataPolicy::Exclude),
            Err(TrendError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_collect_series_via_trait_object() {
        let p = provider();
        let dynamic: &dyn BandProvider = &p;
        let series = collect_series(dynamic, &bbox(), 2002, 3, MissingDataPolicy::Exclude).unwrap();
        assert_eq!(series.num_missing(), 0);
    }
}

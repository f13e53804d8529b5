use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::MissingDataPolicy;
use crate::error::TrendError;
use crate::models::{BoundingBox, ObservationSeries};
use crate::retrieval::{collect_series, BandProvider};

/// Region and year range currently under analysis, plus the series collected for it.
///
/// The series is re-collected only when the region or the missing-data policy
/// changes; models are always re-fitted from it on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSession {
    pub start_year: i32,
    pub num_years: u32,
    bbox: Option<BoundingBox>,
    policy: MissingDataPolicy,
    series: ObservationSeries,
}

impl AnalysisSession {
    pub fn new(start_year: i32, num_years: u32) -> Self {
        Self {
            start_year,
            num_years,
            bbox: None,
            policy: MissingDataPolicy::default(),
            series: ObservationSeries::default(),
        }
    }

    /// Session over an already collected series, with no region attached.
    pub fn from_series(series: ObservationSeries) -> Self {
        let start_year = series.first_year().unwrap_or_default();
        let num_years = series.len() as u32;
        Self {
            start_year,
            num_years,
            bbox: None,
            policy: MissingDataPolicy::default(),
            series,
        }
    }

    pub fn bbox(&self) -> Option<&BoundingBox> {
        self.bbox.as_ref()
    }

    pub fn series(&self) -> &ObservationSeries {
        &self.series
    }

    pub fn policy(&self) -> MissingDataPolicy {
        self.policy
    }

    pub fn is_loaded(&self) -> bool {
        !self.series.is_empty()
    }

    /// Point the session at `bbox`, re-collecting the series if the region or
    /// policy differs from the last refresh. Returns whether data was re-collected.
    ///
    /// On failure the previous region and series are kept.
    pub fn refresh<P: BandProvider + ?Sized>(
        &mut self,
        provider: &P,
        bbox: BoundingBox,
        policy: MissingDataPolicy,
    ) -> Result<bool, TrendError> {
        let unchanged = self
            .bbox
            .is_some_and(|current| current.cache_key() == bbox.cache_key())
            && self.policy == policy
            && self.is_loaded();
        if unchanged {
            debug!(key = %bbox.cache_key(), "region unchanged, keeping series");
            return Ok(false);
        }

        let series = collect_series(provider, &bbox, self.start_year, self.num_years, policy)?;
        info!(
            key = %bbox.cache_key(),
            years = series.len(),
            missing = series.num_missing(),
            "session refreshed"
        );
        self.bbox = Some(bbox);
        self.policy = policy;
        self.series = series;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Band, RasterSample};
    use crate::retrieval::InMemoryProvider;
    use std::cell::Cell;

    struct CountingProvider {
        inner: InMemoryProvider,
        calls: Cell<usize>,
    }

    impl BandProvider for CountingProvider {
        fn fetch_band(
            &self,
            bbox: &BoundingBox,
            band: Band,
            year: i32,
        ) -> Result<Option<RasterSample>, TrendError> {
            self.calls.set(self.calls.get() + 1);
            self.inner.fetch_band(bbox, band, year)
        }
    }

    fn provider() -> CountingProvider {
        let inner = (2002..=2004)
            .flat_map(|year| {
                [
                    RasterSample::new(year, Band::Ndvi, 1, 1, vec![0.5]).unwrap(),
                    RasterSample::new(year, Band::LstKelvin, 1, 1, vec![293.15]).unwrap(),
                ]
            })
            .collect();
        CountingProvider {
            inner,
            calls: Cell::new(0),
        }
    }

    #[test]
    fn test_refresh_collects_once_per_region() {
        let p = provider();
        let mut session = AnalysisSession::new(2002, 3);
        let bbox = BoundingBox::new(139.5, 35.5, 140.0, 35.9).unwrap();

        assert!(session.refresh(&p, bbox, MissingDataPolicy::Exclude).unwrap());
        assert_eq!(p.calls.get(), 6);
        assert_eq!(session.series().len(), 3);

        assert!(!session.refresh(&p, bbox, MissingDataPolicy::Exclude).unwrap());
        assert_eq!(p.calls.get(), 6);

        let moved = BoundingBox::new(139.6, 35.5, 140.0, 35.9).unwrap();
        assert!(session.refresh(&p, moved, MissingDataPolicy::Exclude).unwrap());
        assert_eq!(p.calls.get(), 12);
        assert_eq!(session.bbox(), Some(&moved));
    }

    #[test]
    fn test_refresh_on_policy_change() {
        let p = provider();
        let mut session = AnalysisSession::new(2002, 3);
        let bbox = BoundingBox::new(139.5, 35.5, 140.0, 35.9).unwrap();
        session.refresh(&p, bbox, MissingDataPolicy::Exclude).unwrap();
        assert!(session.refresh(&p, bbox, MissingDataPolicy::ZeroFill).unwrap());
        assert_eq!(session.policy(), MissingDataPolicy::ZeroFill);
    }

    #[test]
    fn test_failed_refresh_keeps_previous_state() {
        let p = provider();
        let mut session = AnalysisSession::new(2002, 3);
        let bbox = BoundingBox::new(139.5, 35.5, 140.0, 35.9).unwrap();
        session.refresh(&p, bbox, MissingDataPolicy::Exclude).unwrap();

        let mut later = session.clone();
        later.start_year = 2030;
        let elsewhere = BoundingBox::new(10.0, 10.0, 11.0, 11.0).unwrap();
        assert!(later.refresh(&p, elsewhere, MissingDataPolicy::Exclude).is_err());
        assert_eq!(later.bbox(), Some(&bbox));
        assert_eq!(later.series(), session.series());
    }

    #[test]
    fn test_from_series() {
        let series =
            ObservationSeries::from_columns(&[2010, 2011], &[0.4, 0.5], &[25.0, 24.0]).unwrap();
        let session = AnalysisSession::from_series(series);
        assert_eq!(session.start_year, 2010);
        assert_eq!(session.num_years, 2);
        assert!(session.is_loaded());
        assert!(session.bbox().is_none());
    }
}

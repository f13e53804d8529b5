use std::collections::HashMap;

use super::BandProvider;
use crate::error::TrendError;
use crate::models::{Band, BoundingBox, RasterSample};

/// Serves pre-loaded raster samples, one per band and year, for any region.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    samples: HashMap<(Band, i32), RasterSample>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample, replacing any previous one for the same band and year.
    pub fn insert(&mut self, sample: RasterSample) {
        self.samples.insert((sample.band, sample.year), sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl FromIterator<RasterSample> for InMemoryProvider {
    fn from_iter<I: IntoIterator<Item = RasterSample>>(iter: I) -> Self {
        let mut provider = Self::new();
        for sample in iter {
            provider.insert(sample);
        }
        provider
    }
}

impl BandProvider for InMemoryProvider {
    fn fetch_band(
        &self,
        _bbox: &BoundingBox,
        band: Band,
        year: i32,
    ) -> Result<Option<RasterSample>, TrendError> {
        Ok(self.samples.get(&(band, year)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_fetch() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let provider: InMemoryProvider = vec![
            RasterSample::new(2002, Band::Ndvi, 1, 1, vec![0.5]).unwrap(),
            RasterSample::new(2002, Band::LstKelvin, 1, 1, vec![300.0]).unwrap(),
        ]
        .into_iter()
        .collect();

        assert_eq!(provider.len(), 2);
        let ndvi = provider.fetch_band(&bbox, Band::Ndvi, 2002).unwrap().unwrap();
        assert_eq!(ndvi.values, vec![0.5]);
        assert!(provider.fetch_band(&bbox, Band::Ndvi, 2003).unwrap().is_none());
    }

    #[test]
    fn test_insert_replaces() {
        let mut provider = InMemoryProvider::new();
        provider.insert(RasterSample::new(2002, Band::Ndvi, 1, 1, vec![0.5]).unwrap());
        provider.insert(RasterSample::new(2002, Band::Ndvi, 1, 1, vec![0.7]).unwrap());
        assert_eq!(provider.len(), 1);
    }
}

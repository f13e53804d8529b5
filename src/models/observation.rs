use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::TrendError;

/// The `count` consecutive years starting at `first`.
///
/// Fails with `InvalidArgument` when `count` is 0 or the last year would not fit
/// in an `i32`.
pub fn year_span(first: i32, count: u32) -> Result<RangeInclusive<i32>, TrendError> {
    if count == 0 {
        return Err(TrendError::InvalidArgument(
            "A year range must cover at least 1 year".to_string(),
        ));
    }
    let last = i32::try_from(count - 1)
        .ok()
        .and_then(|extra| first.checked_add(extra))
        .ok_or_else(|| {
            TrendError::InvalidArgument(format!(
                "{count} years starting at {first} run past the last representable year"
            ))
        })?;
    Ok(first..=last)
}

/// One year of spatially averaged observations for a bounding box.
///
/// A non-finite value marks that year's raster as missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Calendar year of the observation
    pub year: i32,
    /// Mean vegetation index (NDVI), roughly in [-1, 1]
    #[serde(with = "nullable_f64")]
    pub vegetation_index: f64,
    /// Mean land-surface temperature in degrees Celsius
    #[serde(with = "nullable_f64")]
    pub surface_temperature_celsius: f64,
}

/// Missing values travel as `null` in JSON and come back as NaN.
mod nullable_f64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

impl Observation {
    pub fn new(year: i32, vegetation_index: f64, surface_temperature_celsius: f64) -> Self {
        Self {
            year,
            vegetation_index,
            surface_temperature_celsius,
        }
    }

    /// True when both values are usable for fitting.
    pub fn is_complete(&self) -> bool {
        self.vegetation_index.is_finite() && self.surface_temperature_celsius.is_finite()
    }

    /// True when neither value is usable.
    pub fn is_empty(&self) -> bool {
        !self.vegetation_index.is_finite() && !self.surface_temperature_celsius.is_finite()
    }
}

/// An ordered, index-aligned series of yearly observations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Observation>", into = "Vec<Observation>")]
pub struct ObservationSeries {
    observations: Vec<Observation>,
}

impl ObservationSeries {
    /// Build a series, checking that years are strictly increasing.
    pub fn new(observations: Vec<Observation>) -> Result<Self, TrendError> {
        for pair in observations.windows(2) {
            if pair[1].year <= pair[0].year {
                return Err(TrendError::ValidationError(format!(
                    "Years must be strictly increasing, got {} after {}",
                    pair[1].year, pair[0].year
                )));
            }
        }
        Ok(Self { observations })
    }

    /// Build a series from three parallel columns.
    ///
    /// # Examples
    ///
    /// ```
    /// use greening_trends::ObservationSeries;
    ///
    /// let series = ObservationSeries::from_columns(
    ///     &[2002, 2003, 2004],
    ///     &[0.50, 0.55, 0.60],
    ///     &[20.0, 19.0, 18.0],
    /// ).unwrap();
    /// assert_eq!(series.len(), 3);
    /// assert_eq!(series.last_year(), Some(2004));
    /// ```
    pub fn from_columns(
        years: &[i32],
        vegetation: &[f64],
        temperature: &[f64],
    ) -> Result<Self, TrendError> {
        if years.len() != vegetation.len() || years.len() != temperature.len() {
            return Err(TrendError::ValidationError(format!(
                "Column lengths differ: {} years, {} vegetation values, {} temperature values",
                years.len(),
                vegetation.len(),
                temperature.len()
            )));
        }
        let observations = years
            .iter()
            .zip(vegetation)
            .zip(temperature)
            .map(|((&year, &ndvi), &lst)| Observation::new(year, ndvi, lst))
            .collect();
        Self::new(observations)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.observations.first().map(|o| o.year)
    }

    pub fn last_year(&self) -> Option<i32> {
        self.observations.last().map(|o| o.year)
    }

    pub fn years(&self) -> Vec<i32> {
        self.observations.iter().map(|o| o.year).collect()
    }

    pub fn vegetation_values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.vegetation_index).collect()
    }

    pub fn temperature_values(&self) -> Vec<f64> {
        self.observations
            .iter()
            .map(|o| o.surface_temperature_celsius)
            .collect()
    }

    /// Number of years with at least one missing value.
    pub fn num_missing(&self) -> usize {
        self.observations.iter().filter(|o| !o.is_complete()).count()
    }

    /// True when the series is non-empty and no year carries any data.
    pub fn all_missing(&self) -> bool {
        !self.observations.is_empty() && self.observations.iter().all(|o| o.is_empty())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }
}

impl TryFrom<Vec<Observation>> for ObservationSeries {
    type Error = TrendError;

    fn try_from(observations: Vec<Observation>) -> Result<Self, Self::Error> {
        Self::new(observations)
    }
}

impl From<ObservationSeries> for Vec<Observation> {
    fn from(series: ObservationSeries) -> Self {
        series.observations
    }
}

impl<'a> IntoIterator for &'a ObservationSeries {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_series() -> ObservationSeries {
        ObservationSeries::from_columns(
            &[2002, 2003, 2004],
            &[0.50, 0.55, 0.60],
            &[20.0, 19.0, 18.0],
        )
        .unwrap()
    }

    #[test]
    fn test_from_columns() {
        let series = sample_series();
        assert_eq!(series.len(), 3);
        assert_eq!(series.years(), vec![2002, 2003, 2004]);
        assert_eq!(series.first_year(), Some(2002));
        assert_eq!(series.last_year(), Some(2004));
        assert_eq!(series.num_missing(), 0);
    }

    #[test]
    fn test_year_span() {
        assert_eq!(year_span(2002, 3).unwrap(), 2002..=2004);
        assert_eq!(year_span(i32::MAX, 1).unwrap(), i32::MAX..=i32::MAX);
        assert!(matches!(year_span(2002, 0), Err(TrendError::InvalidArgument(_))));
        assert!(matches!(
            year_span(i32::MAX - 1, 3),
            Err(TrendError::InvalidArgument(_))
        ));
        assert!(matches!(
            year_span(0, 3_000_000_000),
            Err(TrendError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_from_columns_length_mismatch() {
        let result = ObservationSeries::from_columns(&[2002, 2003], &[0.5], &[20.0, 19.0]);
        assert!(matches!(result, Err(TrendError::ValidationError(_))));
    }

    #[test]
    fn test_years_must_increase() {
        let result = ObservationSeries::from_columns(
            &[2003, 2002],
            &[0.5, 0.6],
            &[20.0, 19.0],
        );
        assert!(matches!(result, Err(TrendError::ValidationError(_))));
    }

    #[test]
    fn test_duplicate_years_rejected() {
        let result = ObservationSeries::from_columns(
            &[2002, 2002],
            &[0.5, 0.6],
            &[20.0, 19.0],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_non_consecutive_years_allowed() {
        let series = ObservationSeries::from_columns(
            &[2002, 2005, 2011],
            &[0.5, 0.6, 0.7],
            &[20.0, 19.0, 18.0],
        )
        .unwrap();
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_missing_counts() {
        let series = ObservationSeries::from_columns(
            &[2002, 2003, 2004],
            &[0.5, f64::NAN, f64::NAN],
            &[20.0, 19.0, f64::NAN],
        )
        .unwrap();
        assert_eq!(series.num_missing(), 2);
        assert!(!series.all_missing());
        assert!(series.observations()[2].is_empty());
        assert!(!series.observations()[1].is_empty());
    }

    #[test]
    fn test_all_missing() {
        let series =
            ObservationSeries::from_columns(&[2002, 2003], &[f64::NAN; 2], &[f64::NAN; 2])
                .unwrap();
        assert!(series.all_missing());
        assert!(!ObservationSeries::default().all_missing());
    }

    #[test]
    fn test_series_json_roundtrip() {
        let series = sample_series();
        let json = serde_json::to_string(&series).unwrap();
        assert!(json.starts_with('['));
        let back: ObservationSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(back, series);
    }

    #[test]
    fn test_missing_values_serialize_as_null() {
        let obs = Observation::new(2003, f64::NAN, 18.5);
        let json = serde_json::to_string(&obs).unwrap();
        assert!(json.contains("\"vegetation_index\":null"));
        let back: Observation = serde_json::from_str(&json).unwrap();
        assert!(back.vegetation_index.is_nan());
        assert_eq!(back.surface_temperature_celsius, 18.5);
    }

    #[test]
    fn test_series_json_rejects_unordered() {
        let json = r#"[
            {"year": 2004, "vegetation_index": 0.5, "surface_temperature_celsius": 20.0},
            {"year": 2003, "vegetation_index": 0.6, "surface_temperature_celsius": 19.0}
        ]"#;
        assert!(serde_json::from_str::<ObservationSeries>(json).is_err());
    }
}

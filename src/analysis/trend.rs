use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::LinearFit;
use crate::error::TrendError;
use crate::models::{year_span, ObservationSeries};

/// How years with a missing raster mean are treated before fitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDataPolicy {
    /// Drop any year with a non-finite value from the fit input.
    #[default]
    Exclude,
    /// Substitute 0 for non-finite values. Legacy compatibility only: it treats
    /// "no data" as a real measurement of 0 and biases both fits.
    ZeroFill,
}

impl MissingDataPolicy {
    /// Value recorded for a year whose raster is absent.
    pub fn missing_value(&self) -> f64 {
        match self {
            MissingDataPolicy::Exclude => f64::NAN,
            MissingDataPolicy::ZeroFill => 0.0,
        }
    }
}

impl std::fmt::Display for MissingDataPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingDataPolicy::Exclude => write!(f, "exclude"),
            MissingDataPolicy::ZeroFill => write!(f, "zero-fill"),
        }
    }
}

impl std::str::FromStr for MissingDataPolicy {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "exclude" => Ok(MissingDataPolicy::Exclude),
            "zero-fill" | "zero" => Ok(MissingDataPolicy::ZeroFill),
            _ => Err(TrendError::ParseError(format!(
                "Unknown missing data policy: '{s}'"
            ))),
        }
    }
}

/// Two chained linear models: year → vegetation index → temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendModel {
    /// Vegetation index as a function of year (α, β)
    pub year_to_index: LinearFit,
    /// Surface temperature (°C) as a function of vegetation index (γ, δ)
    pub index_to_temp: LinearFit,
    /// Last year of the observation series; forecasts start one year later
    pub last_observed_year: i32,
    /// Number of observations that entered the fit
    pub observations_used: usize,
    /// Number of observations dropped as missing
    pub observations_excluded: usize,
    pub missing_policy: MissingDataPolicy,
}

/// One forecast year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub year: i32,
    pub vegetation_index: f64,
    pub surface_temperature_celsius: f64,
}

impl TrendModel {
    /// Fit both linear models from an observation series.
    pub fn fit(
        series: &ObservationSeries,
        policy: MissingDataPolicy,
    ) -> Result<Self, TrendError> {
        let last_observed_year = series.last_year().ok_or_else(|| {
            TrendError::InsufficientData("Observation series is empty".to_string())
        })?;

        if series.all_missing() {
            return Err(TrendError::AllYearsMissing {
                first_year: series.first_year().unwrap_or(last_observed_year),
                last_year: last_observed_year,
            });
        }

        let mut years = Vec::with_capacity(series.len());
        let mut ndvi = Vec::with_capacity(series.len());
        let mut lst = Vec::with_capacity(series.len());

        for obs in series {
            match policy {
                MissingDataPolicy::Exclude => {
                    if !obs.is_complete() {
                        continue;
                    }
                    ndvi.push(obs.vegetation_index);
                    lst.push(obs.surface_temperature_celsius);
                }
                MissingDataPolicy::ZeroFill => {
                    ndvi.push(finite_or_zero(obs.vegetation_index));
                    lst.push(finite_or_zero(obs.surface_temperature_celsius));
                }
            }
            years.push(obs.year as f64);
        }

        let excluded = series.len() - years.len();
        if years.len() < 2 {
            return Err(TrendError::InsufficientData(format!(
                "Need at least 2 usable observations, got {} ({} excluded as missing)",
                years.len(),
                excluded
            )));
        }

        let year_to_index = LinearFit::ols(&years, &ndvi)?;
        let index_to_temp = LinearFit::ols(&ndvi, &lst)?;

        debug!(
            used = years.len(),
            excluded,
            %policy,
            alpha = year_to_index.slope,
            gamma = index_to_temp.slope,
            "fitted trend model"
        );

        Ok(Self {
            year_to_index,
            index_to_temp,
            last_observed_year,
            observations_used: years.len(),
            observations_excluded: excluded,
            missing_policy: policy,
        })
    }

    /// Baseline vegetation index for a year.
    pub fn predict_index(&self, year: i32) -> f64 {
        self.year_to_index.predict(year as f64)
    }

    /// Temperature implied by a vegetation index under the fitted relationship.
    pub fn predict_temperature(&self, vegetation_index: f64) -> f64 {
        self.index_to_temp.predict(vegetation_index)
    }

    /// Forecast `horizon_years` years after the last observed year.
    ///
    /// Temperature is always routed through the predicted vegetation index, never
    /// predicted from the year directly. Reliability degrades as the horizon grows;
    /// no upper bound is enforced.
    pub fn forecast(&self, horizon_years: u32) -> Result<Vec<ForecastPoint>, TrendError> {
        if horizon_years == 0 {
            return Err(TrendError::InvalidArgument(
                "Forecast horizon must be at least 1 year".to_string(),
            ));
        }

        let first = self.last_observed_year.checked_add(1).ok_or_else(|| {
            TrendError::InvalidArgument(format!(
                "No year follows the last observed year {}",
                self.last_observed_year
            ))
        })?;

        Ok(year_span(first, horizon_years)?
            .map(|year| {
                let vegetation_index = self.predict_index(year);
                ForecastPoint {
                    year,
                    vegetation_index,
                    surface_temperature_celsius: self.predict_temperature(vegetation_index),
                }
            })
            .collect())
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::MissingDataPolicy;
use crate::error::TrendError;
use crate::models::{year_span, BoundingBox};

/// Analysis defaults, loadable from a TOML file. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// First year of the collected series
    pub start_year: i32,
    /// Number of contiguous years to collect
    pub num_years: u32,
    pub horizon_years: u32,
    /// Default vegetation increase for scenarios (0.05 = +5%)
    pub increase_rate: f64,
    pub missing_policy: MissingDataPolicy,
    /// Region used when none is given on the command line
    pub bbox: Option<BoundingBox>,
    /// Decimal places map bounds are rounded to
    pub bbox_decimals: u32,
    /// Largest forecast horizon a request may ask for
    pub max_horizon_years: u32,
    /// Largest number of years a single collection may cover
    pub max_num_years: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            start_year: 2002,
            num_years: 10,
            horizon_years: 20,
            increase_rate: 0.05,
            missing_policy: MissingDataPolicy::Exclude,
            bbox: None,
            bbox_decimals: 1,
            max_horizon_years: 200,
            max_num_years: 100,
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, TrendError> {
        let config: AnalysisConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrendError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), TrendError> {
        if self.num_years == 0 {
            return Err(TrendError::Config("num_years must be at least 1".to_string()));
        }
        if self.horizon_years == 0 {
            return Err(TrendError::Config(
                "horizon_years must be at least 1".to_string(),
            ));
        }
        if !self.increase_rate.is_finite() || self.increase_rate <= -1.0 {
            return Err(TrendError::Config(format!(
                "increase_rate must be greater than -1, got {}",
                self.increase_rate
            )));
        }
        if self.bbox_decimals > 6 {
            return Err(TrendError::Config(format!(
                "bbox_decimals must be at most 6, got {}",
                self.bbox_decimals
            )));
        }
        if let Some(bbox) = &self.bbox {
            bbox.validate()?;
        }
        self.check_horizon(self.horizon_years)
            .and_then(|_| self.check_num_years(self.num_years))
            .and_then(|_| self.end_year())
            .map_err(|e| TrendError::Config(e.to_string()))?;
        Ok(())
    }

    /// Reject a requested forecast horizon above `max_horizon_years`.
    pub fn check_horizon(&self, horizon_years: u32) -> Result<u32, TrendError> {
        if horizon_years > self.max_horizon_years {
            return Err(TrendError::InvalidArgument(format!(
                "Forecast horizon {horizon_years} exceeds the limit of {} years",
                self.max_horizon_years
            )));
        }
        Ok(horizon_years)
    }

    /// Reject a requested collection length above `max_num_years`.
    pub fn check_num_years(&self, num_years: u32) -> Result<u32, TrendError> {
        if num_years > self.max_num_years {
            return Err(TrendError::InvalidArgument(format!(
                "Collection of {num_years} years exceeds the limit of {} years",
                self.max_num_years
            )));
        }
        Ok(num_years)
    }

    /// Last year of the configured range, inclusive.
    pub fn end_year(&self) -> Result<i32, TrendError> {
        Ok(*year_span(self.start_year, self.num_years)?.end())
    }
}

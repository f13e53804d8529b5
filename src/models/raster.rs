use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::TrendError;

/// Offset between Kelvin and degrees Celsius.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Raster band requested from the satellite data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    /// Normalized difference vegetation index
    Ndvi,
    /// Land-surface temperature in Kelvin
    LstKelvin,
}

impl Band {
    /// Stable identifier used for directory names and logs.
    pub fn id(&self) -> &'static str {
        match self {
            Band::Ndvi => "ndvi",
            Band::LstKelvin => "lst",
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for Band {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ndvi" => Ok(Band::Ndvi),
            "lst" | "lst_kelvin" => Ok(Band::LstKelvin),
            _ => Err(TrendError::ParseError(format!("Unknown band: '{s}'"))),
        }
    }
}

/// A single-band numeric grid for one year, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterSample {
    pub year: i32,
    pub band: Band,
    pub rows: usize,
    pub cols: usize,
    /// Cell values; non-finite cells carry no data
    pub values: Vec<f64>,
}

impl RasterSample {
    pub fn new(
        year: i32,
        band: Band,
        rows: usize,
        cols: usize,
        values: Vec<f64>,
    ) -> Result<Self, TrendError> {
        if values.len() != rows * cols {
            return Err(TrendError::ValidationError(format!(
                "Raster {band} {year}: expected {} cells for {rows}x{cols}, got {}",
                rows * cols,
                values.len()
            )));
        }
        Ok(Self {
            year,
            band,
            rows,
            cols,
            values,
        })
    }

    /// Build a raster from nested rows; every row must have the same width.
    pub fn from_rows(year: i32, band: Band, grid: Vec<Vec<f64>>) -> Result<Self, TrendError> {
        let rows = grid.len();
        let cols = grid.first().map_or(0, |r| r.len());
        if let Some(bad) = grid.iter().position(|r| r.len() != cols) {
            return Err(TrendError::ValidationError(format!(
                "Raster {band} {year}: row {bad} has {} cells, expected {cols}",
                grid[bad].len()
            )));
        }
        Self::new(year, band, rows, cols, grid.into_iter().flatten().collect())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.values.get(row * self.cols + col).copied()
    }

    pub fn num_cells(&self) -> usize {
        self.values.len()
    }

    pub fn num_finite(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }

    /// Mean over finite cells, `None` when no cell carries data.
    pub fn finite_mean(&self) -> Option<f64> {
        let finite: Vec<f64> = self.values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        Some(finite.mean())
    }

    /// Convert a Kelvin temperature raster to Celsius; other bands are returned unchanged.
    pub fn to_celsius(&self) -> RasterSample {
        match self.band {
            Band::LstKelvin => RasterSample {
                values: self.values.iter().map(|k| k - KELVIN_OFFSET).collect(),
                ..self.clone()
            },
            Band::Ndvi => self.clone(),
        }
    }
}

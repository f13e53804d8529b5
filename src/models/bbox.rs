use serde::{Deserialize, Serialize};

use crate::error::TrendError;

/// A rectangular geographic region in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a validated bounding box.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, TrendError> {
        let bbox = Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    /// Build a box from map corners (south-west, north-east), each given as (lon, lat),
    /// rounding every coordinate to `decimals` places.
    pub fn from_corners(
        south_west: (f64, f64),
        north_east: (f64, f64),
        decimals: u32,
    ) -> Result<Self, TrendError> {
        let round = |v: f64| {
            let scale = 10f64.powi(decimals as i32);
            (v * scale).round() / scale
        };
        Self::new(
            round(south_west.0),
            round(south_west.1),
            round(north_east.0),
            round(north_east.1),
        )
    }

    pub fn validate(&self) -> Result<(), TrendError> {
        let coords = [self.min_lon, self.min_lat, self.max_lon, self.max_lat];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(TrendError::InvalidArgument(format!(
                "Bounding box has non-finite coordinates: {self}"
            )));
        }
        if !(-180.0..=180.0).contains(&self.min_lon) || !(-180.0..=180.0).contains(&self.max_lon)
        {
            return Err(TrendError::InvalidArgument(format!(
                "Longitude must be in -180..=180: {self}"
            )));
        }
        if !(-90.0..=90.0).contains(&self.min_lat) || !(-90.0..=90.0).contains(&self.max_lat) {
            return Err(TrendError::InvalidArgument(format!(
                "Latitude must be in -90..=90: {self}"
            )));
        }
        if self.min_lon >= self.max_lon || self.min_lat >= self.max_lat {
            return Err(TrendError::InvalidArgument(format!(
                "Bounding box minimum must be below maximum: {self}"
            )));
        }
        Ok(())
    }

    /// Key identifying this box for change detection between requests.
    pub fn cache_key(&self) -> String {
        format!(
            "{:.4},{:.4},{:.4},{:.4}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }

    pub fn width_degrees(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height_degrees(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// As `[min_lon, min_lat, max_lon, max_lat]`.
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

impl std::str::FromStr for BoundingBox {
    type Err = TrendError;

    /// Parse `"min_lon,min_lat,max_lon,max_lat"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| {
                p.trim().parse::<f64>().map_err(|e| {
                    TrendError::ParseError(format!("Invalid bounding box coordinate '{p}': {e}"))
                })
            })
            .collect::<Result<_, _>>()?;
        match parts.as_slice() {
            [min_lon, min_lat, max_lon, max_lat] => {
                Self::new(*min_lon, *min_lat, *max_lon, *max_lat)
            }
            _ => Err(TrendError::ParseError(format!(
                "Bounding box needs 4 comma-separated values, got {}",
                parts.len()
            ))),
        }
    }
}

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::BandProvider;
use crate::error::TrendError;
use crate::models::{Band, BoundingBox, RasterSample};

/// Reads yearly grids laid out as `<root>/<band>/<year>.csv`.
///
/// Each file is a header-less numeric grid already clipped to the region of
/// interest. Empty and `NaN` cells carry no data. A missing file means no data
/// for that year.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, band: Band, year: i32) -> PathBuf {
        self.root.join(band.id()).join(format!("{year}.csv"))
    }
}

impl BandProvider for DirectoryProvider {
    fn fetch_band(
        &self,
        bbox: &BoundingBox,
        band: Band,
        year: i32,
    ) -> Result<Option<RasterSample>, TrendError> {
        let path = self.path_for(band, year);
        if !path.is_file() {
            return Ok(None);
        }
        debug!(path = %path.display(), %bbox, "reading raster grid");
        read_grid(&path, band, year).map(Some)
    }
}

/// Read one grid file.
pub fn read_grid(path: impl AsRef<Path>, band: Band, year: i32) -> Result<RasterSample, TrendError> {
    let file = std::fs::File::open(path.as_ref())?;
    parse_grid(file, band, year)
}

/// Parse a header-less CSV grid; all rows must have the same width.
pub fn parse_grid<R: Read>(reader: R, band: Band, year: i32) -> Result<RasterSample, TrendError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut grid = Vec::new();
    for (row_idx, record) in rdr.records().enumerate() {
        let record = record?;
        let row = record
            .iter()
            .map(|cell| parse_cell(cell, row_idx))
            .collect::<Result<Vec<f64>, _>>()?;
        grid.push(row);
    }
    RasterSample::from_rows(year, band, grid)
}

fn parse_cell(cell: &str, row_idx: usize) -> Result<f64, TrendError> {
    if cell.is_empty() {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>().map_err(|e| {
        TrendError::ParseError(format!("Invalid raster cell '{cell}' in row {}: {e}", row_idx + 1))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grid() {
        let data = "0.5,0.6\n,NaN\n0.7,0.8\n";
        let raster = parse_grid(data.as_bytes(), Band::Ndvi, 2002).unwrap();
        assert_eq!(raster.rows, 3);
        assert_eq!(raster.cols, 2);
        assert_eq!(raster.num_finite(), 4);
        assert!(raster.get(1, 0).unwrap().is_nan());
    }

    #[test]
    fn test_parse_grid_bad_cell() {
        let result = parse_grid("0.5,abc\n".as_bytes(), Band::Ndvi, 2002);
        assert!(matches!(result, Err(TrendError::ParseError(_))));
    }

    #[test]
    fn test_parse_grid_ragged_rows() {
        assert!(parse_grid("0.5,0.6\n0.7\n".as_bytes(), Band::Ndvi, 2002).is_err());
    }

    #[test]
    fn test_directory_provider() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("ndvi")).unwrap();
        std::fs::write(dir.path().join("ndvi").join("2002.csv"), "0.4,0.6\n").unwrap();

        let provider = DirectoryProvider::new(dir.path());
        let bbox = BoundingBox::new(139.5, 35.5, 140.0, 35.9).unwrap();

        let raster = provider.fetch_band(&bbox, Band::Ndvi, 2002).unwrap().unwrap();
        assert!((raster.finite_mean().unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(raster.year, 2002);
        assert!(provider.fetch_band(&bbox, Band::Ndvi, 2003).unwrap().is_none());
        assert!(provider.fetch_band(&bbox, Band::LstKelvin, 2002).unwrap().is_none());
    }
}

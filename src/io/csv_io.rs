use std::io::{Read, Write};
use std::path::Path;

use crate::analysis::ForecastPoint;
use crate::error::TrendError;
use crate::models::{Observation, ObservationSeries};

/// CSV row for one year. Empty cells are missing values.
#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct ObservationRow {
    year: i32,
    vegetation_index: Option<f64>,
    surface_temperature_celsius: Option<f64>,
}

impl From<&Observation> for ObservationRow {
    fn from(obs: &Observation) -> Self {
        Self {
            year: obs.year,
            vegetation_index: finite(obs.vegetation_index),
            surface_temperature_celsius: finite(obs.surface_temperature_celsius),
        }
    }
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

fn parse_csv_records<R: Read>(rdr: &mut csv::Reader<R>) -> Result<ObservationSeries, TrendError> {
    let mut observations = Vec::new();
    for result in rdr.deserialize() {
        let row: ObservationRow = result?;
        observations.push(Observation::new(
            row.year,
            row.vegetation_index.unwrap_or(f64::NAN),
            row.surface_temperature_celsius.unwrap_or(f64::NAN),
        ));
    }
    ObservationSeries::new(observations)
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).trim(csv::Trim::All);
    builder
}

/// Read an observation series from a CSV file with columns
/// `year,vegetation_index,surface_temperature_celsius`.
pub fn read_csv(path: impl AsRef<Path>) -> Result<ObservationSeries, TrendError> {
    let mut rdr = reader_builder().from_path(path.as_ref())?;
    parse_csv_records(&mut rdr)
}

/// Read an observation series from CSV bytes.
pub fn read_csv_from_bytes(data: &[u8]) -> Result<ObservationSeries, TrendError> {
    let mut rdr = reader_builder().from_reader(data);
    parse_csv_records(&mut rdr)
}

/// Write an observation series as CSV to any writer.
pub fn write_csv_to<W: Write>(series: &ObservationSeries, writer: W) -> Result<(), TrendError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for obs in series {
        wtr.serialize(ObservationRow::from(obs))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write an observation series to a CSV file.
pub fn write_csv(series: &ObservationSeries, path: impl AsRef<Path>) -> Result<(), TrendError> {
    let file = std::fs::File::create(path.as_ref())?;
    write_csv_to(series, file)
}

/// Write forecast points as CSV to any writer.
pub fn write_forecast_csv_to<W: Write>(
    points: &[ForecastPoint],
    writer: W,
) -> Result<(), TrendError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for point in points {
        wtr.serialize(point)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write forecast points to a CSV file.
pub fn write_forecast_csv(
    points: &[ForecastPoint],
    path: impl AsRef<Path>,
) -> Result<(), TrendError> {
    let file = std::fs::File::create(path.as_ref())?;
    write_forecast_csv_to(points, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_with_missing_cells() {
        let data = "\
year,vegetation_index,surface_temperature_celsius
2002,0.50,20.0
2003,,19.0
2004,NaN,
2005,0.65,17.0
";
        let series = read_csv_from_bytes(data.as_bytes()).unwrap();
        assert_eq!(series.len(), 4);
        assert!(series.observations()[1].vegetation_index.is_nan());
        assert_eq!(series.observations()[1].surface_temperature_celsius, 19.0);
        assert!(series.observations()[2].is_empty());
        assert_eq!(series.num_missing(), 2);
    }

    #[test]
    fn test_read_rejects_unordered_years() {
        let data = "year,vegetation_index,surface_temperature_celsius\n2003,0.5,20\n2002,0.5,20\n";
        assert!(matches!(
            read_csv_from_bytes(data.as_bytes()),
            Err(TrendError::ValidationError(_))
        ));
    }

    #[test]
    fn test_read_rejects_bad_number() {
        let data = "year,vegetation_index,surface_temperature_celsius\n2002,lush,20\n";
        assert!(matches!(
            read_csv_from_bytes(data.as_bytes()),
            Err(TrendError::Csv(_))
        ));
    }

    #[test]
    fn test_write_leaves_missing_cells_empty() {
        let series = ObservationSeries::from_columns(
            &[2002, 2003],
            &[0.5, f64::NAN],
            &[20.0, 19.5],
        )
        .unwrap();
        let mut buf = Vec::new();
        write_csv_to(&series, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        insta::assert_snapshot!(text.trim_end(), @r"
        year,vegetation_index,surface_temperature_celsius
        2002,0.5,20.0
        2003,,19.5
        ");
    }

    #[test]
    fn test_file_roundtrip() {
        let series = ObservationSeries::from_columns(
            &[2002, 2003, 2004],
            &[0.5, f64::NAN, 0.6],
            &[20.0, 19.0, 18.0],
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.csv");
        write_csv(&series, &path).unwrap();
        let loaded = read_csv(&path).unwrap();
        assert_eq!(loaded.years(), series.years());
        assert_eq!(loaded.num_missing(), 1);
        assert_eq!(loaded.observations()[2].vegetation_index, 0.6);
    }

    #[test]
    fn test_forecast_csv() {
        let points = vec![ForecastPoint {
            year: 2005,
            vegetation_index: 0.65,
            surface_temperature_celsius: 17.0,
        }];
        let mut buf = Vec::new();
        write_forecast_csv_to(&points, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("year,vegetation_index,surface_temperature_celsius\n"));
        assert!(text.contains("2005,0.65,17.0"));
    }
}

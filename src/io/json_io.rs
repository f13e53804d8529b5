use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::analysis::TrendReport;
use crate::error::TrendError;
use crate::models::ObservationSeries;

fn from_utf8(data: &[u8]) -> Result<&str, TrendError> {
    std::str::from_utf8(data).map_err(|e| TrendError::ParseError(format!("Invalid UTF-8: {e}")))
}

pub(crate) fn to_json_string<T: Serialize>(value: &T, pretty: bool) -> Result<String, TrendError> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, TrendError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Read an observation series from a JSON array of observations.
/// Missing values may be `null`.
pub fn read_json(path: impl AsRef<Path>) -> Result<ObservationSeries, TrendError> {
    read_json_file(path.as_ref())
}

/// Read an observation series from JSON bytes.
pub fn read_json_from_bytes(data: &[u8]) -> Result<ObservationSeries, TrendError> {
    Ok(serde_json::from_str(from_utf8(data)?)?)
}

/// Write an observation series to a JSON file.
pub fn write_json(
    series: &ObservationSeries,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), TrendError> {
    std::fs::write(path.as_ref(), to_json_string(series, pretty)?)?;
    Ok(())
}

/// Read a full trend report.
pub fn read_report_json(path: impl AsRef<Path>) -> Result<TrendReport, TrendError> {
    read_json_file(path.as_ref())
}

/// Write a full trend report (model, observations, forecast, scenarios).
pub fn write_report_json(
    report: &TrendReport,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), TrendError> {
    std::fs::write(path.as_ref(), to_json_string(report, pretty)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{MissingDataPolicy, TrendAnalyzer};

    fn sample_series() -> ObservationSeries {
        ObservationSeries::from_columns(
            &[2002, 2003, 2004],
            &[0.50, f64::NAN, 0.60],
            &[20.0, 19.0, 18.0],
        )
        .unwrap()
    }

    #[test]
    fn test_missing_values_as_null() {
        let json = to_json_string(&sample_series(), false).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"vegetation_index\":null"));

        let back = read_json_from_bytes(json.as_bytes()).unwrap();
        assert!(back.observations()[1].vegetation_index.is_nan());
        assert_eq!(back.observations()[2].vegetation_index, 0.60);
    }

    #[test]
    fn test_read_rejects_unordered_years() {
        let json = r#"[
            {"year": 2004, "vegetation_index": 0.5, "surface_temperature_celsius": 20.0},
            {"year": 2003, "vegetation_index": 0.5, "surface_temperature_celsius": 20.0}
        ]"#;
        assert!(matches!(
            read_json_from_bytes(json.as_bytes()),
            Err(TrendError::Json(_))
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(matches!(
            read_json_from_bytes(&[0xff, 0xfe]),
            Err(TrendError::ParseError(_))
        ));
    }

    #[test]
    fn test_report_file() {
        let series = sample_series();
        let report = TrendAnalyzer::new(&series, MissingDataPolicy::Exclude)
            .report(2, Some(2006), &[0.05])
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report_json(&report, &path, true).unwrap();

        let loaded = read_report_json(&path).unwrap();
        assert_eq!(loaded.forecast.len(), 2);
        assert_eq!(loaded.scenarios.len(), 1);
        assert_eq!(loaded.model.observations_used, 2);
        assert_eq!(loaded.observations.num_missing(), 1);
    }

    #[test]
    fn test_series_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.json");
        write_json(&sample_series(), &path, false).unwrap();
        let loaded = read_json(&path).unwrap();
        assert_eq!(loaded.years(), vec![2002, 2003, 2004]);
    }
}

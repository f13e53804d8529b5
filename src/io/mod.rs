mod csv_io;
mod excel_io;
mod json_io;

use std::path::Path;

use crate::analysis::TrendReport;
use crate::error::TrendError;
use crate::models::ObservationSeries;

pub use csv_io::{
    read_csv, read_csv_from_bytes, write_csv, write_csv_to, write_forecast_csv,
    write_forecast_csv_to,
};
pub use excel_io::{read_excel, read_excel_from_bytes, write_excel, write_report_excel};
pub use json_io::{
    read_json, read_json_from_bytes, read_report_json, write_json, write_report_json,
};

pub(crate) use json_io::to_json_string;

/// Trait for reading an observation series from a file.
pub trait SeriesReader {
    fn read(&self, path: &Path) -> Result<ObservationSeries, TrendError>;
}

/// Trait for writing an observation series or a full report to a file.
pub trait SeriesWriter {
    fn write(&self, series: &ObservationSeries, path: &Path) -> Result<(), TrendError>;

    fn write_report(&self, report: &TrendReport, path: &Path) -> Result<(), TrendError>;
}

/// CSV format reader/writer. Reports are written as their forecast table.
pub struct CsvFormat;

impl SeriesReader for CsvFormat {
    fn read(&self, path: &Path) -> Result<ObservationSeries, TrendError> {
        read_csv(path)
    }
}

impl SeriesWriter for CsvFormat {
    fn write(&self, series: &ObservationSeries, path: &Path) -> Result<(), TrendError> {
        write_csv(series, path)
    }

    fn write_report(&self, report: &TrendReport, path: &Path) -> Result<(), TrendError> {
        write_forecast_csv(&report.forecast, path)
    }
}

/// JSON format reader/writer.
#[derive(Default)]
pub struct JsonFormat {
    pub pretty: bool,
}

impl SeriesReader for JsonFormat {
    fn read(&self, path: &Path) -> Result<ObservationSeries, TrendError> {
        read_json(path)
    }
}

impl SeriesWriter for JsonFormat {
    fn write(&self, series: &ObservationSeries, path: &Path) -> Result<(), TrendError> {
        write_json(series, path, self.pretty)
    }

    fn write_report(&self, report: &TrendReport, path: &Path) -> Result<(), TrendError> {
        write_report_json(report, path, self.pretty)
    }
}

/// Excel (.xlsx) format reader/writer.
pub struct ExcelFormat;

impl SeriesReader for ExcelFormat {
    fn read(&self, path: &Path) -> Result<ObservationSeries, TrendError> {
        read_excel(path)
    }
}

impl SeriesWriter for ExcelFormat {
    fn write(&self, series: &ObservationSeries, path: &Path) -> Result<(), TrendError> {
        write_excel(series, path)
    }

    fn write_report(&self, report: &TrendReport, path: &Path) -> Result<(), TrendError> {
        write_report_excel(report, path)
    }
}

/// Parse an uploaded series, choosing the format from the file name's extension.
pub fn read_series_from_bytes(data: &[u8], filename: &str) -> Result<ObservationSeries, TrendError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "csv" => read_csv_from_bytes(data),
        "json" => read_json_from_bytes(data),
        "xlsx" => read_excel_from_bytes(data),
        _ => Err(TrendError::ParseError(format!(
            "Unsupported file type '{filename}'. Use .csv, .json, or .xlsx"
        ))),
    }
}

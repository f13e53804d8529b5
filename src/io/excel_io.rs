use std::path::Path;

use calamine::{open_workbook, DataType, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::analysis::{ForecastPoint, ScenarioResult, TrendReport};
use crate::error::TrendError;
use crate::models::{Observation, ObservationSeries};

const OBSERVATION_HEADERS: [&str; 3] = ["year", "vegetation_index", "surface_temperature_celsius"];

/// Read an observation series from the first sheet of an Excel (.xlsx) file.
///
/// The header row must name the columns `year`, `vegetation_index` and
/// `surface_temperature_celsius`, in any order. Blank cells are missing values.
pub fn read_excel(path: impl AsRef<Path>) -> Result<ObservationSeries, TrendError> {
    let mut workbook: Xlsx<_> = open_workbook(path.as_ref())?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| TrendError::Excel("No sheets found in workbook".to_string()))?;

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows();

    let header = rows
        .next()
        .ok_or_else(|| TrendError::Excel(format!("Sheet '{sheet_name}' is empty")))?;
    let column = |name: &str| -> Result<usize, TrendError> {
        header
            .iter()
            .position(|c| c.to_string().trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| TrendError::Excel(format!("Missing column '{name}'")))
    };
    let year_col = column(OBSERVATION_HEADERS[0])?;
    let ndvi_col = column(OBSERVATION_HEADERS[1])?;
    let lst_col = column(OBSERVATION_HEADERS[2])?;

    let mut observations = Vec::new();
    for (idx, row) in rows.enumerate() {
        if row.iter().all(|c| c.is_empty()) {
            continue;
        }
        let value = |col: usize| -> f64 {
            row.get(col).and_then(|c| c.as_f64()).unwrap_or(f64::NAN)
        };
        let year = row
            .get(year_col)
            .and_then(|c| c.as_f64())
            .filter(|y| y.fract() == 0.0)
            .ok_or_else(|| {
                TrendError::ParseError(format!("Row {}: year must be a whole number", idx + 2))
            })?;
        observations.push(Observation::new(year as i32, value(ndvi_col), value(lst_col)));
    }

    ObservationSeries::new(observations)
}

/// Read an observation series from Excel bytes.
pub fn read_excel_from_bytes(data: &[u8]) -> Result<ObservationSeries, TrendError> {
    use std::io::Write;
    let mut tmp = tempfile::NamedTempFile::new()?;
    tmp.write_all(data)?;
    tmp.flush()?;
    read_excel(tmp.path())
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str]) -> Result<(), TrendError> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    Ok(())
}

/// Non-finite values are left blank.
fn write_value(sheet: &mut Worksheet, row: u32, col: u16, value: f64) -> Result<(), TrendError> {
    if value.is_finite() {
        sheet.write_number(row, col, value)?;
    }
    Ok(())
}

fn write_observation_sheet(
    workbook: &mut Workbook,
    series: &ObservationSeries,
) -> Result<(), TrendError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("observations")?;
    write_headers(sheet, &OBSERVATION_HEADERS)?;
    for (i, obs) in series.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_number(row, 0, obs.year as f64)?;
        write_value(sheet, row, 1, obs.vegetation_index)?;
        write_value(sheet, row, 2, obs.surface_temperature_celsius)?;
    }
    Ok(())
}

fn write_forecast_sheet(workbook: &mut Workbook, points: &[ForecastPoint]) -> Result<(), TrendError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("forecast")?;
    write_headers(sheet, &OBSERVATION_HEADERS)?;
    for (i, point) in points.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_number(row, 0, point.year as f64)?;
        write_value(sheet, row, 1, point.vegetation_index)?;
        write_value(sheet, row, 2, point.surface_temperature_celsius)?;
    }
    Ok(())
}

fn write_model_sheet(workbook: &mut Workbook, report: &TrendReport) -> Result<(), TrendError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("model")?;
    write_headers(sheet, &["parameter", "value"])?;
    let model = &report.model;
    let params = [
        ("alpha (index per year)", model.year_to_index.slope),
        ("beta (index intercept)", model.year_to_index.intercept),
        ("gamma (degC per index)", model.index_to_temp.slope),
        ("delta (temperature intercept)", model.index_to_temp.intercept),
        ("last_observed_year", model.last_observed_year as f64),
        ("observations_used", model.observations_used as f64),
        ("observations_excluded", model.observations_excluded as f64),
    ];
    for (i, (name, value)) in params.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, *name)?;
        write_value(sheet, row, 1, *value)?;
    }
    Ok(())
}

fn write_scenario_sheet(
    workbook: &mut Workbook,
    scenarios: &[ScenarioResult],
) -> Result<(), TrendError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("scenarios")?;
    write_headers(
        sheet,
        &[
            "target_year",
            "increase_rate",
            "baseline_index",
            "baseline_temperature",
            "scenario_index",
            "scenario_temperature",
            "sensitivity",
            "delta_temperature",
        ],
    )?;
    for (i, s) in scenarios.iter().enumerate() {
        let row = i as u32 + 1;
        let values = [
            s.target_year as f64,
            s.increase_rate,
            s.baseline_index,
            s.baseline_temperature,
            s.scenario_index,
            s.scenario_temperature,
            s.sensitivity,
            s.delta_temperature,
        ];
        for (col, value) in values.into_iter().enumerate() {
            write_value(sheet, row, col as u16, value)?;
        }
    }
    Ok(())
}

/// Write an observation series to an Excel (.xlsx) file.
pub fn write_excel(series: &ObservationSeries, path: impl AsRef<Path>) -> Result<(), TrendError> {
    let mut workbook = Workbook::new();
    write_observation_sheet(&mut workbook, series)?;
    workbook.save(path.as_ref())?;
    Ok(())
}

/// Write a report workbook. The first sheet holds the observations so the file
/// can be read back with [`read_excel`].
pub fn write_report_excel(report: &TrendReport, path: impl AsRef<Path>) -> Result<(), TrendError> {
    let mut workbook = Workbook::new();
    write_observation_sheet(&mut workbook, &report.observations)?;
    write_forecast_sheet(&mut workbook, &report.forecast)?;
    write_model_sheet(&mut workbook, report)?;
    if !report.scenarios.is_empty() {
        write_scenario_sheet(&mut workbook, &report.scenarios)?;
    }
    workbook.save(path.as_ref())?;
    Ok(())
}

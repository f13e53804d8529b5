use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table};

use crate::analysis::{ForecastPoint, ScenarioResult, TrendModel};
use crate::models::ObservationSeries;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn value_cell(value: f64, precision: usize) -> Cell {
    if value.is_finite() {
        Cell::new(format!("{value:.precision$}"))
    } else {
        Cell::new("missing")
    }
}

fn heading(title: &str, width: usize) -> String {
    format!("\n{}\n{}\n", title.bold().green(), "=".repeat(width))
}

/// Format the observed series as a table, one row per year.
pub fn format_observation_table(series: &ObservationSeries) -> String {
    let mut output = heading("Observations", 50);
    output.push_str(&format!(
        "{}\n",
        format!(
            "{} years | {} with missing values",
            series.len(),
            series.num_missing()
        )
        .dimmed()
    ));

    let mut table = new_table(vec!["Year", "NDVI", "LST (°C)"]);
    for obs in series {
        table.add_row(vec![
            Cell::new(obs.year),
            value_cell(obs.vegetation_index, 4),
            value_cell(obs.surface_temperature_celsius, 2),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the observed series table.
pub fn print_observation_table(series: &ObservationSeries) {
    print!("{}", format_observation_table(series));
}

/// Format the fitted coefficients of both chained models.
pub fn format_model_summary(model: &TrendModel) -> String {
    let mut output = heading("Trend Model", 50);

    let mut table = new_table(vec!["Relationship", "Slope", "Intercept"]);
    table.add_row(vec![
        Cell::new("NDVI ~ year"),
        Cell::new(format!("{:.6}", model.year_to_index.slope)),
        Cell::new(format!("{:.4}", model.year_to_index.intercept)),
    ]);
    table.add_row(vec![
        Cell::new("LST (°C) ~ NDVI"),
        Cell::new(format!("{:.4}", model.index_to_temp.slope)),
        Cell::new(format!("{:.4}", model.index_to_temp.intercept)),
    ]);

    output.push_str(&format!("{table}\n"));
    output.push_str(&format!(
        "{}\n",
        format!(
            "Fitted on {} years ({} excluded, policy: {}), last observed {}",
            model.observations_used,
            model.observations_excluded,
            model.missing_policy,
            model.last_observed_year
        )
        .dimmed()
    ));
    output
}

/// Print the model summary.
pub fn print_model_summary(model: &TrendModel) {
    print!("{}", format_model_summary(model));
}

/// Format forecast points as a table.
pub fn format_forecast_table(points: &[ForecastPoint]) -> String {
    let mut output = heading("Forecast", 50);

    let mut table = new_table(vec!["Year", "NDVI", "LST (°C)"]);
    for point in points {
        table.add_row(vec![
            Cell::new(point.year),
            value_cell(point.vegetation_index, 4),
            value_cell(point.surface_temperature_celsius, 2),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the forecast table.
pub fn print_forecast_table(points: &[ForecastPoint]) {
    print!("{}", format_forecast_table(points));
}

/// Format greening scenarios, one row per increase rate.
pub fn format_scenario_table(results: &[ScenarioResult]) -> String {
    let mut output = heading("Greening Scenarios", 70);
    if let Some(first) = results.first() {
        output.push_str(&format!(
            "{}\n",
            format!(
                "Target year {} | baseline NDVI {:.4} | baseline LST {:.2} °C",
                first.target_year, first.baseline_index, first.baseline_temperature
            )
            .dimmed()
        ));
    }

    let mut table = new_table(vec![
        "Increase",
        "NDVI",
        "Sensitivity (°C/NDVI)",
        "LST (°C)",
        "Change (°C)",
    ]);
    for r in results {
        let change = format!("{:+.3}", r.delta_temperature);
        let change = if r.delta_temperature > 0.0 {
            change.red().to_string()
        } else if r.delta_temperature < 0.0 {
            change.cyan().to_string()
        } else {
            change
        };
        table.add_row(vec![
            Cell::new(format!("{:+.1}%", r.increase_rate * 100.0)),
            value_cell(r.scenario_index, 4),
            value_cell(r.sensitivity, 3),
            value_cell(r.scenario_temperature, 2),
            Cell::new(change),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the scenario table.
pub fn print_scenario_table(results: &[ScenarioResult]) {
    print!("{}", format_scenario_table(results));
}

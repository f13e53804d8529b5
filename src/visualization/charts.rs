use colored::Colorize;

use crate::analysis::ForecastPoint;
use crate::models::ObservationSeries;

const BAR_WIDTH: usize = 30;

struct ChartRow {
    year: i32,
    ndvi: f64,
    lst: f64,
    forecast: bool,
}

fn bar(value: f64, min: f64, max: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let len = if max > min {
        (((value - min) / (max - min)) * BAR_WIDTH as f64).round() as usize
    } else {
        BAR_WIDTH
    };
    "\u{2588}".repeat(len.clamp(1, BAR_WIDTH))
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Format a text chart of observed and forecast NDVI and LST, one line per year.
/// Bars are scaled to each band's own range; forecast years are marked with `*`.
pub fn format_trend_chart(series: &ObservationSeries, forecast: &[ForecastPoint]) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "NDVI and LST Trend".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    let rows: Vec<ChartRow> = series
        .iter()
        .map(|o| ChartRow {
            year: o.year,
            ndvi: o.vegetation_index,
            lst: o.surface_temperature_celsius,
            forecast: false,
        })
        .chain(forecast.iter().map(|p| ChartRow {
            year: p.year,
            ndvi: p.vegetation_index,
            lst: p.surface_temperature_celsius,
            forecast: true,
        }))
        .collect();

    let (Some((ndvi_min, ndvi_max)), Some((lst_min, lst_max))) = (
        finite_range(rows.iter().map(|r| r.ndvi)),
        finite_range(rows.iter().map(|r| r.lst)),
    ) else {
        output.push_str("  No data available.\n");
        return output;
    };

    output.push_str(&format!(
        "  {:>6}  {:>7}  {:<w$}  {:>7}  {}\n",
        "Year",
        "NDVI",
        "",
        "LST °C",
        "",
        w = BAR_WIDTH
    ));
    output.push_str(&format!("  {}\n", "-".repeat(30 + 2 * BAR_WIDTH)));

    for row in &rows {
        let marker = if row.forecast { "*" } else { " " };
        let fmt = |v: f64, precision: usize| {
            if v.is_finite() {
                format!("{v:.precision$}")
            } else {
                "-".to_string()
            }
        };
        output.push_str(&format!(
            "  {:>5}{}  {:>7}  {:<w$}  {:>7}  {}\n",
            row.year,
            marker,
            fmt(row.ndvi, 4),
            bar(row.ndvi, ndvi_min, ndvi_max).green(),
            fmt(row.lst, 2),
            bar(row.lst, lst_min, lst_max).red(),
            w = BAR_WIDTH
        ));
    }

    if !forecast.is_empty() {
        output.push_str(&format!("  {}\n", "* forecast".dimmed()));
    }
    output.push('\n');
    output
}

/// Print the trend chart.
pub fn print_trend_chart(series: &ObservationSeries, forecast: &[ForecastPoint]) {
    print!("{}", format_trend_chart(series, forecast));
}

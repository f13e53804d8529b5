use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use greening_trends::{
    analysis::{simulate_rates, TrendAnalyzer},
    collect_series,
    io::{self, CsvFormat, ExcelFormat, JsonFormat, SeriesWriter},
    retrieval::DirectoryProvider,
    visualization::{
        print_forecast_table, print_model_summary, print_observation_table, print_scenario_table,
        print_trend_chart,
    },
    AnalysisConfig, BoundingBox, MissingDataPolicy, ObservationSeries,
};

#[derive(Parser)]
#[command(
    name = "greening-trends",
    about = "Greening Trends - vegetation index and surface temperature forecasting",
    version,
    author
)]
struct Cli {
    /// TOML file with analysis defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the trend model and forecast future years
    Forecast {
        /// Path to observation series (CSV, JSON, or Excel)
        #[arg(short, long)]
        input: PathBuf,

        /// Number of years to forecast past the last observed year
        #[arg(short, long)]
        years: Option<u32>,

        /// Substitute 0 for missing values instead of excluding those years
        #[arg(long)]
        zero_fill: bool,

        /// Write the report to a file (CSV: forecast table, JSON/Excel: full report)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Simulate the temperature effect of raising the vegetation index
    Simulate {
        /// Path to observation series (CSV, JSON, or Excel)
        #[arg(short, long)]
        input: PathBuf,

        /// Year whose baseline vegetation index is raised
        #[arg(short, long)]
        target_year: i32,

        /// Relative increase, e.g. 0.05 for +5%; repeat for a sweep
        #[arg(short, long)]
        rate: Vec<f64>,

        /// Substitute 0 for missing values instead of excluding those years
        #[arg(long)]
        zero_fill: bool,
    },

    /// Aggregate yearly raster grids into an observation series
    Collect {
        /// Directory laid out as <dir>/ndvi/<year>.csv and <dir>/lst/<year>.csv
        #[arg(long)]
        rasters: PathBuf,

        /// Region as "min_lon,min_lat,max_lon,max_lat"
        #[arg(short, long)]
        bbox: Option<String>,

        /// First year to collect
        #[arg(long)]
        start_year: Option<i32>,

        /// Number of contiguous years to collect
        #[arg(long)]
        num_years: Option<u32>,

        /// Record missing years as 0 instead of leaving them empty
        #[arg(long)]
        zero_fill: bool,

        /// Output file path (CSV, JSON, or Excel)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Convert an observation series between formats
    Convert {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Display the observations and the fitted model
    Summary {
        /// Path to input file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Start the web UI server
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Raster directory enabling region-based sessions
        #[arg(long)]
        rasters: Option<PathBuf>,
    },
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn load_series(path: &Path) -> Result<ObservationSeries> {
    match extension(path).as_str() {
        "csv" => Ok(io::read_csv(path)?),
        "json" => Ok(io::read_json(path)?),
        "xlsx" => Ok(io::read_excel(path)?),
        ext => anyhow::bail!("Unsupported file format: .{ext}. Use .csv, .json, or .xlsx"),
    }
}

fn writer_for(path: &Path, pretty: bool) -> Result<Box<dyn SeriesWriter>> {
    match extension(path).as_str() {
        "csv" => Ok(Box::new(CsvFormat)),
        "json" => Ok(Box::new(JsonFormat { pretty })),
        "xlsx" => Ok(Box::new(ExcelFormat)),
        ext => anyhow::bail!("Unsupported output format: .{ext}"),
    }
}

fn policy(config: &AnalysisConfig, zero_fill: bool) -> MissingDataPolicy {
    if zero_fill {
        MissingDataPolicy::ZeroFill
    } else {
        config.missing_policy
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };

    match cli.command {
        Commands::Forecast {
            input,
            years,
            zero_fill,
            output,
            pretty,
        } => {
            let series = load_series(&input)?;
            let horizon = config.check_horizon(years.unwrap_or(config.horizon_years))?;
            let policy = policy(&config, zero_fill);

            println!(
                "\n{}",
                format!("Trend Forecast: {} ({horizon} years)", input.display())
                    .bold()
                    .cyan()
            );

            let report = TrendAnalyzer::new(&series, policy).report(horizon, None, &[])?;
            print_model_summary(&report.model);
            print_forecast_table(&report.forecast);
            print_trend_chart(&series, &report.forecast);

            if let Some(output) = output {
                writer_for(&output, pretty)?.write_report(&report, &output)?;
                println!(
                    "{} Report written to {}",
                    "Success:".green().bold(),
                    output.display()
                );
            }
        }

        Commands::Simulate {
            input,
            target_year,
            rate,
            zero_fill,
        } => {
            let series = load_series(&input)?;
            let rates = if rate.is_empty() {
                vec![config.increase_rate]
            } else {
                rate
            };

            println!(
                "\n{}",
                format!("Greening Scenario: {target_year}").bold().cyan()
            );

            let model = TrendAnalyzer::new(&series, policy(&config, zero_fill)).model()?;
            let results = simulate_rates(&model, target_year, &rates)?;
            print_scenario_table(&results);
        }

        Commands::Collect {
            rasters,
            bbox,
            start_year,
            num_years,
            zero_fill,
            output,
        } => {
            let bbox: BoundingBox = match (bbox, config.bbox) {
                (Some(text), _) => text.parse()?,
                (None, Some(default)) => default,
                (None, None) => anyhow::bail!("No region given: pass --bbox or set bbox in the config"),
            };
            let start_year = start_year.unwrap_or(config.start_year);
            let num_years = config.check_num_years(num_years.unwrap_or(config.num_years))?;
            let writer = writer_for(&output, true)?;

            let provider = DirectoryProvider::new(&rasters);
            let series = collect_series(
                &provider,
                &bbox,
                start_year,
                num_years,
                policy(&config, zero_fill),
            )?;
            writer.write(&series, &output)?;

            print_observation_table(&series);
            println!(
                "\n{} Collected {} years for {bbox} -> {}",
                "Success:".green().bold(),
                series.len(),
                output.display()
            );
        }

        Commands::Convert {
            input,
            output,
            pretty,
        } => {
            let series = load_series(&input)?;
            writer_for(&output, pretty)?.write(&series, &output)?;

            println!(
                "{} Converted {} -> {}",
                "Success:".green().bold(),
                input.display(),
                output.display()
            );
        }

        Commands::Summary { input } => {
            let series = load_series(&input)?;

            println!("\n{}", "Quick Summary".bold().cyan());
            println!("{}", "=".repeat(40));
            println!("  File:           {}", input.display());
            println!("  Years:          {}", series.len());
            if let (Some(first), Some(last)) = (series.first_year(), series.last_year()) {
                println!("  Range:          {first}-{last}");
            }
            println!("  Missing:        {}", series.num_missing());
            print_observation_table(&series);

            match TrendAnalyzer::new(&series, config.missing_policy).model() {
                Ok(model) => print_model_summary(&model),
                Err(e) => eprintln!("{}: {e}", "Warning".yellow()),
            }
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, rasters } => {
            let provider = rasters.map(DirectoryProvider::new);
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(greening_trends::web::start_server(port, config, provider))?;
        }
    }

    Ok(())
}

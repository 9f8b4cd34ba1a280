use crate::application::{TrackerApp, TrendReport};
use crate::entities::{FilterPeriod, parse_entry_date};
use crate::infrastructure::ImportFormat;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "peso-tracker")]
#[command(about = "Track body weight by date, with backups and trends")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a weight (replaces any value already stored for the date)
    Add {
        /// Weight in kg; `,` is accepted as decimal separator
        weight: String,
        /// Specific date (YYYY-MM-DD format, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Change the weight of an existing entry
    Edit {
        /// Date of the entry (YYYY-MM-DD)
        date: String,
        /// New weight in kg
        weight: String,
        /// Save the weight under this date instead (YYYY-MM-DD)
        #[arg(long)]
        to_date: Option<String>,
    },
    /// Delete the entry for a date
    Delete {
        /// Date of the entry (YYYY-MM-DD)
        date: String,
    },
    /// List all entries
    List,
    /// Show the weight change and linear trend over a period
    Trend {
        #[arg(short, long, value_enum, default_value_t = PeriodArg::All)]
        period: PeriodArg,
        /// How many days ahead to forecast
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(i64).range(0..=36_500))]
        forecast_days: i64,
    },
    /// Write a backup file
    Export {
        #[arg(short, long, value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,
        /// Directory for the backup (defaults to $PESO_TRACKER_EXPORT_DIR or .)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Merge a backup file into the stored entries
    Import {
        path: PathBuf,
        /// Format of the file (detected from extension or content if omitted)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PeriodArg {
    Month,
    ThreeMonths,
    Year,
    All,
}

impl From<PeriodArg> for FilterPeriod {
    fn from(period: PeriodArg) -> Self {
        match period {
            PeriodArg::Month => FilterPeriod::Month,
            PeriodArg::ThreeMonths => FilterPeriod::ThreeMonths,
            PeriodArg::Year => FilterPeriod::Year,
            PeriodArg::All => FilterPeriod::All,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Json,
    Csv,
}

impl From<FormatArg> for ImportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => ImportFormat::Json,
            FormatArg::Csv => ImportFormat::Csv,
        }
    }
}

impl Cli {
    pub fn run() -> anyhow::Result<()> {
        let cli = Self::parse();
        let app = TrackerApp::new()?;
        let today = Local::now().naive_local().date();

        match cli.command {
            Some(Commands::Add { weight, date }) => {
                let target_date = match date {
                    Some(date_str) => parse_entry_date(&date_str)?,
                    None => today,
                };

                let entry = app.add_weight(target_date, &weight)?;
                println!("Saved {}", entry);
            }
            Some(Commands::Edit {
                date,
                weight,
                to_date,
            }) => {
                let to_date = to_date.as_deref().map(parse_entry_date).transpose()?;
                let entry = app.edit_weight(parse_entry_date(&date)?, &weight, to_date)?;
                println!("Updated {}", entry);
            }
            Some(Commands::Delete { date }) => {
                let target_date = parse_entry_date(&date)?;
                if app.delete_weight(target_date)? {
                    println!("Deleted entry for {}", target_date);
                } else {
                    println!("No entry for {}", target_date);
                }
            }
            Some(Commands::Trend {
                period,
                forecast_days,
            }) => {
                let report = app.trend_report(period.into(), today, forecast_days);
                print_trend(&report);
            }
            Some(Commands::Export { format, output }) => {
                let now = Local::now().naive_local();
                let path = app.export(format.into(), output.as_deref(), now)?;
                println!("Backup written to {}", path.display());
            }
            Some(Commands::Import { path, format }) => {
                let summary = app.import(&path, format.map(Into::into))?;
                println!(
                    "Imported {} entries ({} skipped), {} stored",
                    summary.accepted, summary.skipped, summary.total
                );
            }
            Some(Commands::List) | None => {
                print_entries(&app, today);
            }
        }

        Ok(())
    }
}

fn print_entries(app: &TrackerApp, today: NaiveDate) {
    let entries = app.entries();
    if entries.is_empty() {
        println!("No entries yet. Record one with `peso-tracker add <weight>`.");
        return;
    }

    for entry in &entries {
        let marker = if entry.calendar_date() == Some(today) { " *" } else { "" };
        println!("{}{}", entry, marker);
    }
    println!("\n{} entries", entries.len());
}

fn print_trend(report: &TrendReport) {
    println!("=== {} ===", report.period.label());

    if report.entries.is_empty() {
        println!("No entries in this period.");
        return;
    }
    println!("{} entries", report.entries.len());

    if let Some(change) = report.change {
        let arrow = if change > 0.0 { '▲' } else { '▼' };
        println!("Change: {} {:.1} kg", arrow, change.abs());
    }

    let Some(trend) = report.trend else {
        println!("Not enough entries for a trend.");
        return;
    };
    println!("Trend: {:+.2} kg/week", trend.weekly_rate());
    if let Some((target, weight)) = report.forecast {
        println!("Forecast for {}: {:.1} kg", target, weight);
    }
}

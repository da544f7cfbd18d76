use std::{fs, path::PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Text};

use itinerary_core::{
    Config, Itinerary, ItineraryStore, ServerConfig, budget, report, schedule,
};

use crate::serve_cmd;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "itinerary", version, about = "Trip itinerary CLI")]
pub struct Cli {
    /// Itinerary JSON file. Overrides `ITINERARY_DATA_FILE` and the config file.
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the data file and server address.
    Configure,

    /// Print a summary of the trip.
    Show,

    /// Print the itinerary document as JSON.
    Get,

    /// Replace the stored itinerary with a JSON document.
    Import {
        /// Path to a complete itinerary document.
        file: PathBuf,
    },

    /// Write the itinerary spreadsheet.
    Export {
        /// Output path; defaults to `Trip_Itinerary.xlsx` in the current directory.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List priced items and totals in the home currency.
    Budget,

    /// Move the trip to a new date range, adding or dropping days.
    Reschedule {
        /// First day, YYYY-MM-DD.
        #[arg(long)]
        start: NaiveDate,

        /// Last day (inclusive), YYYY-MM-DD.
        #[arg(long)]
        end: NaiveDate,
    },

    /// Serve the itinerary API for the web front-end.
    Serve {
        #[arg(long)]
        bind: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let path = config.resolve_data_file(self.data_file.as_deref())?;
        let store = ItineraryStore::new(path);

        match self.command {
            Command::Configure => configure(config)?,
            Command::Show => print_summary(&store.load()),
            Command::Get => println!("{}", store.load().to_pretty_json()?),
            Command::Import { file } => {
                let raw = fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let doc = store
                    .save_json(&raw)
                    .with_context(|| format!("Failed to import {}", file.display()))?;
                println!(
                    "Saved \"{}\" ({} days) to {}",
                    doc.trip_meta.title,
                    doc.days.len(),
                    store.path().display()
                );
            }
            Command::Export { output } => {
                let report = report::export(&store)?;
                let output = output.unwrap_or_else(|| PathBuf::from(report.filename));
                fs::write(&output, &report.bytes)
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                println!("Exported itinerary to {}", output.display());
            }
            Command::Budget => print_budget(&store.load()),
            Command::Reschedule { start, end } => {
                let mut doc = store.load();
                schedule::reschedule(&mut doc, start, end)?;
                store.save(&doc)?;
                println!(
                    "Trip now runs {start} to {end} ({} days)",
                    doc.trip_meta.days_count
                );
            }
            Command::Serve { bind, port } => {
                let defaults = config.server;
                let bind = bind.unwrap_or(defaults.bind);
                let port = port.unwrap_or(defaults.port);
                serve_cmd::run_serve(store, &bind, port).await?;
            }
        }

        Ok(())
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let current = config.resolve_data_file(None)?;

    let data_file = Text::new("Itinerary data file:")
        .with_default(&current.display().to_string())
        .prompt()?;
    let bind = Text::new("Server bind address:")
        .with_default(&config.server.bind)
        .prompt()?;
    let port = CustomType::<u16>::new("Server port:")
        .with_default(config.server.port)
        .with_error_message("Please enter a port number between 0 and 65535")
        .prompt()?;

    config.data_file = Some(PathBuf::from(data_file.trim()));
    config.server = ServerConfig {
        bind: bind.trim().to_string(),
        port,
    };
    config.save()?;

    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

fn print_summary(doc: &Itinerary) {
    let meta = &doc.trip_meta;
    let dates = match (meta.parsed_start_date(), meta.end_date()) {
        (Some(start), Some(end)) => format!("{start} to {end}"),
        _ => meta.start_date.clone(),
    };

    println!("{}", meta.title);
    println!(
        "{} | {dates} | {} days | {} travelers | budget {} {}",
        meta.location, meta.days_count, meta.travelers, meta.budget, meta.home_currency
    );
    println!();
    for day in &doc.days {
        println!(
            "Day {:>2}  {}  {}  ({} stops)",
            day.day_number,
            day.date,
            day.theme,
            day.stops.len()
        );
    }
}

fn print_budget(doc: &Itinerary) {
    let meta = &doc.trip_meta;
    let home = &meta.home_currency;

    for item in budget::expenses(doc) {
        println!(
            "{:<18} {:<4} {:<24} {:>10} {:<4} ~ {:>8} {home}",
            item.date,
            item.category,
            item.name,
            item.cost,
            item.currency,
            meta.to_home(item.cost, &item.currency),
        );
    }

    let summary = budget::summary(doc);
    println!();
    for (category, sum) in &summary.per_category {
        println!("{category}: {sum} {home}");
    }
    println!(
        "Total: {} {home} of {} {home} ({} remaining)",
        summary.total_home, summary.budget, summary.remaining
    );
}

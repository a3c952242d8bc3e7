//! Command line interface for downloading JMA observation tables as CSV.

use amedas::{Amedas, AmedasError, ClientOptions, Granularity, DEFAULT_OUT_DIR};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_STATIONS: [&str; 9] = [
    "札幌",
    "仙台",
    "東京",
    "名古屋",
    "金沢",
    "大阪",
    "広島",
    "高松(香川県)",
    "福岡",
];

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory the station table is cached in
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Read the station table from this file instead of downloading it
    #[arg(long, global = true)]
    station_list: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download observations for one or more stations
    Fetch {
        /// Station names; defaults to a list of major cities
        stations: Vec<String>,

        /// Group (prefecture / region) narrowing every station name
        #[arg(long)]
        group: Option<String>,

        #[arg(long, default_value_t = Granularity::Hourly)]
        granularity: Granularity,

        /// First day, YYYY-MM-DD. Defaults to the day before --end
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day, YYYY-MM-DD. Defaults to today (UTC)
        #[arg(long)]
        end: Option<NaiveDate>,

        #[arg(long, default_value = DEFAULT_OUT_DIR)]
        out_dir: PathBuf,

        /// Also write all pages of a station to a single CSV file
        #[arg(long)]
        combined: bool,
    },
    /// List stations whose name contains FRAGMENT
    Stations { fragment: Option<String> },
    /// Delete the cached station table
    ClearCache,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn load_client(
    cache_dir: Option<PathBuf>,
    station_list: Option<PathBuf>,
) -> Result<Amedas, AmedasError> {
    let options = ClientOptions::builder()
        .maybe_cache_dir(cache_dir)
        .maybe_station_list_path(station_list)
        .build();
    Amedas::with_options(options).await
}

async fn run(cli: Cli) -> Result<(), AmedasError> {
    match cli.command {
        Commands::Fetch {
            stations,
            group,
            granularity,
            start,
            end,
            out_dir,
            combined,
        } => {
            let client = load_client(cli.cache_dir, cli.station_list).await?;
            let stations = if stations.is_empty() {
                DEFAULT_STATIONS.iter().map(|s| s.to_string()).collect()
            } else {
                stations
            };

            for station in &stations {
                let result = client
                    .fetch()
                    .station(station)
                    .granularity(granularity)
                    .maybe_group(group.as_deref())
                    .maybe_start(start)
                    .maybe_end(end)
                    .out_dir(&out_dir)
                    .combined(combined)
                    .call()
                    .await;
                match result {
                    Ok(frame) => println!("{}: {} rows", station, frame.height()),
                    Err(e) => error!("Skipping {}: {}", station, e),
                }
            }
        }
        Commands::Stations { fragment } => {
            let client = load_client(cli.cache_dir, cli.station_list).await?;
            let stations = match fragment.as_deref() {
                Some(fragment) => client.search_stations(fragment),
                None => client.stations().iter().collect(),
            };
            for station in stations {
                println!("{}", station);
            }
        }
        Commands::ClearCache => {
            let removed = Amedas::clear_cache_dir(cli.cache_dir.as_deref()).await?;
            if removed {
                println!("Station cache removed");
            } else {
                println!("No station cache found");
            }
        }
    }

    Ok(())
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the seismiq risk engine.
//!
//! Loads a KOERI-style catalog, then scores single points, aggregates heat,
//! scans the regional grid or runs the recall/precision backtests. Long
//! scans run on a blocking thread under an optional deadline; when it
//! expires the scan is cancelled cooperatively.
//!
//! Uses `indicatif-log-bridge` (via [`seismiq_cli_utils::init_logger`]) so
//! that `log` output and progress bars share the terminal.

mod location;
mod output;

use std::{path::PathBuf, sync::Arc, time::Duration};

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use seismiq_backtest::Backtester;
use seismiq_catalog::{Catalog, WindowEntry, loader};
use seismiq_cli_utils::IndicatifProgress;
use seismiq_engine::{RiskEngine, TemporalAggregator};
use seismiq_engine_models::config::SeismiqConfig;
use seismiq_faults::FaultRegistry;
use seismiq_gazetteer::Gazetteer;
use seismiq_scan::{CancelToken, GridScanner};

use crate::location::{Location, reference_time};

#[derive(Parser)]
#[command(name = "seismiq", about = "Statistical seismic risk scoring for Türkiye")]
struct Cli {
    /// Earthquake catalog in KOERI text format
    #[arg(long, env = "SEISMIQ_CATALOG", default_value = "catalog.txt", global = true)]
    catalog: PathBuf,
    /// TOML file overriding engine, grid and backtest parameters
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single point at a reference date
    Score {
        #[command(flatten)]
        location: Location,
        /// Reference date (YYYY-MM-DD); defaults to now
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Also list catalog events within the analysis radius
        #[arg(long)]
        history: bool,
    },
    /// Weighted multi-interval heat of a single point
    Heat {
        #[command(flatten)]
        location: Location,
        /// Reference date (YYYY-MM-DD); defaults to now
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Also list catalog events within the analysis radius
        #[arg(long)]
        history: bool,
    },
    /// Scan the regional grid and rank cells by heat
    Scan {
        /// Reference date (YYYY-MM-DD); defaults to now
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Maximum number of report rows to print
        #[arg(long, default_value = "25")]
        limit: usize,
        /// Cancel the scan after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Replay the engine before every large catalog event
    Recall,
    /// Scan at random instants and check alarms against later events
    Precision {
        /// Number of random instants (overrides the config)
        #[arg(long)]
        samples: Option<usize>,
        /// Seed for choosing the instants (overrides the config)
        #[arg(long)]
        seed: Option<u64>,
        /// Cancel after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// List provinces, or the districts of one province
    Places {
        /// Province name
        province: Option<String>,
    },
    /// List the built-in active fault segments
    Faults,
}

/// Immutable inputs shared with blocking worker threads.
#[derive(Clone)]
struct Session {
    catalog: Arc<Catalog>,
    faults: Arc<FaultRegistry>,
    config: Arc<SeismiqConfig>,
}

impl Session {
    fn open(cli: &Cli, config: SeismiqConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let events = loader::load(&cli.catalog)?;
        Ok(Self {
            catalog: Arc::new(Catalog::new(events)?),
            faults: Arc::new(FaultRegistry::builtin()),
            config: Arc::new(config),
        })
    }

    fn engine(&self) -> RiskEngine<'_> {
        RiskEngine::new(&self.catalog, &self.faults, &self.config.risk)
    }

    fn aggregator(&self) -> TemporalAggregator<'_> {
        TemporalAggregator::new(self.engine(), &self.config.heat)
    }

    /// Catalog events around a point, when requested.
    fn history(
        &self,
        wanted: bool,
        lat: f64,
        lon: f64,
        now: DateTime<Utc>,
    ) -> Option<Vec<WindowEntry<'_>>> {
        wanted.then(|| {
            self.catalog
                .history(lat, lon, self.config.risk.analysis_radius_km, now)
        })
    }
}

/// Runs `work` on a blocking thread. When `timeout` elapses first, trips
/// `cancel` and waits for the work to wind down.
async fn run_blocking<T, E, F>(
    timeout: Option<u64>,
    cancel: CancelToken,
    work: F,
) -> Result<T, Box<dyn std::error::Error>>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: std::error::Error + Send + 'static,
{
    let mut handle = tokio::task::spawn_blocking(work);

    let joined = match timeout {
        Some(secs) => tokio::select! {
            joined = &mut handle => joined,
            () = tokio::time::sleep(Duration::from_secs(secs)) => {
                log::warn!("Deadline of {secs}s reached, cancelling");
                cancel.cancel();
                handle.await
            }
        },
        None => handle.await,
    };

    Ok(joined??)
}

fn load_config(cli: &Cli) -> Result<SeismiqConfig, Box<dyn std::error::Error>> {
    match &cli.config {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            Ok(SeismiqConfig::load(path)?)
        }
        None => Ok(SeismiqConfig::default()),
    }
}

#[allow(clippy::too_many_lines)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = seismiq_cli_utils::init_logger();
    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match &cli.command {
        Commands::Places { province } => {
            let gazetteer = Gazetteer::builtin();
            match province {
                Some(name) => {
                    let districts = gazetteer
                        .districts(name)
                        .ok_or_else(|| format!("Unknown province: {name}"))?;
                    for district in districts {
                        println!(
                            "{:<28} {:>6.2} {:>6.2}",
                            district.name,
                            district.latitude(),
                            district.longitude()
                        );
                    }
                }
                None => {
                    for province in gazetteer.provinces() {
                        println!("{:<16} {} districts", province.name, province.districts.len());
                    }
                }
            }
            return Ok(());
        }
        Commands::Faults => {
            output::print_faults(&FaultRegistry::builtin());
            return Ok(());
        }
        Commands::Precision { samples, seed, .. } => {
            if let Some(samples) = samples {
                config.backtest.precision_samples = *samples;
            }
            if let Some(seed) = seed {
                config.backtest.seed = *seed;
            }
        }
        _ => {}
    }

    let session = Session::open(&cli, config)?;

    match cli.command {
        Commands::Score {
            location,
            date,
            history,
        } => {
            let (lat, lon) = location.resolve()?;
            let now = reference_time(date);
            let score = session.engine().score(lat, lon, now);
            let history = session.history(history, lat, lon, now);
            if cli.json {
                output::print_json(&output::WithHistory {
                    result: &score,
                    history: history.as_deref(),
                })?;
            } else {
                output::print_score(
                    &location.label(lat, lon),
                    &now.format("%Y-%m-%d").to_string(),
                    &score,
                );
                if let Some(history) = &history {
                    output::print_history(session.config.risk.analysis_radius_km, history);
                }
            }
        }
        Commands::Heat {
            location,
            date,
            history,
        } => {
            let (lat, lon) = location.resolve()?;
            let now = reference_time(date);
            let timeline = session.aggregator().timeline(lat, lon, now);
            let history = session.history(history, lat, lon, now);
            if cli.json {
                output::print_json(&output::WithHistory {
                    result: &timeline,
                    history: history.as_deref(),
                })?;
            } else {
                output::print_timeline(&location.label(lat, lon), &timeline);
                if let Some(history) = &history {
                    output::print_history(session.config.risk.analysis_radius_km, history);
                }
            }
        }
        Commands::Scan {
            date,
            limit,
            timeout,
        } => {
            let now = reference_time(date);
            let cancel = CancelToken::new();
            let progress = IndicatifProgress::cells_bar(&multi, "Scanning grid");
            let worker = session.clone();
            let token = cancel.clone();

            let scan = run_blocking(timeout, cancel, move || {
                GridScanner::new(worker.aggregator(), &worker.config.grid)?
                    .scan_with(now, &progress, &token)
            })
            .await?;

            if cli.json {
                output::print_json(&scan)?;
            } else {
                output::print_scan(&scan, limit);
            }
        }
        Commands::Recall => {
            let progress = IndicatifProgress::events_bar(&multi, "Recall");
            let worker = session.clone();

            let report = run_blocking(None, CancelToken::new(), move || {
                let config = &worker.config;
                Backtester::new(worker.aggregator(), &config.grid, &config.backtest)
                    .map(|backtester| backtester.recall(&progress))
            })
            .await?;

            if cli.json {
                output::print_json(&output::Summary {
                    rate: report.recall(),
                    report: &report,
                })?;
            } else {
                output::print_recall(&report);
            }
        }
        Commands::Precision { timeout, .. } => {
            let cancel = CancelToken::new();
            let progress = IndicatifProgress::cells_bar(&multi, "Precision");
            let worker = session.clone();
            let token = cancel.clone();

            let report = run_blocking(timeout, cancel, move || {
                let config = &worker.config;
                Backtester::new(worker.aggregator(), &config.grid, &config.backtest)?
                    .precision(&progress, &token)
            })
            .await?;

            if cli.json {
                output::print_json(&output::Summary {
                    rate: report.precision(),
                    report: &report,
                })?;
            } else {
                output::print_precision(&report);
            }
        }
        Commands::Places { .. } | Commands::Faults => {}
    }

    multi.clear().ok();
    Ok(())
}

//! CLI demos for the tally shared-container library.
//!
//! Provides one subcommand per instantiation: a simulated multi-sensor
//! temperature run and a producer/consumer registry exchange.

use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tally::registry::run_exchange;
use tally::{CollectorConfig, ExchangeConfig, collector};

/// tally — mutex-guarded shared container demos.
#[derive(Parser)]
#[command(name = "tally", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the multi-sensor temperature simulation and print bucket reports.
    Sensors {
        /// Number of sensor threads.
        #[arg(long, default_value = "8")]
        sensors: usize,

        /// Milliseconds between samples on each sensor.
        #[arg(long, default_value = "50")]
        cadence_ms: u64,

        /// Bucket width in seconds.
        #[arg(long, default_value = "3600")]
        bucket_secs: u64,

        /// Number of reports to compile before shutting down.
        #[arg(long, default_value = "10")]
        reports: usize,

        /// Milliseconds between report cycles.
        #[arg(long, default_value = "1000")]
        interval_ms: u64,

        /// Output format.
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Run the ordered-registry exchange and print the summary.
    Exchange {
        /// Number of keys to insert (and removal requests to issue).
        #[arg(long, default_value = "50000")]
        items: u64,

        /// Number of producer threads.
        #[arg(long, default_value = "4")]
        producers: usize,

        /// Number of consumer threads.
        #[arg(long, default_value = "4")]
        consumers: usize,

        /// Output format.
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format for command results.
#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sensors {
            sensors,
            cadence_ms,
            bucket_secs,
            reports,
            interval_ms,
            format,
        } => cmd_sensors(sensors, cadence_ms, bucket_secs, reports, interval_ms, &format),
        Commands::Exchange {
            items,
            producers,
            consumers,
            format,
        } => cmd_exchange(items, producers, consumers, &format),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Implements `tally sensors`.
fn cmd_sensors(
    sensors: usize,
    cadence_ms: u64,
    bucket_secs: u64,
    reports: usize,
    interval_ms: u64,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = CollectorConfig {
        sensors,
        cadence: Duration::from_millis(cadence_ms),
        bucket_interval: Duration::from_secs(bucket_secs),
        report_cycles: reports,
        report_interval: Duration::from_millis(interval_ms),
    };

    tracing::info!("starting {sensors} sensor(s), {reports} report cycle(s)");

    // Simulated atmospheric temperatures in °F.
    let compiled = collector::run_simulation(&config, |_sensor| {
        // ThreadRng is not Send; each sensor gets its own seeded StdRng.
        let mut rng = StdRng::from_entropy();
        move || rng.gen_range(-100.0..70.0)
    })?;

    match format {
        OutputFormat::Text => {
            for report in &compiled {
                print_bucket_report(report);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&compiled)?);
        }
    }

    Ok(())
}

/// Prints one bucket report in the traditional hourly-report shape.
fn print_bucket_report(report: &tally::BucketReport) {
    println!("Report for bucket {}:", report.bucket);

    println!("  Top {} highest readings:", report.highest.len());
    for reading in &report.highest {
        println!(
            "    value: {:.2}, timestamp_ns: {}",
            reading.value, reading.timestamp_ns
        );
    }

    println!("  Top {} lowest readings:", report.lowest.len());
    for reading in &report.lowest {
        println!(
            "    value: {:.2}, timestamp_ns: {}",
            reading.value, reading.timestamp_ns
        );
    }

    match &report.max_jump {
        Some(jump) => println!(
            "  Largest jump: {:.2} between timestamps {} and {}",
            jump.difference, jump.start_ns, jump.end_ns
        ),
        None => println!("  Largest jump: n/a (fewer than two readings)"),
    }
    println!();
}

/// Implements `tally exchange`.
fn cmd_exchange(
    items: u64,
    producers: usize,
    consumers: usize,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ExchangeConfig {
        producers,
        consumers,
    };

    let inserts: Vec<(u64, ())> = (1..=items).map(|key| (key, ())).collect();
    let removals: Vec<u64> = (1..=items).collect();

    tracing::info!("starting exchange: {items} item(s), {producers}p/{consumers}c");

    let summary = run_exchange(&config, inserts, removals)?;

    match format {
        OutputFormat::Text => {
            println!("Duration: {:?}", summary.elapsed);
            println!(
                "Inserted: {}, removed: {}, remaining: {}",
                summary.inserted, summary.removed, summary.remaining
            );
            if summary.remaining > summary.removed {
                println!("More items remain registered than were removed.");
            } else {
                println!("More items were removed than remain registered.");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

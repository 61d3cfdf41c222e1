use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pricing_feed::config::LocalConfig;
use pricing_feed::error::{self, ConfigError};
use pricing_feed::pricing::{self, CachePriceOutcome, PgNotifyPricingCache, RecordingPricingCache};
use pricing_feed::{db, export};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "pricing-feed")]
#[command(about = "Exports asset, cost and usage data for the pricing system", long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply the reference schema to the configured database
    Migrate,
    Ventures,
    Devices,
    PhysicalCores,
    VirtualUsages {
        /// Only virtual servers hosted on devices of this venture
        #[arg(long, value_name = "NAME")]
        parent_venture: Option<String>,
    },
    Shares,
    ExtraCosts,
    DevicesHistory {
        #[arg(long, value_name = "YYYY-MM-DD")]
        start: NaiveDate,
        #[arg(long, value_name = "YYYY-MM-DD")]
        end: NaiveDate,
    },
    DeviceByName {
        name: String,
    },
    IpAddresses {
        #[arg(long)]
        public: bool,
    },
    /// Refresh the cached price of the device owning an IP address
    CachePrice {
        address: String,
        /// Resolve the device without notifying the pricing system
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> error::Result<()> {
    let config = LocalConfig::from_file(&args.config)?;

    setup_logging(&config)?;

    info!(
        "Database: {}:{}/{}",
        config.database.host, config.database.port, config.database.name
    );

    let pool = db::create_pool(config.database_url()).await?;
    debug!("Database connection established");

    match args.command {
        Command::Migrate => {
            info!("Running database migrations...");
            db::run_migrations(&pool).await?;
            info!("Database migrations completed");
        }
        Command::Ventures => write_records(export::get_ventures(&pool).await?)?,
        Command::Devices => write_records(export::get_devices(&pool).await?)?,
        Command::PhysicalCores => write_records(export::get_physical_cores(&pool).await?)?,
        Command::VirtualUsages { parent_venture } => write_records(
            export::get_virtual_usages(&pool, parent_venture.as_deref()).await?,
        )?,
        Command::Shares => write_records(export::get_shares(&pool).await?)?,
        Command::ExtraCosts => write_records(export::get_extra_cost(&pool).await?)?,
        Command::DevicesHistory { start, end } => {
            write_records(export::devices_history(&pool, start, end).await?)?
        }
        Command::DeviceByName { name } => match export::get_device_by_name(&pool, &name).await? {
            Some(lookup) => write_value(&lookup)?,
            None => write_value(&serde_json::json!({}))?,
        },
        Command::IpAddresses { public } => {
            write_value(&export::get_ip_addresses(&pool, public).await?)?
        }
        Command::CachePrice { address, dry_run } => {
            let trace_id = Uuid::new_v4().to_string();
            let outcome = if dry_run {
                let cache = RecordingPricingCache::new();
                pricing::run_job(&pool, &cache, &address, &trace_id).await?
            } else {
                let cache =
                    PgNotifyPricingCache::new(pool.clone(), config.pricing.notify_channel.clone());
                pricing::run_job(&pool, &cache, &address, &trace_id).await?
            };

            match outcome {
                CachePriceOutcome::AddressNotFound => info!("No such address: {}", address),
                CachePriceOutcome::NoDevice => info!("Address {} has no device", address),
                CachePriceOutcome::Refreshed { device_id } if dry_run => {
                    info!("Would refresh cached price of device {}", device_id)
                }
                CachePriceOutcome::Refreshed { device_id } => {
                    info!("Refreshed cached price of device {}", device_id)
                }
            }
        }
    }

    Ok(())
}

fn write_records<T, I>(records: I) -> error::Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut count = 0usize;

    for record in records {
        serde_json::to_writer(&mut out, &record)?;
        out.write_all(b"\n")?;
        count += 1;
    }
    out.flush()?;

    debug!("Wrote {} records", count);
    Ok(())
}

fn write_value<T: Serialize>(value: &T) -> error::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer(&mut out, value)?;
    out.write_all(b"\n")?;
    Ok(())
}

// Records go to stdout, so the console layer logs to stderr.
fn setup_logging(config: &LocalConfig) -> error::Result<()> {
    let log_file = Path::new(&config.client.log_file);
    let (directory, file_name) = match (log_file.parent(), log_file.file_name()) {
        (Some(directory), Some(file_name)) => (directory, file_name),
        _ => {
            return Err(ConfigError::ValidationFailed(format!(
                "Log file must have a parent directory and a filename: {}",
                config.client.log_file
            ))
            .into())
        }
    };
    let file_appender = tracing_appender::rolling::daily(directory, file_name);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| ConfigError::ValidationFailed(format!("Invalid log filter: {}", e)))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(file_appender))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

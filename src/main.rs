//! Binary entrypoint for the barterchest admin CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml`
//! - `status` - list persisted shops per world
//! - `show <world> <x> <y> <z>` - print one stored shop record as JSON
//!
//! See the library crate docs for module-level details: `barterchest::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::info;

use barterchest::barter::{BarterStore, BlockPos, ShopState};
use barterchest::config::Config;
use barterchest::barter::item::display_name;

#[derive(Parser)]
#[command(name = "barterchest")]
#[command(about = "Inspect and administer player-run barter shops")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// List persisted shops for every world
    Status,
    /// Print one shop record
    Show {
        world: String,
        #[arg(allow_hyphen_values = true)]
        x: i32,
        #[arg(allow_hyphen_values = true)]
        y: i32,
        #[arg(allow_hyphen_values = true)]
        z: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Init => {
            info!("Initializing new barterchest configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
            println!("Wrote {}", cli.config);
        }
        Commands::Status => {
            let config = match pre_config {
                Some(config) => config,
                None => Config::load(&cli.config).await?,
            };
            let store = BarterStore::open(config.storage.shops_path())?;
            let worlds = store.list_worlds()?;
            if worlds.is_empty() {
                println!("No shops stored under {}", config.storage.shops_path().display());
            }
            for world in worlds {
                let shops = store.list_shops(&world)?;
                println!("{} ({} shops)", world, shops.len());
                for (pos, shop) in shops {
                    println!("  {} {}", pos, summarize(&shop));
                }
            }
        }
        Commands::Show { world, x, y, z } => {
            let config = match pre_config {
                Some(config) => config,
                None => Config::load(&cli.config).await?,
            };
            let store = BarterStore::open(config.storage.shops_path())?;
            let pos = BlockPos::new(x, y, z);
            let shop = store
                .get_shop(&world, pos)
                .map_err(|e| anyhow!("No shop at {} {}: {}", world, pos, e))?;
            println!("{}", serde_json::to_string_pretty(&shop)?);
        }
    }

    Ok(())
}

fn summarize(shop: &ShopState) -> String {
    let trade = match shop.primary_listing() {
        Some(listing) if listing.is_configured() => format!(
            "{} for {} (buy {}, sell {})",
            display_name(listing.item_id.as_deref().unwrap_or_default()),
            display_name(listing.currency_item_id.as_deref().unwrap_or_default()),
            listing.buy_price,
            listing.sell_price
        ),
        _ => "not configured".to_string(),
    };
    format!(
        "{} - {} - earned {}",
        shop.display_name(),
        trade,
        shop.total_earnings()
    )
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|cfg| cfg.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    let log_file = config.as_ref().and_then(|cfg| cfg.logging.file.clone());
    let opened = log_file.and_then(|file| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .ok()
    });
    if let Some(f) = opened {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Mirror to the console only when attached to a terminal
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}

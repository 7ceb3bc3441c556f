//! # Configuration Management Module
//!
//! Central configuration for the barter shop system: currencies offered on the
//! config surface, price step, admin permission, license item, display entity
//! placement, storage location and logging.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use barterchest::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.json").await?;
//!     println!("Default currency: {}", config.shop.default_currency);
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## File Format
//!
//! Files ending in `.json` are read as JSON, anything else as TOML. Every section
//! and field is optional and falls back to the defaults below.
//!
//! ```toml
//! [shop]
//! default_currency = "Ingredient_Bar_Copper"
//! price_increment = 1
//!
//! [[shop.currencies]]
//! item_id = "Ingredient_Bar_Copper"
//! display_name = "Copper Bar"
//!
//! [license]
//! item_id = "Barter_License"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

use crate::barter::item::{self, StaticCatalog, DEFAULT_MAX_STACK};

/// A currency choice offered on the config surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyOption {
    pub item_id: String,
    pub display_name: String,
}

impl CurrencyOption {
    pub fn new(item_id: &str, display_name: &str) -> Self {
        Self {
            item_id: item_id.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

fn default_currencies() -> Vec<CurrencyOption> {
    vec![
        CurrencyOption::new("Ingredient_Bar_Copper", "Copper Bar"),
        CurrencyOption::new("Ingredient_Bar_Iron", "Iron Bar"),
        CurrencyOption::new("Ingredient_Bar_Silver", "Silver Bar"),
        CurrencyOption::new("Ingredient_Bar_Gold", "Gold Bar"),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Currency preselected on a fresh listing.
    pub default_currency: String,
    /// Step applied by the price +/- buttons.
    pub price_increment: u32,
    /// Permission that, together with admin mode, allows managing any shop.
    pub admin_permission: String,
    pub default_max_stack: u32,
    /// Currency buttons shown on the config surface (first four are used).
    pub currencies: Vec<CurrencyOption>,
    /// Per-item stack limits, e.g. tools at 1.
    pub max_stack_overrides: HashMap<String, u32>,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            default_currency: "Ingredient_Bar_Copper".to_string(),
            price_increment: 1,
            admin_permission: "barterchest.admin".to_string(),
            default_max_stack: DEFAULT_MAX_STACK,
            currencies: default_currencies(),
            max_stack_overrides: HashMap::new(),
        }
    }
}

impl ShopConfig {
    /// Configured currencies, or the built-in bars when the list is empty.
    pub fn currency_options(&self) -> Vec<CurrencyOption> {
        if self.currencies.is_empty() {
            default_currencies()
        } else {
            self.currencies.clone()
        }
    }

    /// Name shown to players for a currency item.
    pub fn currency_display_name(&self, item_id: &str) -> String {
        self.currency_options()
            .into_iter()
            .find(|c| c.item_id == item_id)
            .map(|c| c.display_name)
            .unwrap_or_else(|| item::display_name(item_id))
    }

    pub fn price_step(&self) -> u32 {
        self.price_increment.max(1)
    }

    pub fn catalog(&self) -> StaticCatalog {
        StaticCatalog::from_overrides(self.default_max_stack, &self.max_stack_overrides)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    pub item_id: String,
    pub display_name: String,
    pub description: String,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            item_id: "Barter_License".to_string(),
            display_name: "Barter License".to_string(),
            description: "Use on a chest to create a barter shop".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Height above the block origin where the floating item hovers.
    pub height_offset: f64,
    pub lifetime_secs: u64,
    /// Search radius of the `cleanup` admin command.
    pub cleanup_radius: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            height_offset: 1.5,
            lifetime_secs: 86_400,
            cleanup_radius: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn shops_path(&self) -> std::path::PathBuf {
        Path::new(&self.data_dir).join("shops")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub shop: ShopConfig,
    pub license: LicenseConfig,
    pub display: DisplayConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

fn is_json(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;
        Self::parse(path, &content)
    }

    /// Parse configuration text, choosing the format from the file name.
    pub fn parse(path: &str, content: &str) -> Result<Self> {
        let config: Config = if is_json(path) {
            serde_json::from_str(content)
                .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?
        } else {
            toml::from_str(content)
                .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?
        };
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = if is_json(path) {
            serde_json::to_string_pretty(&config)
                .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?
        } else {
            toml::to_string_pretty(&config)
                .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?
        };
        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;
        Ok(())
    }
}

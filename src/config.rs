//! Configuration
//!
//! Layered as: `.env` (via dotenvy) → TOML file → `DAILY_BIAS__SECTION__KEY`
//! environment overrides. The Discord token falls back to `DISCORD_TOKEN`.

use crate::analysis::MIN_CANDLES;
use crate::error::{BotError, Result};
use crate::notify::embed::MAX_FIELDS;
use chrono::NaiveTime;
use serde::Deserialize;
use std::path::PathBuf;

/// Largest `limit` the klines endpoint accepts
pub const MAX_KLINE_LIMIT: u32 = 1000;

/// Longest accepted `schedule.interval_hours` (one year)
pub const MAX_INTERVAL_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default = "default_discord_api")]
    pub api_base: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel_id: String::new(),
            api_base: default_discord_api(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_market_url")]
    pub base_url: String,
    /// Bar interval passed to the klines endpoint
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Number of candles requested per symbol
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: default_market_url(),
            interval: default_interval(),
            limit: default_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    /// Fixed period measured from the previous cycle
    #[default]
    Interval,
    /// Once a day at a UTC wall-clock time
    Daily,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub mode: ScheduleMode,
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,
    /// `HH:MM` in UTC
    #[serde(default = "default_daily_at")]
    pub daily_at: String,
    /// Run one cycle as soon as the bot starts
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            mode: ScheduleMode::default(),
            interval_hours: default_interval_hours(),
            daily_at: default_daily_at(),
            run_on_startup: true,
        }
    }
}

impl ScheduleConfig {
    pub fn daily_time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(&self.daily_at, "%H:%M").map_err(|e| {
            BotError::InvalidConfig(format!(
                "schedule.daily_at must be HH:MM, got {:?}: {}",
                self.daily_at, e
            ))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One plain message per asset, followed by its chart
    #[default]
    Text,
    /// One embed with a field per asset
    Embed,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetConfig {
    pub symbol: String,
    /// Display name, defaults to the symbol
    #[serde(default)]
    pub label: Option<String>,
}

impl AssetConfig {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            label: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.symbol)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,
    #[serde(default = "default_assets")]
    pub assets: Vec<AssetConfig>,
    /// Attach a candlestick chart (text format only)
    #[serde(default = "default_true")]
    pub charts: bool,
    /// Chart output path; `{symbol}` becomes `btcusdt`, `{asset}` becomes `btc`
    #[serde(default = "default_chart_path")]
    pub chart_path: String,
    #[serde(default = "default_chart_width")]
    pub chart_width: u32,
    #[serde(default = "default_chart_height")]
    pub chart_height: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::default(),
            assets: default_assets(),
            charts: true,
            chart_path: default_chart_path(),
            chart_width: default_chart_width(),
            chart_height: default_chart_height(),
        }
    }
}

impl ReportConfig {
    /// Resolved chart path for a symbol, with `~` expanded
    pub fn chart_path_for(&self, symbol: &str) -> PathBuf {
        let expanded = shellexpand::tilde(&self.chart_path);
        let lower = symbol.to_lowercase();
        let short = lower.strip_suffix("usdt").unwrap_or(&lower);
        PathBuf::from(
            expanded
                .replace("{symbol}", &lower)
                .replace("{asset}", short),
        )
    }

    pub fn wants_charts(&self) -> bool {
        self.charts && self.format == ReportFormat::Text
    }
}

fn default_discord_api() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_market_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_limit() -> u32 {
    30
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_interval_hours() -> u64 {
    24
}

fn default_daily_at() -> String {
    "00:00".to_string()
}

fn default_true() -> bool {
    true
}

fn default_assets() -> Vec<AssetConfig> {
    vec![AssetConfig::new("BTCUSDT")]
}

fn default_chart_path() -> String {
    "{asset}_daily.png".to_string()
}

fn default_chart_width() -> u32 {
    1200
}

fn default_chart_height() -> u32 {
    800
}

impl Config {
    /// Load from a TOML file (optional) plus environment overrides
    pub fn load(path: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::new(path, config::FileFormat::Toml).required(false))
            .add_source(
                config::Environment::with_prefix("DAILY_BIAS")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let mut config: Config = settings.try_deserialize()?;

        if config.discord.bot_token.is_empty() {
            if let Ok(token) = std::env::var("DISCORD_TOKEN") {
                config.discord.bot_token = token;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check settings that would otherwise fail mid-cycle
    pub fn validate(&self) -> Result<()> {
        if self.report.assets.is_empty() {
            return Err(BotError::InvalidConfig(
                "report.assets must list at least one symbol".into(),
            ));
        }

        for asset in &self.report.assets {
            let valid = !asset.symbol.is_empty()
                && asset
                    .symbol
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
            if !valid {
                return Err(BotError::InvalidConfig(format!(
                    "invalid symbol {:?}: expected an exchange ticker like BTCUSDT",
                    asset.symbol
                )));
            }
        }

        let limit = self.market.limit as usize;
        if limit < MIN_CANDLES || self.market.limit > MAX_KLINE_LIMIT {
            return Err(BotError::InvalidConfig(format!(
                "market.limit must be between {} and {}, got {}",
                MIN_CANDLES, MAX_KLINE_LIMIT, self.market.limit
            )));
        }

        if self.market.timeout_secs == 0 || self.discord.timeout_secs == 0 {
            return Err(BotError::InvalidConfig("timeouts must be non-zero".into()));
        }

        match self.schedule.mode {
            ScheduleMode::Interval
                if self.schedule.interval_hours == 0
                    || self.schedule.interval_hours > MAX_INTERVAL_HOURS =>
            {
                return Err(BotError::InvalidConfig(format!(
                    "schedule.interval_hours must be between 1 and {}, got {}",
                    MAX_INTERVAL_HOURS, self.schedule.interval_hours
                )));
            }
            ScheduleMode::Daily => {
                self.schedule.daily_time()?;
            }
            _ => {}
        }

        if self.report.format == ReportFormat::Embed && self.report.assets.len() > MAX_FIELDS {
            return Err(BotError::InvalidConfig(format!(
                "embed format holds at most {} assets, got {}",
                MAX_FIELDS,
                self.report.assets.len()
            )));
        }

        if self.report.wants_charts() {
            if self.report.chart_width < 100 || self.report.chart_height < 100 {
                return Err(BotError::InvalidConfig(
                    "chart dimensions must be at least 100x100".into(),
                ));
            }

            // Assets are rendered concurrently, so each needs its own file
            let per_asset = self.report.chart_path.contains("{symbol}")
                || self.report.chart_path.contains("{asset}");
            if self.report.assets.len() > 1 && !per_asset {
                return Err(BotError::InvalidConfig(
                    "report.chart_path must contain {symbol} or {asset} when charting several assets"
                        .into(),
                ));
            }
        }

        Ok(())
    }

    /// Credentials needed to actually post to Discord
    pub fn require_discord(&self) -> Result<()> {
        if self.discord.bot_token.is_empty() {
            return Err(BotError::InvalidConfig(
                "Discord token missing: set DISCORD_TOKEN or discord.bot_token".into(),
            ));
        }
        if self.discord.channel_id.is_empty()
            || !self.discord.channel_id.chars().all(|c| c.is_ascii_digit())
            || self.discord.channel_id.chars().all(|c| c == '0')
        {
            return Err(BotError::InvalidConfig(format!(
                "discord.channel_id must be a numeric channel id, got {:?}",
                self.discord.channel_id
            )));
        }
        Ok(())
    }
}

//! Report formatting
//!
//! Turns the per-asset outcome of one cycle into outbound chat messages.
//! Two shapes are available, selected by `report.format`:
//! - [`TextReport`]: one plain message per asset, each followed by its chart
//! - [`EmbedReport`]: a single embed with one field per asset

mod embed;
mod text;


pub use embed::EmbedReport;
pub use text::TextReport;

use crate::config::{AssetConfig, ReportConfig, ReportFormat};
use crate::notify::OutboundMessage;
use crate::types::BiasResult;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Shown in place of a bias when an asset could not be processed
pub const UNAVAILABLE: &str = "Data unavailable";

/// What started a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleTrigger {
    /// Immediate run when the bot comes up
    Startup,
    /// Recurring timer
    Scheduled,
}

/// Outcome for one configured asset
#[derive(Debug, Clone)]
pub struct AssetReport {
    pub asset: AssetConfig,
    /// Classification, or the error that prevented it
    pub outcome: Result<BiasResult, String>,
    pub chart: Option<PathBuf>,
}

/// Everything a formatter needs about one cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub trigger: CycleTrigger,
    pub started_at: DateTime<Utc>,
    /// Market data source name, e.g. "Binance"
    pub source: String,
    /// Bar interval, e.g. "1d"
    pub interval: String,
    pub assets: Vec<AssetReport>,
}

/// Renders a cycle into the messages to post
pub trait ReportFormatter: Send + Sync {
    fn format(&self, report: &CycleReport) -> Vec<OutboundMessage>;

    /// Whether the cycle should render charts for this formatter
    fn wants_charts(&self) -> bool {
        false
    }
}

/// Build the formatter selected by configuration
pub fn formatter_for(config: &ReportConfig) -> Box<dyn ReportFormatter> {
    match config.format {
        ReportFormat::Text => Box::new(TextReport::new(config.wants_charts())),
        ReportFormat::Embed => Box::new(EmbedReport::default()),
    }
}

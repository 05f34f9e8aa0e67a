//! Notification scheduler
//!
//! Owns the triggers and drives one cycle per firing:
//! fetch → classify → (render) → format → deliver, for every configured asset.
//! A startup trigger and the recurring trigger both feed [`BiasScheduler::run_cycle`].

mod trigger;

#[cfg(test)]
mod tests;

pub use trigger::Trigger;

use crate::analysis::classify;
use crate::chart::CandlestickRenderer;
use crate::client::MarketData;
use crate::config::{AssetConfig, Config, ReportConfig};
use crate::error::{BotError, Result};
use crate::notify::{deliver, ChatSink};
use crate::report::{formatter_for, AssetReport, CycleReport, CycleTrigger, ReportFormatter};
use crate::types::Series;
use chrono::Utc;
use futures_util::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Counts from one completed cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    pub trigger: CycleTrigger,
    pub assets: usize,
    pub failed_assets: usize,
    pub messages: usize,
    pub delivered: usize,
    pub failed_deliveries: usize,
}

impl CycleSummary {
    pub fn is_clean(&self) -> bool {
        self.failed_assets == 0 && self.failed_deliveries == 0
    }
}

/// Recurring bias notifier for a fixed asset list and destination
pub struct BiasScheduler {
    source: Arc<dyn MarketData>,
    sink: Arc<dyn ChatSink>,
    formatter: Box<dyn ReportFormatter>,
    renderer: CandlestickRenderer,
    report: ReportConfig,
    interval: String,
    lookback: u32,
    fetch_timeout: Duration,
    trigger: Trigger,
    run_on_startup: bool,
}

impl BiasScheduler {
    pub fn new(
        config: &Config,
        source: Arc<dyn MarketData>,
        sink: Arc<dyn ChatSink>,
    ) -> Result<Self> {
        Ok(Self {
            source,
            sink,
            formatter: formatter_for(&config.report),
            renderer: CandlestickRenderer::new(config.report.chart_width, config.report.chart_height),
            report: config.report.clone(),
            interval: config.market.interval.clone(),
            lookback: config.market.limit,
            fetch_timeout: Duration::from_secs(config.market.timeout_secs),
            trigger: Trigger::from_config(&config.schedule)?,
            run_on_startup: config.schedule.run_on_startup,
        })
    }

    /// Override the per-asset fetch bound
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn assets(&self) -> &[AssetConfig] {
        &self.report.assets
    }

    /// Run forever: one startup cycle (if enabled), then one per trigger firing
    pub async fn run(&self) {
        info!(
            "Scheduler started for {} asset(s), {}",
            self.report.assets.len(),
            self.trigger
        );

        if self.run_on_startup {
            self.run_cycle(CycleTrigger::Startup).await;
        }

        loop {
            let now = Utc::now();
            let next = self.trigger.next_fire(now);
            info!("Next cycle at {}", next.format("%Y-%m-%d %H:%M:%S UTC"));

            tokio::time::sleep(self.trigger.wait_from(now)).await;
            self.run_cycle(CycleTrigger::Scheduled).await;
        }
    }

    /// One full pass across all assets; never fails, problems are logged and counted
    pub async fn run_cycle(&self, trigger: CycleTrigger) -> CycleSummary {
        let span = info_span!("cycle", id = %Uuid::new_v4(), trigger = ?trigger);
        self.cycle(trigger).instrument(span).await
    }

    async fn cycle(&self, trigger: CycleTrigger) -> CycleSummary {
        let started_at = Utc::now();
        info!("📊 Starting bias cycle for {} asset(s)", self.report.assets.len());

        let assets = join_all(self.report.assets.iter().map(|a| self.process_asset(a))).await;
        let failed_assets = assets.iter().filter(|a| a.outcome.is_err()).count();

        let report = CycleReport {
            trigger,
            started_at,
            source: self.source.name().to_string(),
            interval: self.interval.clone(),
            assets,
        };
        let messages = self.formatter.format(&report);

        let mut summary = CycleSummary {
            trigger,
            assets: report.assets.len(),
            failed_assets,
            messages: messages.len(),
            delivered: 0,
            failed_deliveries: 0,
        };

        for message in &messages {
            match deliver(self.sink.as_ref(), message).await {
                Ok(()) => summary.delivered += 1,
                Err(e) => {
                    error!("Failed to deliver message: {}", e);
                    summary.failed_deliveries += 1;
                }
            }
        }

        info!(
            "Cycle finished: {}/{} assets ok, {}/{} messages delivered",
            summary.assets - summary.failed_assets,
            summary.assets,
            summary.delivered,
            summary.messages
        );
        summary
    }

    async fn process_asset(&self, asset: &AssetConfig) -> AssetReport {
        let symbol = asset.symbol.as_str();

        let fetched = tokio::time::timeout(self.fetch_timeout, self.source.fetch(symbol, self.lookback))
            .await
            .unwrap_or_else(|_| {
                Err(BotError::Timeout {
                    symbol: symbol.to_string(),
                    secs: self.fetch_timeout.as_secs(),
                })
            });

        let outcome = fetched.and_then(|series| classify(&series).map(|bias| (series, bias)));

        let (series, bias) = match outcome {
            Ok(pair) => pair,
            Err(e) => {
                if e.is_data_error() {
                    warn!("Skipping {}: {}", symbol, e);
                } else {
                    error!("Skipping {} after local failure: {}", symbol, e);
                }
                return AssetReport {
                    asset: asset.clone(),
                    outcome: Err(e.to_string()),
                    chart: None,
                };
            }
        };

        info!(
            "{} bias: {} (C1={} O1={} H1={} L1={} C2={})",
            symbol,
            bias.label,
            bias.inputs.close,
            bias.inputs.open,
            bias.inputs.high,
            bias.inputs.low,
            bias.inputs.prior_close
        );

        let chart = if self.formatter.wants_charts() {
            self.render_chart(series).await
        } else {
            None
        };

        AssetReport {
            asset: asset.clone(),
            outcome: Ok(bias),
            chart,
        }
    }

    /// Render off the async workers; a failed render only drops the attachment
    async fn render_chart(&self, series: Series) -> Option<PathBuf> {
        let path = self.report.chart_path_for(series.symbol());
        let renderer = self.renderer.clone();
        let target = path.clone();

        match tokio::task::spawn_blocking(move || renderer.render(&series, &target)).await {
            Ok(Ok(())) => Some(path),
            Ok(Err(e)) => {
                warn!("Chart render failed for {}: {}", path.display(), e);
                None
            }
            Err(e) => {
                warn!("Chart render task panicked: {}", e);
                None
            }
        }
    }
}

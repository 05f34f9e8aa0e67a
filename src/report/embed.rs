use super::{CycleReport, CycleTrigger, ReportFormatter, UNAVAILABLE};
use crate::notify::{Embed, OutboundMessage};

/// Discord blurple
pub const DEFAULT_COLOR: u32 = 0x5865F2;

/// One embed covering every asset
#[derive(Debug, Clone)]
pub struct EmbedReport {
    color: u32,
}

impl EmbedReport {
    pub fn new(color: u32) -> Self {
        Self { color }
    }
}

impl Default for EmbedReport {
    fn default() -> Self {
        Self::new(DEFAULT_COLOR)
    }
}

impl ReportFormatter for EmbedReport {
    fn format(&self, report: &CycleReport) -> Vec<OutboundMessage> {
        let title = match report.trigger {
            CycleTrigger::Startup => "📊 Market Bias (startup)",
            CycleTrigger::Scheduled => "📊 Daily Market Bias",
        };

        let names: Vec<&str> = report.assets.iter().map(|a| a.asset.display_name()).collect();
        let description = format!(
            "Bias from the last completed {} candle for: {}",
            report.interval,
            names.join(", ")
        );

        let embed = report.assets.iter().fold(
            Embed::new(title)
                .description(description)
                .color(self.color),
            |embed, asset| {
                let name = asset.asset.display_name();
                match &asset.outcome {
                    Ok(bias) => embed.field(
                        format!("{} {}", bias.label.emoji(), name),
                        format!("**{}**\n{}", bias.label, bias.reason),
                        false,
                    ),
                    Err(_) => embed.field(format!("⚠️ {}", name), UNAVAILABLE, false),
                }
            },
        );

        let embed = embed
            .footer(format!("Source: {} · {} candles", report.source, report.interval))
            .timestamp(report.started_at);

        vec![OutboundMessage::Embed(embed)]
    }
}

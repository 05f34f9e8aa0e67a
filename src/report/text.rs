use super::{CycleReport, ReportFormatter, UNAVAILABLE};
use crate::notify::OutboundMessage;

/// Plain message per asset, followed by a separate chart attachment
#[derive(Debug, Clone, Default)]
pub struct TextReport {
    charts: bool,
}

impl TextReport {
    pub fn new(charts: bool) -> Self {
        Self { charts }
    }
}

impl ReportFormatter for TextReport {
    fn format(&self, report: &CycleReport) -> Vec<OutboundMessage> {
        let mut messages = Vec::with_capacity(report.assets.len() * 2);

        for asset in &report.assets {
            let name = asset.asset.display_name();
            let text = match &asset.outcome {
                Ok(bias) => format!(
                    "📊 **Daily {} Bias**\n**Bias:** {}\n**Reason:** {}",
                    name, bias.label, bias.reason
                ),
                Err(_) => format!(
                    "📊 **Daily {} Bias**\n**Bias:** ⚠️ {}\n**Reason:** Could not fetch recent {} candles.",
                    name, UNAVAILABLE, report.interval
                ),
            };
            messages.push(OutboundMessage::Text(text));

            if let (true, Some(path)) = (self.charts, &asset.chart) {
                messages.push(OutboundMessage::File {
                    path: path.clone(),
                    caption: None,
                });
            }
        }

        messages
    }

    fn wants_charts(&self) -> bool {
        self.charts
    }
}

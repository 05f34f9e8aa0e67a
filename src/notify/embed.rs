//! Discord embed payloads

use serde::Serialize;

/// Discord caps embed fields at 25 per embed
pub const MAX_FIELDS: usize = 25;
/// Discord caps field values at 1024 characters
pub const MAX_FIELD_VALUE: usize = 1024;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    /// ISO 8601 timestamp shown next to the footer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

impl Embed {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// Add a field; fields past the Discord limit are dropped
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        if self.fields.len() < MAX_FIELDS {
            self.fields.push(EmbedField {
                name: name.into(),
                value: truncate(&value.into(), MAX_FIELD_VALUE),
                inline,
            });
        }
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(EmbedFooter { text: text.into() });
        self
    }

    pub fn timestamp(mut self, timestamp: chrono::DateTime<chrono::Utc>) -> Self {
        self.timestamp = Some(timestamp.to_rfc3339());
        self
    }
}

/// Cut `text` to at most `max` characters, marking the cut with an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_embed_serialization_skips_empty_parts() {
        let embed = Embed::new("Title").color(0x3498db);
        let json = serde_json::to_value(&embed).unwrap();
        assert_eq!(json["title"], "Title");
        assert_eq!(json["color"], 0x3498db);
        assert!(json.get("description").is_none());
        assert!(json.get("fields").is_none());
        assert!(json.get("footer").is_none());
    }

    #[test]
    fn test_embed_builder() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let embed = Embed::new("Daily")
            .description("BTC, ETH")
            .field("BTC", "**BULLISH**", false)
            .footer("Binance")
            .timestamp(ts);

        let json = serde_json::to_value(&embed).unwrap();
        assert_eq!(json["description"], "BTC, ETH");
        assert_eq!(json["fields"][0]["name"], "BTC");
        assert_eq!(json["fields"][0]["inline"], false);
        assert_eq!(json["footer"]["text"], "Binance");
        assert_eq!(json["timestamp"], "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_field_limit() {
        let embed = (0..30).fold(Embed::new("Many"), |e, i| e.field(i.to_string(), "v", true));
        assert_eq!(embed.fields.len(), MAX_FIELDS);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("📊📊📊", 2).chars().count(), 2);
    }
}

//! Discord REST client for posting to one channel
//!
//! Uses the bot token against `POST /channels/{id}/messages`; attachments go
//! out as `multipart/form-data` with a `payload_json` part.

use super::embed::{truncate, Embed};
use super::{ChatSink, MAX_CONTENT_LEN};
use crate::config::DiscordConfig;
use crate::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Posts messages to a single Discord channel
#[derive(Clone)]
pub struct DiscordNotifier {
    http: Client,
    api_base: String,
    bot_token: String,
    channel_id: String,
}

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "no_embeds")]
    embeds: &'a [Embed],
}

fn no_embeds(embeds: &&[Embed]) -> bool {
    embeds.is_empty()
}

impl DiscordNotifier {
    pub fn new(config: &DiscordConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            channel_id: config.channel_id.clone(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/channels/{}/messages", self.api_base, self.channel_id)
    }

    fn post(&self) -> RequestBuilder {
        self.http
            .post(self.messages_url())
            .header("Authorization", format!("Bot {}", self.bot_token))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<()> {
        let resp = request.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::Delivery(format!(
                "channel {} returned {}: {}",
                self.channel_id, status, body
            )));
        }

        debug!("Posted message to channel {}", self.channel_id);
        Ok(())
    }
}

#[async_trait]
impl ChatSink for DiscordNotifier {
    async fn send_text(&self, text: &str) -> Result<()> {
        let payload = CreateMessage {
            content: Some(truncate(text, MAX_CONTENT_LEN)),
            embeds: &[],
        };
        self.execute(self.post().json(&payload)).await
    }

    async fn send_file(&self, path: &Path, caption: Option<String>) -> Result<()> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "chart.png".to_string());

        let payload = json!({
            "content": caption.map(|c| truncate(&c, MAX_CONTENT_LEN)),
            "attachments": [{ "id": 0, "filename": file_name }],
        });

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_for(path))?;
        let form = Form::new()
            .text("payload_json", payload.to_string())
            .part("files[0]", part);

        self.execute(self.post().multipart(form)).await
    }

    async fn send_embed(&self, embed: &Embed) -> Result<()> {
        let payload = CreateMessage {
            content: None,
            embeds: std::slice::from_ref(embed),
        };
        self.execute(self.post().json(&payload)).await
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

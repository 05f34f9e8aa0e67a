//! Chat delivery
//!
//! The scheduler only talks to a [`ChatSink`]; the Discord REST client and
//! the log-only dry-run sink are interchangeable behind it.

pub mod discord;
pub mod embed;

pub use discord::DiscordNotifier;
pub use embed::{Embed, EmbedField, EmbedFooter};

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Discord rejects message content above 2000 characters
pub const MAX_CONTENT_LEN: usize = 2000;

/// One message to post to the destination channel
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    Text(String),
    /// File attachment with optional accompanying text
    File {
        path: PathBuf,
        caption: Option<String>,
    },
    Embed(Embed),
}

/// Send capability for a single destination channel
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<()>;

    async fn send_file(&self, path: &Path, caption: Option<String>) -> Result<()>;

    async fn send_embed(&self, embed: &Embed) -> Result<()>;
}

/// Post one outbound message through a sink
pub async fn deliver(sink: &dyn ChatSink, message: &OutboundMessage) -> Result<()> {
    match message {
        OutboundMessage::Text(text) => sink.send_text(text).await,
        OutboundMessage::File { path, caption } => sink.send_file(path, caption.clone()).await,
        OutboundMessage::Embed(embed) => sink.send_embed(embed).await,
    }
}

/// Dry-run sink that logs messages instead of sending them
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl ChatSink for LogNotifier {
    async fn send_text(&self, text: &str) -> Result<()> {
        tracing::info!("[dry-run] message:\n{}", text);
        Ok(())
    }

    async fn send_file(&self, path: &Path, caption: Option<String>) -> Result<()> {
        tracing::info!(
            "[dry-run] file {} ({})",
            path.display(),
            caption.as_deref().unwrap_or("no caption")
        );
        Ok(())
    }

    async fn send_embed(&self, embed: &Embed) -> Result<()> {
        let fields: Vec<String> = embed
            .fields
            .iter()
            .map(|f| format!("  {}: {}", f.name, f.value.replace('\n', " | ")))
            .collect();
        tracing::info!(
            "[dry-run] embed \"{}\"\n{}\n{}",
            embed.title,
            embed.description.as_deref().unwrap_or(""),
            fields.join("\n")
        );
        Ok(())
    }
}

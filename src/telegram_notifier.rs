use std::sync::Arc;

use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Serialize)]
struct SendMessage<'a> {
  chat_id: &'a str,
  text: &'a str,
  parse_mode: &'static str,
  disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
  ok: bool,
  #[serde(default)]
  description: Option<String>,
}

struct BotCredentials {
  token: String,
  chat_id: String,
}

/// Thin Telegram Bot API client; a no-op unless both token and chat id are set
#[derive(Clone)]
pub struct TelegramNotifier {
  client: Client,
  api_base: String,
  credentials: Option<Arc<BotCredentials>>,
}

impl TelegramNotifier {
  pub fn new(token: Option<String>, chat_id: Option<String>) -> Self {
    let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    let credentials = match (non_blank(token), non_blank(chat_id)) {
      (Some(token), Some(chat_id)) => {
        Some(Arc::new(BotCredentials { token, chat_id }))
      }
      _ => None,
    };

    Self {
      client: Client::new(),
      api_base: TELEGRAM_API.to_string(),
      credentials,
    }
  }

  /// Point at another Bot API server (self-hosted or local)
  pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
    self.api_base = api_base.into().trim_end_matches('/').to_string();
    self
  }

  /// Read `TG_TOKEN` and `CHAT_ID`
  pub fn from_env() -> Self {
    Self::new(std::env::var("TG_TOKEN").ok(), std::env::var("CHAT_ID").ok())
  }

  pub fn is_enabled(&self) -> bool {
    self.credentials.is_some()
  }

  /// Send an HTML message to the configured chat
  pub async fn send_notification(&self, message: &str) -> anyhow::Result<()> {
    let Some(credentials) = &self.credentials else {
      debug!("Telegram disabled, dropping message");
      return Ok(());
    };

    let url = format!("{}/bot{}/sendMessage", self.api_base, credentials.token);
    let request = SendMessage {
      chat_id: &credentials.chat_id,
      text: message,
      parse_mode: "HTML",
      disable_web_page_preview: true,
    };

    let response = self
      .client
      .post(&url)
      .json(&request)
      .send()
      .await
      .context("Telegram request failed")?;

    let status = response.status();
    let body: ApiResponse = response
      .json()
      .await
      .with_context(|| format!("Unreadable Telegram response (status {})", status))?;

    if !status.is_success() || !body.ok {
      let reason = body.description.unwrap_or_else(|| "no description".to_string());
      warn!("Telegram API error: Status {}: {}", status, reason);
      anyhow::bail!("Telegram API returned {}: {}", status, reason);
    }

    debug!("Telegram notification sent successfully");
    Ok(())
  }
}

impl Default for TelegramNotifier {
  fn default() -> Self {
    Self::from_env()
  }
}

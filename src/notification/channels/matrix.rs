//! Matrix 渠道 - 通过 client-server HTTP API 发送消息

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::notification::channel::{ChatChannel, ChatMessage, SendResult};

/// Matrix 连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Homeserver 地址 (例如 https://matrix.example.org)
    pub homeserver: String,
    /// bot 账号的 access token
    pub access_token: String,
    /// 请求超时 (秒)
    pub timeout_secs: u64,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            homeserver: "http://localhost:8008".to_string(),
            access_token: String::new(),
            timeout_secs: 30,
        }
    }
}

/// `m.room.message` 消息体
#[derive(Debug, Serialize)]
struct TextContent<'a> {
    msgtype: &'static str,
    body: &'a str,
}

/// homeserver 返回的错误消息体
#[derive(Debug, Deserialize)]
struct MatrixError {
    #[serde(default)]
    errcode: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl MatrixError {
    fn describe(&self) -> String {
        match (&self.errcode, &self.error) {
            (Some(code), Some(msg)) => format!("{}: {}", code, msg),
            (Some(code), None) => code.clone(),
            (None, Some(msg)) => msg.clone(),
            (None, None) => "unknown error".to_string(),
        }
    }
}

/// Matrix 渠道
#[derive(Debug)]
pub struct MatrixChannel {
    client: Client,
    homeserver: Url,
    access_token: String,
    txn_counter: AtomicU64,
}

impl MatrixChannel {
    pub fn new(config: MatrixConfig) -> Result<Self> {
        if config.access_token.is_empty() {
            return Err(anyhow!("matrix access_token is required"));
        }

        let homeserver = Url::parse(&config.homeserver)
            .with_context(|| format!("invalid homeserver URL: {}", config.homeserver))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            homeserver,
            access_token: config.access_token,
            txn_counter: AtomicU64::new(0),
        })
    }

    /// 构造 `{homeserver}/_matrix/client/v3/{segments...}`，每段都做百分号编码
    /// (房间别名以 `#` 开头)
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.homeserver.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("homeserver URL cannot be a base: {}", self.homeserver))?
            .pop_if_empty()
            .extend(["_matrix", "client", "v3"])
            .extend(segments);
        Ok(url)
    }

    fn next_txn_id(&self) -> String {
        let seq = self.txn_counter.fetch_add(1, Ordering::Relaxed);
        format!("mesh-uptime-{}-{}", Utc::now().timestamp_millis(), seq)
    }
}

#[async_trait]
impl ChatChannel for MatrixChannel {
    fn name(&self) -> &str {
        "matrix"
    }

    async fn send(&self, message: &ChatMessage) -> Result<SendResult> {
        let txn_id = self.next_txn_id();
        let url = self.endpoint(&[
            "rooms",
            message.room_id.as_str(),
            "send",
            "m.room.message",
            txn_id.as_str(),
        ])?;

        let response = self
            .client
            .put(url)
            .bearer_auth(&self.access_token)
            .json(&TextContent {
                msgtype: "m.text",
                body: &message.content,
            })
            .send()
            .await
            .context("matrix send request failed")?;

        let status = response.status();
        if status.is_success() {
            info!(
                channel = "matrix",
                room_id = %message.room_id,
                kind = ?message.kind,
                "Message sent successfully"
            );
            return Ok(SendResult::Sent);
        }

        let reason = match response.json::<MatrixError>().await {
            Ok(err) => err.describe(),
            Err(_) => status.to_string(),
        };
        error!(
            channel = "matrix",
            room_id = %message.room_id,
            status = %status,
            error = %reason,
            "Failed to send message"
        );
        Ok(SendResult::Failed(reason))
    }

    async fn ensure_joined(&self, room_id: &str) -> Result<()> {
        let url = self.endpoint(&["join", room_id])?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .context("matrix join request failed")?;

        let status = response.status();
        if status.is_success() {
            debug!(channel = "matrix", room_id = %room_id, "Joined room");
            return Ok(());
        }

        let reason = match response.json::<MatrixError>().await {
            Ok(err) => err.describe(),
            Err(_) => status.to_string(),
        };
        Err(anyhow!("failed to join {}: {}", room_id, reason))
    }
}

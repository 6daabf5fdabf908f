//! 配置加载

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::liveness::DEFAULT_OFFLINE_THRESHOLD;
use crate::notification::MatrixConfig;

/// Uptime 插件配置，启动时读取一次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UptimeConfig {
    /// 要监控的节点 id (报告中保持顺序)
    pub tracked_nodes: Vec<String>,
    /// 节点静默多少秒后视为离线
    pub offline_threshold: f64,
    /// 接收离线告警的房间，未设置时不告警
    pub alert_room_id: Option<String>,
}

impl Default for UptimeConfig {
    fn default() -> Self {
        Self {
            tracked_nodes: Vec::new(),
            offline_threshold: DEFAULT_OFFLINE_THRESHOLD,
            alert_room_id: None,
        }
    }
}

impl UptimeConfig {
    /// 告警房间，空字符串视为未设置
    pub fn alert_room(&self) -> Option<&str> {
        self.alert_room_id.as_deref().filter(|room| !room.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.offline_threshold.is_finite() || self.offline_threshold < 0.0 {
            return Err(anyhow!(
                "offline_threshold must be a non-negative number of seconds, got {}",
                self.offline_threshold
            ));
        }
        Ok(())
    }
}

/// 顶层配置文件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Matrix 后端，未配置时消息输出到 console
    pub matrix: Option<MatrixConfig>,
    /// Uptime 插件配置段
    pub uptime: UptimeConfig,
}

impl BridgeConfig {
    /// `~/.config/mesh-uptime/config.json`
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("mesh-uptime")
            .join("config.json")
    }

    /// 加载并校验配置文件
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.uptime.validate()?;
        Ok(config)
    }

    /// 从 `path` 加载；未指定时尝试默认路径，不存在则使用默认配置
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

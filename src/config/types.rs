//! Configuration Types

use serde::Deserialize;
use std::time::Duration;

use crate::application::ChapterSessionConfig;
use crate::infrastructure::adapters::RestClientConfig;
use crate::infrastructure::worker::SessionReaperConfig;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// 选择存储后端
    #[serde(default)]
    pub storage: StorageConfig,

    /// SQLite 后端配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 托管数据库（PostgREST）后端配置
    #[serde(default)]
    pub rest: RestConfig,

    #[serde(default)]
    pub autosave: AutosaveConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    /// 进程内存储，重启后丢失
    Memory,
    Rest,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::Memory => "memory",
            StorageBackend::Rest => "rest",
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/storyline.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// 托管数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct RestConfig {
    /// 服务基础 URL（不含 /rest/v1）
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub api_key: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_rest_timeout")]
    pub timeout_secs: u64,
}

fn default_rest_timeout() -> u64 {
    10
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            timeout_secs: default_rest_timeout(),
        }
    }
}

impl RestConfig {
    pub fn client_config(&self) -> RestClientConfig {
        RestClientConfig::new(&self.url, &self.api_key).with_timeout(self.timeout_secs)
    }
}

/// 自动保存配置
#[derive(Debug, Clone, Deserialize)]
pub struct AutosaveConfig {
    /// 最后一次编辑后的静默期（毫秒）
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// 失败后自动重试次数，0 表示只能手动重试
    #[serde(default)]
    pub max_retries: u32,

    /// 重试退避基数（毫秒），第 n 次重试前等待 base * 2^(n-1)
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
}

fn default_debounce_ms() -> u64 {
    800
}

fn default_retry_base_ms() -> u64 {
    200
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            max_retries: 0,
            retry_base_ms: default_retry_base_ms(),
        }
    }
}

impl AutosaveConfig {
    pub fn session_config(&self) -> ChapterSessionConfig {
        ChapterSessionConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            max_retries: self.max_retries,
            retry_base: Duration::from_millis(self.retry_base_ms),
        }
    }
}

/// 编辑会话配置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// 空闲多久后自动保存并关闭（秒）
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// 空闲扫描间隔（秒）
    #[serde(default = "default_reap_interval")]
    pub reap_interval_secs: u64,
}

fn default_idle_timeout() -> u64 {
    1800 // 30 分钟
}

fn default_reap_interval() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
            reap_interval_secs: default_reap_interval(),
        }
    }
}

impl SessionConfig {
    pub fn reaper_config(&self) -> SessionReaperConfig {
        SessionReaperConfig {
            idle_timeout_secs: self.idle_timeout_secs,
            reap_interval_secs: self.reap_interval_secs,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

//! Configuration Loader
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml / config.local.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, StorageBackend};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "STORYLINE";

/// 自动重试次数上限
const MAX_AUTOSAVE_RETRIES: u32 = 10;

/// 加载应用配置
///
/// # 环境变量示例
/// - `STORYLINE_SERVER__PORT=9000`
/// - `STORYLINE_STORAGE__BACKEND=rest`
/// - `STORYLINE_REST__URL=https://project.example.co`
/// - `STORYLINE_AUTOSAVE__DEBOUNCE_MS=1200`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置，`None` 时搜索工作目录下的默认文件
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    build_config(config_path, environment())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn build_config(config_path: Option<&Path>, env: Environment) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("storage.backend", "sqlite")?
        .set_default("database.path", "data/storyline.db")?
        .set_default("database.max_connections", 5)?
        .set_default("rest.url", "")?
        .set_default("rest.api_key", "")?
        .set_default("rest.timeout_secs", 10)?
        .set_default("autosave.debounce_ms", 800)?
        .set_default("autosave.max_retries", 0)?
        .set_default("autosave.retry_base_ms", 200)?
        .set_default("session.idle_timeout_secs", 1800)?
        .set_default("session.reap_interval_secs", 60)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 环境变量名会被转换为小写
    builder = builder.add_source(env);

    let app_config: AppConfig = builder.build()?.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

    if config.server.port == 0 {
        return invalid("Server port cannot be 0");
    }

    match config.storage.backend {
        StorageBackend::Sqlite => {
            if config.database.path.is_empty() {
                return invalid("Database path cannot be empty");
            }
            if config.database.max_connections == 0 {
                return invalid("Database max_connections cannot be 0");
            }
        }
        StorageBackend::Rest => {
            if !config.rest.url.starts_with("http://") && !config.rest.url.starts_with("https://")
            {
                return invalid("rest.url must be an http(s) URL when storage.backend = rest");
            }
            if config.rest.api_key.is_empty() {
                return invalid("rest.api_key cannot be empty when storage.backend = rest");
            }
        }
        StorageBackend::Memory => {}
    }

    if config.autosave.debounce_ms == 0 {
        return invalid("autosave.debounce_ms cannot be 0");
    }
    if config.autosave.max_retries > MAX_AUTOSAVE_RETRIES {
        return Err(ConfigError::ValidationError(format!(
            "autosave.max_retries cannot exceed {}",
            MAX_AUTOSAVE_RETRIES
        )));
    }

    if config.session.idle_timeout_secs == 0 || config.session.reap_interval_secs == 0 {
        return invalid("Session idle timeout and reap interval must be positive");
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Storage Backend: {}", config.storage.backend.as_str());
    match config.storage.backend {
        StorageBackend::Sqlite => {
            tracing::info!("Database: {}", config.database.path);
            tracing::info!("Database Max Connections: {}", config.database.max_connections);
        }
        StorageBackend::Rest => {
            // 不打印密钥
            tracing::info!("REST URL: {}", config.rest.url);
            tracing::info!("REST Timeout: {}s", config.rest.timeout_secs);
        }
        StorageBackend::Memory => {}
    }
    tracing::info!(
        "Autosave: debounce {}ms, retries {}",
        config.autosave.debounce_ms,
        config.autosave.max_retries
    );
    tracing::info!(
        "Session Idle Timeout: {}s (scan every {}s)",
        config.session.idle_timeout_secs,
        config.session.reap_interval_secs
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    /// 不读取进程环境，避免测试间相互影响
    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    fn write_toml(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_only() {
        let file = write_toml("");
        let config = build_config(Some(file.path()), env(&[])).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.autosave.debounce_ms, 800);
        assert_eq!(config.session.idle_timeout_secs, 1800);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = write_toml(
            r#"
            [storage]
            backend = "memory"

            [autosave]
            debounce_ms = 1500
            max_retries = 2
            "#,
        );
        let config = build_config(Some(file.path()), env(&[])).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.autosave.debounce_ms, 1500);
        assert_eq!(config.autosave.max_retries, 2);
        assert_eq!(config.autosave.retry_base_ms, 200);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_toml(
            r#"
            [server]
            port = 9000
            "#,
        );
        let config = build_config(
            Some(file.path()),
            env(&[
                ("STORYLINE_SERVER__PORT", "9100"),
                ("STORYLINE_LOG__JSON", "true"),
            ]),
        )
        .unwrap();
        assert_eq!(config.server.port, 9100);
        assert!(config.log.json);
    }

    #[test]
    fn test_rest_backend_requires_url_and_key() {
        let file = write_toml(
            r#"
            [storage]
            backend = "rest"
            "#,
        );
        assert!(matches!(
            build_config(Some(file.path()), env(&[])),
            Err(ConfigError::ValidationError(_))
        ));

        let config = build_config(
            Some(file.path()),
            env(&[
                ("STORYLINE_REST__URL", "https://db.example"),
                ("STORYLINE_REST__API_KEY", "anon"),
            ]),
        )
        .unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Rest);
        assert_eq!(config.rest.api_key, "anon");
    }

    #[test]
    fn test_unknown_backend_is_parse_error() {
        let file = write_toml(
            r#"
            [storage]
            backend = "mongo"
            "#,
        );
        assert!(matches!(
            build_config(Some(file.path()), env(&[])),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_load_error() {
        let result = build_config(Some(Path::new("/nonexistent/storyline.toml")), env(&[]));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        assert!(validate_config(&config).is_ok());

        config.server.port = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.autosave.debounce_ms = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.autosave.max_retries = MAX_AUTOSAVE_RETRIES + 1;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.database.path = String::new();
        assert!(validate_config(&config).is_err());
        config.storage.backend = StorageBackend::Memory;
        assert!(validate_config(&config).is_ok());
    }
}

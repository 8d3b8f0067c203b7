//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub database_url: String,
    /// 未设置时退化为进程内缓存（单机演示）。
    pub redis_url: Option<String>,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub default_temp_min: f64,
    pub default_temp_max: f64,
    pub default_hum_min: f64,
    pub default_hum_max: f64,
    pub sweep_period_seconds: u64,
    pub queue_capacity: usize,
    pub push_url: Option<String>,
    pub push_app_key: Option<String>,
    pub push_master_secret: Option<String>,
    pub ingest_enabled: bool,
    pub control_enabled: bool,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("BLUE_DATABASE_URL")
            .map_err(|_| ConfigError::Missing("BLUE_DATABASE_URL".to_string()))?;
        let http_addr = env::var("BLUE_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let redis_url = read_optional("BLUE_REDIS_URL");
        let mqtt_host = env::var("BLUE_MQTT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let mqtt_port = read_u16_with_default("BLUE_MQTT_PORT", 1883)?;
        let mqtt_username = read_optional("BLUE_MQTT_USERNAME");
        let mqtt_password = read_optional("BLUE_MQTT_PASSWORD");
        let default_temp_min = read_f64_with_default("BLUE_DEFAULT_TEMP_MIN", 0.0)?;
        let default_temp_max = read_f64_with_default("BLUE_DEFAULT_TEMP_MAX", 30.0)?;
        let default_hum_min = read_f64_with_default("BLUE_DEFAULT_HUM_MIN", 30.0)?;
        let default_hum_max = read_f64_with_default("BLUE_DEFAULT_HUM_MAX", 60.0)?;
        let sweep_period_seconds = read_u64_with_default("BLUE_SWEEP_PERIOD_SECONDS", 90)?;
        let queue_capacity = read_usize_with_default("BLUE_QUEUE_CAPACITY", 200)?;
        let push_url = read_optional("BLUE_PUSH_URL");
        let push_app_key = read_optional("BLUE_PUSH_APP_KEY");
        let push_master_secret = read_optional("BLUE_PUSH_MASTER_SECRET");
        let ingest_enabled = read_bool_with_default("BLUE_INGEST", true);
        let control_enabled = read_bool_with_default("BLUE_CONTROL", true);

        Ok(Self {
            http_addr,
            database_url,
            redis_url,
            mqtt_host,
            mqtt_port,
            mqtt_username,
            mqtt_password,
            default_temp_min,
            default_temp_max,
            default_hum_min,
            default_hum_max,
            sweep_period_seconds,
            queue_capacity,
            push_url,
            push_app_key,
            push_master_secret,
            ingest_enabled,
            control_enabled,
        })
    }
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_usize_with_default(key: &str, default: usize) -> Result<usize, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<usize>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_f64_with_default(key: &str, default: f64) -> Result<f64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<f64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}

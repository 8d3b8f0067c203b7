//! App 推送实现。

use crate::NotifyError;
use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

/// 推送服务商配置。
#[derive(Debug, Clone)]
pub struct PushConfig {
    pub url: String,
    pub app_key: String,
    pub master_secret: String,
}

/// App 推送抽象。
#[async_trait]
pub trait PushNotifier: Send + Sync {
    async fn notify(&self, tokens: &[String], message: &str) -> Result<(), NotifyError>;
}

/// 空推送器（未配置推送服务商时使用）。
#[derive(Debug, Default)]
pub struct NoopPushNotifier;

#[async_trait]
impl PushNotifier for NoopPushNotifier {
    async fn notify(&self, _tokens: &[String], _message: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct Aps<'a> {
    alert: &'a str,
    badge: i32,
    sound: &'a str,
}

#[derive(Debug, Serialize)]
struct IosPayload<'a> {
    aps: Aps<'a>,
}

#[derive(Debug, Serialize)]
struct PushParams<'a> {
    appkey: &'a str,
    timestamp: String,
    device_tokens: String,
    #[serde(rename = "type")]
    cast_type: &'a str,
    production_mode: &'a str,
    payload: IosPayload<'a>,
}

/// HTTP 推送实现（listcast 批量投递，请求体签名）。
pub struct HttpPushNotifier {
    client: reqwest::Client,
    config: PushConfig,
}

impl HttpPushNotifier {
    pub fn new(config: PushConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl PushNotifier for HttpPushNotifier {
    async fn notify(&self, tokens: &[String], message: &str) -> Result<(), NotifyError> {
        if tokens.is_empty() {
            return Ok(());
        }
        let params = PushParams {
            appkey: &self.config.app_key,
            timestamp: now_epoch_secs().to_string(),
            device_tokens: tokens.join(","),
            cast_type: "listcast",
            production_mode: "false",
            payload: IosPayload {
                aps: Aps {
                    alert: message,
                    badge: 1,
                    sound: "default",
                },
            },
        };
        let body =
            serde_json::to_string(&params).map_err(|err| NotifyError::Push(err.to_string()))?;
        let send_url = format!("{}/api/send", self.config.url.trim_end_matches('/'));
        let sign = sign_request("POST", &send_url, &body, &self.config.master_secret);
        let response = self
            .client
            .post(format!("{}?sign={}", send_url, sign))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| NotifyError::Push(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Push(format!(
                "provider status {}: {}",
                status, body
            )));
        }
        debug!(target: "blue.notify", count = tokens.len(), "push_delivered");
        Ok(())
    }
}

/// 请求签名：method + url + body + master_secret 的摘要十六进制。
fn sign_request(method: &str, url: &str, body: &str, master_secret: &str) -> String {
    let raw = format!("{}{}{}{}", method, url, body, master_secret);
    let digest = Sha256::digest(raw.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

fn now_epoch_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_is_deterministic_and_hex() {
        let a = sign_request("POST", "http://push/api/send", "{}", "secret");
        let b = sign_request("POST", "http://push/api/send", "{}", "secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));

        let other = sign_request("POST", "http://push/api/send", "{}", "other");
        assert_ne!(a, other);
    }

    #[test]
    fn push_params_wire_shape() {
        let params = PushParams {
            appkey: "key",
            timestamp: "100".to_string(),
            device_tokens: "tok-1,tok-2".to_string(),
            cast_type: "listcast",
            production_mode: "false",
            payload: IosPayload {
                aps: Aps {
                    alert: "hello",
                    badge: 1,
                    sound: "default",
                },
            },
        };
        let value = serde_json::to_value(&params).expect("json");
        assert_eq!(value["type"], "listcast");
        assert_eq!(value["production_mode"], "false");
        assert_eq!(value["device_tokens"], "tok-1,tok-2");
        assert_eq!(value["payload"]["aps"]["alert"], "hello");
        assert_eq!(value["payload"]["aps"]["badge"], 1);
    }
}

//! 统一配置中心
//!
//! 提供应用的全局配置管理：服务监听地址、存活超时、清扫周期
//! 与广播哨兵名称。全部可通过环境变量覆盖，无必填项。

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务配置
    pub server: ServerConfig,
    /// 中继核心配置
    pub relay: RelayConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 中继核心配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// 无心跳的最大静默时长，毫秒
    pub liveness_timeout_ms: u64,
    /// 清扫周期，毫秒
    pub sweep_interval_ms: u64,
    /// 广播哨兵名称
    pub broadcast_sentinel: String,
}

impl RelayConfig {
    pub fn liveness_timeout(&self) -> Duration {
        Duration::from_millis(self.liveness_timeout_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

impl AppConfig {
    /// 从环境变量加载配置，未设置的项使用缺省值。
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5000),
            },
            relay: RelayConfig {
                liveness_timeout_ms: env::var("LIVENESS_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10_000),
                sweep_interval_ms: env::var("SWEEP_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(15_000),
                broadcast_sentinel: env::var("BROADCAST_SENTINEL")
                    .unwrap_or_else(|_| "Todos".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 缺省值与环境变量覆盖放在同一个用例里串行验证，
    // 避免并行测试对进程环境互相踩踏。
    #[test]
    fn defaults_and_env_overrides() {
        let config = AppConfig::from_env();
        assert_eq!(config.relay.liveness_timeout(), Duration::from_secs(10));
        assert_eq!(config.relay.sweep_interval(), Duration::from_secs(15));
        assert_eq!(config.relay.broadcast_sentinel, "Todos");
        assert_eq!(config.server.port, 5000);

        env::set_var("LIVENESS_TIMEOUT_MS", "2500");
        env::set_var("SWEEP_INTERVAL_MS", "4000");
        env::set_var("BROADCAST_SENTINEL", "All");
        env::set_var("SERVER_PORT", "8080");

        let config = AppConfig::from_env();
        env::remove_var("LIVENESS_TIMEOUT_MS");
        env::remove_var("SWEEP_INTERVAL_MS");
        env::remove_var("BROADCAST_SENTINEL");
        env::remove_var("SERVER_PORT");

        assert_eq!(config.relay.liveness_timeout(), Duration::from_millis(2500));
        assert_eq!(config.relay.sweep_interval(), Duration::from_millis(4000));
        assert_eq!(config.relay.broadcast_sentinel, "All");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn malformed_numeric_overrides_fall_back_to_defaults() {
        env::set_var("LIVENESS_TIMEOUT_MS", "not-a-number");
        let config = AppConfig::from_env();
        env::remove_var("LIVENESS_TIMEOUT_MS");

        assert_eq!(config.relay.liveness_timeout(), Duration::from_secs(10));
    }
}

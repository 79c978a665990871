use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::constants::DEFAULT_MAX_SSE_CONNECTIONS;
use crate::monitor::config::{AlertConfig, BlinkConfig, MonitorConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub cors_origin: String,
    pub worker: WorkerConfig,
    pub limits: LimitsConfig,
    pub monitor: MonitorConfig,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub is_leader: bool,
    /// 6 段 cron（含秒），默认每秒刷新一次
    pub status_refresh_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            is_leader: true,
            status_refresh_cron: "* * * * * *".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_sse_connections: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_sse_connections: DEFAULT_MAX_SSE_CONNECTIONS,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let blink_defaults = BlinkConfig::default();
        let alert_defaults = AlertConfig::default();
        let monitor_defaults = MonitorConfig::default();

        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            worker: WorkerConfig {
                is_leader: env_or_bool("WORKER_LEADER", true),
                status_refresh_cron: env_or("STATUS_REFRESH_CRON", "* * * * * *"),
            },
            limits: LimitsConfig {
                max_sse_connections: env_or_parse(
                    "MAX_SSE_CONNECTIONS",
                    DEFAULT_MAX_SSE_CONNECTIONS,
                ),
            },
            monitor: MonitorConfig {
                blink: BlinkConfig {
                    ear_threshold: env_or_parse("EAR_THRESHOLD", blink_defaults.ear_threshold),
                    consecutive_frames: env_or_parse(
                        "BLINK_CONSECUTIVE_FRAMES",
                        blink_defaults.consecutive_frames,
                    ),
                    window_secs: env_or_parse("BLINK_WINDOW_SECS", blink_defaults.window_secs),
                },
                alerts: AlertConfig {
                    cooldown_secs: env_or_parse(
                        "ALERT_COOLDOWN_SECS",
                        alert_defaults.cooldown_secs,
                    ),
                    no_blink_secs: env_or_parse(
                        "NO_BLINK_ALERT_SECS",
                        alert_defaults.no_blink_secs,
                    ),
                    break_reminder_minutes: env_or_parse(
                        "BREAK_REMINDER_MINUTES",
                        alert_defaults.break_reminder_minutes,
                    ),
                    low_rate: env_or_parse("LOW_BLINK_RATE", alert_defaults.low_rate),
                    healthy_rate: env_or_parse("HEALTHY_BLINK_RATE", alert_defaults.healthy_rate),
                    max_alerts: env_or_parse("MAX_ALERTS", alert_defaults.max_alerts),
                },
                ear_history_len: env_or_parse("EAR_HISTORY_LEN", monitor_defaults.ear_history_len),
            }
            .sanitized(),
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use super::*;

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn managed_keys() -> &'static [&'static str] {
        &[
            "HOST",
            "PORT",
            "RUST_LOG",
            "WORKER_LEADER",
            "EAR_THRESHOLD",
            "BLINK_CONSECUTIVE_FRAMES",
            "ALERT_COOLDOWN_SECS",
            "MAX_ALERTS",
            "MAX_SSE_CONNECTIONS",
        ]
    }

    fn clear_keys(keys: &[&str]) {
        for key in keys {
            env::remove_var(key);
        }
    }

    #[test]
    fn loads_defaults_when_missing() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.worker.is_leader);
        assert_eq!(cfg.worker.status_refresh_cron, "* * * * * *");
        assert_eq!(cfg.monitor, MonitorConfig::default());
        assert_eq!(cfg.limits.max_sse_connections, DEFAULT_MAX_SSE_CONNECTIONS);
    }

    #[test]
    fn parses_numeric_values() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("PORT", "4000");
        env::set_var("EAR_THRESHOLD", "0.25");
        env::set_var("BLINK_CONSECUTIVE_FRAMES", "3");
        env::set_var("ALERT_COOLDOWN_SECS", "45");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 4000);
        assert!((cfg.monitor.blink.ear_threshold - 0.25).abs() < 1e-12);
        assert_eq!(cfg.monitor.blink.consecutive_frames, 3);
        assert_eq!(cfg.monitor.alerts.cooldown_secs, 45);
        clear_keys(managed_keys());
    }

    #[test]
    fn invalid_values_fall_back() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("PORT", "bad");
        env::set_var("EAR_THRESHOLD", "x");
        env::set_var("MAX_ALERTS", "0");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 3000);
        assert!((cfg.monitor.blink.ear_threshold - 0.21).abs() < 1e-12);
        // 0 经 sanitized 修正为 1
        assert_eq!(cfg.monitor.alerts.max_alerts, 1);
        clear_keys(managed_keys());
    }

    #[test]
    fn leader_flag_parses_words() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("WORKER_LEADER", "off");
        assert!(!Config::from_env().worker.is_leader);
        env::set_var("WORKER_LEADER", "maybe");
        assert!(Config::from_env().worker.is_leader);
        clear_keys(managed_keys());
    }
}

use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::{Format, Json, JsonFields};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "eye-strain-monitor";
const MAX_LOG_FILES: usize = 14;

/// Appended to the configured level when RUST_LOG is unset.
const QUIET_DIRECTIVES: &[&str] = &["tokio_cron_scheduler=warn", "tower_http=info"];

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enable_file_logs: false,
            log_dir: "./logs".to_string(),
        }
    }
}

impl From<&Config> for LogConfig {
    fn from(config: &Config) -> Self {
        Self {
            log_level: config.log_level.clone(),
            enable_file_logs: config.enable_file_logs,
            log_dir: config.log_dir.clone(),
        }
    }
}

fn default_filter(level: &str) -> EnvFilter {
    let directives = std::iter::once(level)
        .chain(QUIET_DIRECTIVES.iter().copied())
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::new(directives)
}

type JsonFileLayer<S> = fmt::Layer<S, JsonFields, Format<Json>, RollingFileAppender>;

/// JSON 日志按天滚动写入 `log_dir`
fn json_file_layer<S>(config: &LogConfig) -> Result<JsonFileLayer<S>, InitError> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(&config.log_dir)?;

    Ok(fmt::layer().with_writer(appender).with_ansi(false).json())
}

pub fn init_tracing(config: &LogConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(&config.log_level));

    let (file_layer, file_error) = if config.enable_file_logs {
        match json_file_layer(config) {
            Ok(layer) => (Some(layer), None),
            Err(e) => (None, Some(e)),
        }
    } else {
        (None, None)
    };

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init();

    // 全局 subscriber 只能设置一次，重复初始化（测试中常见）直接忽略
    if let Err(e) = result {
        if !e.to_string().contains("already been set") {
            panic!("Failed to initialize tracing: {e}");
        }
        return;
    }

    if let Some(e) = file_error {
        tracing::warn!(
            error = %e,
            log_dir = %config.log_dir,
            "File logging disabled: cannot open log directory"
        );
    }
}

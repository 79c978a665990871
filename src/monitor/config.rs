use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ALERT_COOLDOWN_SECS, DEFAULT_BLINK_WINDOW_SECS, DEFAULT_BREAK_REMINDER_MINUTES,
    DEFAULT_CONSECUTIVE_FRAMES, DEFAULT_EAR_HISTORY_LEN, DEFAULT_EAR_THRESHOLD,
    DEFAULT_HEALTHY_BLINK_RATE, DEFAULT_LOW_BLINK_RATE, DEFAULT_MAX_ALERTS,
    DEFAULT_NO_BLINK_ALERT_SECS, MAX_BREAK_REMINDER_MINUTES, MAX_CONFIG_SECS,
};

/// Blink detection thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlinkConfig {
    /// EAR 低于此值视为闭眼
    pub ear_threshold: f64,
    /// 至少连续多少帧低于阈值才算一次眨眼
    pub consecutive_frames: u32,
    pub window_secs: i64,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            ear_threshold: DEFAULT_EAR_THRESHOLD,
            consecutive_frames: DEFAULT_CONSECUTIVE_FRAMES,
            window_secs: DEFAULT_BLINK_WINDOW_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertConfig {
    pub cooldown_secs: i64,
    pub no_blink_secs: i64,
    pub break_reminder_minutes: i64,
    /// Rates strictly between 0 and this value raise a low-rate warning.
    pub low_rate: u32,
    pub healthy_rate: u32,
    pub max_alerts: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: DEFAULT_ALERT_COOLDOWN_SECS,
            no_blink_secs: DEFAULT_NO_BLINK_ALERT_SECS,
            break_reminder_minutes: DEFAULT_BREAK_REMINDER_MINUTES,
            low_rate: DEFAULT_LOW_BLINK_RATE,
            healthy_rate: DEFAULT_HEALTHY_BLINK_RATE,
            max_alerts: DEFAULT_MAX_ALERTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfig {
    pub blink: BlinkConfig,
    pub alerts: AlertConfig,
    #[serde(default = "default_ear_history_len")]
    pub ear_history_len: usize,
}

fn default_ear_history_len() -> usize {
    DEFAULT_EAR_HISTORY_LEN
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            blink: BlinkConfig::default(),
            alerts: AlertConfig::default(),
            ear_history_len: DEFAULT_EAR_HISTORY_LEN,
        }
    }
}

impl MonitorConfig {
    /// Clamp values that would make the detector meaningless.
    pub fn sanitized(mut self) -> Self {
        if !self.blink.ear_threshold.is_finite() || self.blink.ear_threshold <= 0.0 {
            tracing::warn!(
                value = self.blink.ear_threshold,
                "Invalid EAR threshold, using default"
            );
            self.blink.ear_threshold = DEFAULT_EAR_THRESHOLD;
        }
        self.blink.consecutive_frames = self.blink.consecutive_frames.max(1);
        self.blink.window_secs =
            bounded("window_secs", self.blink.window_secs, 1, MAX_CONFIG_SECS);
        self.alerts.cooldown_secs =
            bounded("cooldown_secs", self.alerts.cooldown_secs, 0, MAX_CONFIG_SECS);
        self.alerts.no_blink_secs =
            bounded("no_blink_secs", self.alerts.no_blink_secs, 0, MAX_CONFIG_SECS);
        self.alerts.break_reminder_minutes = bounded(
            "break_reminder_minutes",
            self.alerts.break_reminder_minutes,
            1,
            MAX_BREAK_REMINDER_MINUTES,
        );
        self.alerts.max_alerts = self.alerts.max_alerts.max(1);
        self.ear_history_len = self.ear_history_len.max(1);
        self
    }
}

// chrono::Duration 构造超范围会 panic，时长类配置必须先夹到合理区间
fn bounded(name: &'static str, value: i64, min: i64, max: i64) -> i64 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        tracing::warn!(setting = name, value, clamped, "Monitor setting out of range, clamped");
    }
    clamped
}

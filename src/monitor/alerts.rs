//! 护眼提醒
//!
//! 每次刷新时按冷却时间评估三条规则：眨眼率偏低、长时间未眨眼、20-20-20 休息提醒。
//! 同一次刷新可能触发多条提醒，每条都会重置冷却计时。

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::constants::BREAK_REMINDER_SLACK_MS;
use crate::monitor::config::AlertConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(level: AlertLevel, title: &str, message: String, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            title: title.to_string(),
            message,
            created_at: at,
        }
    }

    pub fn monitoring_started(at: DateTime<Utc>) -> Self {
        Self::new(
            AlertLevel::Info,
            "Monitoring Started",
            "Eye strain monitoring is now active. Blink naturally!".to_string(),
            at,
        )
    }

    pub fn session_ended(
        duration_secs: i64,
        total_blinks: u64,
        rate: u32,
        at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            AlertLevel::Info,
            "Session Ended",
            format!(
                "Session duration: {}min. Total blinks: {total_blinks}. Avg rate: {rate} blinks/min.",
                duration_secs / 60
            ),
            at,
        )
    }
}

/// What the policy needs to know about the session at one refresh tick.
#[derive(Debug, Clone, Copy)]
pub struct AlertContext {
    pub now: DateTime<Utc>,
    pub rate_per_minute: u32,
    pub session_started_at: DateTime<Utc>,
    /// 尚未眨眼时为会话开始时间
    pub last_blink_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AlertPolicy {
    config: AlertConfig,
    last_alert_at: Option<DateTime<Utc>>,
}

impl AlertPolicy {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            last_alert_at: None,
        }
    }

    pub fn last_alert_at(&self) -> Option<DateTime<Utc>> {
        self.last_alert_at
    }

    pub fn evaluate(&mut self, ctx: &AlertContext) -> Vec<Alert> {
        if let Some(last) = self.last_alert_at {
            if ctx.now - last < Duration::seconds(self.config.cooldown_secs) {
                return Vec::new();
            }
        }

        let mut raised = Vec::new();
        let rate = ctx.rate_per_minute;

        if rate > 0 && rate < self.config.low_rate {
            raised.push(Alert::new(
                AlertLevel::Warning,
                "Low Blink Rate",
                format!(
                    "Your blink rate is {rate} blinks/min. Normal range is 15-20. Take a break!"
                ),
                ctx.now,
            ));
        }

        if ctx.now - ctx.last_blink_at > Duration::seconds(self.config.no_blink_secs) {
            raised.push(Alert::new(
                AlertLevel::Danger,
                "No Recent Blinks",
                format!(
                    "You haven't blinked in over {} seconds! Blink several times now.",
                    self.config.no_blink_secs
                ),
                ctx.now,
            ));
        }

        if self.break_due(ctx) {
            raised.push(Alert::new(
                AlertLevel::Info,
                "20-20-20 Rule Reminder",
                "Look at something 20 feet away for 20 seconds to reduce eye strain.".to_string(),
                ctx.now,
            ));
        }

        if !raised.is_empty() {
            self.last_alert_at = Some(ctx.now);
        }
        raised
    }

    /// True on the tick that lands just past each full reminder interval.
    fn break_due(&self, ctx: &AlertContext) -> bool {
        let elapsed_ms = (ctx.now - ctx.session_started_at).num_milliseconds();
        let interval_ms = self.config.break_reminder_minutes * 60_000;
        elapsed_ms >= interval_ms && elapsed_ms % interval_ms < BREAK_REMINDER_SLACK_MS
    }
}

/// Bounded alert list, newest first.
#[derive(Debug, Clone)]
pub struct AlertFeed {
    alerts: VecDeque<Alert>,
    capacity: usize,
}

impl AlertFeed {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            alerts: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, alert: Alert) {
        tracing::info!(level = ?alert.level, title = %alert.title, "alert raised");
        self.alerts.push_front(alert);
        self.alerts.truncate(self.capacity);
    }

    pub fn snapshot(&self) -> Vec<Alert> {
        self.alerts.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

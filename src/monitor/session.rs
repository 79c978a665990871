use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::monitor::alerts::{Alert, AlertContext, AlertFeed, AlertPolicy};
use crate::monitor::blink::{BlinkEvent, BlinkStateMachine};
use crate::monitor::config::MonitorConfig;
use crate::monitor::ear::{binocular_openness, EarError, EyeOpenness, Landmark};
use crate::monitor::health::BlinkHealth;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameOutcome {
    NoFace,
    #[serde(rename_all = "camelCase")]
    Measured {
        openness: EyeOpenness,
        blink: Option<BlinkEvent>,
        blink_count: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub session_id: Uuid,
    pub blink_count: u64,
    pub rate_per_minute: u32,
    pub health: BlinkHealth,
    pub health_title: &'static str,
    pub health_advice: &'static str,
    pub average_ear: f64,
    pub last_ear: Option<f64>,
    pub session_secs: i64,
    /// `MM:SS`
    pub session_clock: String,
    pub secs_since_last_blink: i64,
    pub frames_below_threshold: u32,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    pub status: StatusSnapshot,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_secs: i64,
    pub total_blinks: u64,
    pub rate_per_minute: u32,
}

/// 一次监测会话：持有眨眼状态机、EAR 历史与提醒状态
#[derive(Debug, Clone)]
pub struct MonitorSession {
    id: Uuid,
    config: MonitorConfig,
    started_at: DateTime<Utc>,
    blink: BlinkStateMachine,
    ear_history: VecDeque<f64>,
    policy: AlertPolicy,
    feed: AlertFeed,
}

impl MonitorSession {
    pub fn start(config: MonitorConfig, now: DateTime<Utc>) -> Self {
        let mut feed = AlertFeed::new(config.alerts.max_alerts);
        feed.push(Alert::monitoring_started(now));

        Self {
            id: Uuid::new_v4(),
            config,
            started_at: now,
            blink: BlinkStateMachine::new(config.blink),
            ear_history: VecDeque::with_capacity(config.ear_history_len),
            policy: AlertPolicy::new(config.alerts),
            feed,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn blink_count(&self) -> u64 {
        self.blink.blink_count()
    }

    /// Process one detector result. `None` or an empty slice means no face was found;
    /// the state machine is not fed for such frames.
    pub fn process_frame(
        &mut self,
        landmarks: Option<&[Landmark]>,
        now: DateTime<Utc>,
    ) -> Result<FrameOutcome, EarError> {
        let landmarks = match landmarks {
            Some(points) if !points.is_empty() => points,
            _ => return Ok(FrameOutcome::NoFace),
        };

        let openness = binocular_openness(landmarks)?;
        self.push_ear(openness.average);
        let blink = self.blink.observe(openness.average, now);

        Ok(FrameOutcome::Measured {
            openness,
            blink,
            blink_count: self.blink.blink_count(),
        })
    }

    pub fn status(&mut self, now: DateTime<Utc>) -> StatusSnapshot {
        let rate = self.blink.current_rate_per_minute(now);
        let health = BlinkHealth::classify(rate, &self.config.alerts);
        let session_secs = (now - self.started_at).num_seconds().max(0);

        StatusSnapshot {
            session_id: self.id,
            blink_count: self.blink.blink_count(),
            rate_per_minute: rate,
            health,
            health_title: health.title(),
            health_advice: health.advice(),
            average_ear: self.average_ear(),
            last_ear: self.ear_history.back().copied(),
            session_secs,
            session_clock: format_clock(session_secs),
            secs_since_last_blink: (now - self.last_blink_or_start()).num_seconds().max(0),
            frames_below_threshold: self.blink.frames_below(),
            at: now,
        }
    }

    /// Periodic tick: current status plus whatever alerts the policy raises now.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> RefreshOutcome {
        let status = self.status(now);
        let alerts = self.policy.evaluate(&AlertContext {
            now,
            rate_per_minute: status.rate_per_minute,
            session_started_at: self.started_at,
            last_blink_at: self.last_blink_or_start(),
        });
        for alert in &alerts {
            self.feed.push(alert.clone());
        }
        RefreshOutcome { status, alerts }
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.feed.snapshot()
    }

    pub fn push_alert(&mut self, alert: Alert) {
        self.feed.push(alert);
    }

    pub fn summary(&mut self, now: DateTime<Utc>) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            started_at: self.started_at,
            ended_at: now,
            duration_secs: (now - self.started_at).num_seconds().max(0),
            total_blinks: self.blink.blink_count(),
            rate_per_minute: self.blink.current_rate_per_minute(now),
        }
    }

    fn average_ear(&self) -> f64 {
        if self.ear_history.is_empty() {
            return 0.0;
        }
        self.ear_history.iter().sum::<f64>() / self.ear_history.len() as f64
    }

    fn push_ear(&mut self, ear: f64) {
        self.ear_history.push_back(ear);
        while self.ear_history.len() > self.config.ear_history_len {
            self.ear_history.pop_front();
        }
    }

    fn last_blink_or_start(&self) -> DateTime<Utc> {
        self.blink.last_blink_at().unwrap_or(self.started_at)
    }
}

fn format_clock(total_secs: i64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

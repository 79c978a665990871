//! 监测会话的适配层
//!
//! 帧提交与每秒刷新都经由同一把锁进入会话，保证状态机按顺序被修改；
//! 所有输出通过广播通道推送给 SSE 订阅者。

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};

use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::monitor::alerts::Alert;
use crate::monitor::blink::BlinkEvent;
use crate::monitor::clock::Clock;
use crate::monitor::config::MonitorConfig;
use crate::monitor::ear::{EarError, Landmark};
use crate::monitor::session::{
    FrameOutcome, MonitorSession, RefreshOutcome, SessionSummary, StatusSnapshot,
};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("a monitoring session is already running")]
    AlreadyRunning,
    #[error("no monitoring session is running")]
    NotRunning,
    #[error("invalid landmarks: {0}")]
    InvalidLandmarks(#[from] EarError),
}

/// Live updates pushed to subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MonitorEvent {
    SessionStarted(StatusSnapshot),
    #[serde(rename_all = "camelCase")]
    Blink { event: BlinkEvent, blink_count: u64 },
    Status(StatusSnapshot),
    Alert(Alert),
    SessionEnded(SessionSummary),
}

impl MonitorEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SessionStarted(_) => "session_started",
            Self::Blink { .. } => "blink",
            Self::Status(_) => "status",
            Self::Alert(_) => "alert",
            Self::SessionEnded(_) => "session_ended",
        }
    }
}

#[derive(Default)]
struct HubState {
    session: Option<MonitorSession>,
    /// 上一次会话结束时的提醒列表，停止后仍可查询
    ended_alerts: Option<Vec<Alert>>,
}

pub struct MonitorHub {
    config: MonitorConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<HubState>,
    events: broadcast::Sender<MonitorEvent>,
}

impl MonitorHub {
    pub fn new(config: MonitorConfig, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config: config.sanitized(),
            clock,
            state: Mutex::new(HubState::default()),
            events,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    pub async fn is_running(&self) -> bool {
        self.state.lock().await.session.is_some()
    }

    pub async fn start(&self) -> Result<StatusSnapshot, MonitorError> {
        let mut guard = self.state.lock().await;
        if guard.session.is_some() {
            return Err(MonitorError::AlreadyRunning);
        }

        let now = self.clock.now();
        let mut session = MonitorSession::start(self.config, now);
        let status = session.status(now);
        tracing::info!(session_id = %session.id(), "Monitoring session started");

        guard.session = Some(session);
        guard.ended_alerts = None;
        self.publish(MonitorEvent::SessionStarted(status.clone()));
        Ok(status)
    }

    pub async fn stop(&self) -> Result<SessionSummary, MonitorError> {
        let mut guard = self.state.lock().await;
        let mut session = guard.session.take().ok_or(MonitorError::NotRunning)?;

        let now = self.clock.now();
        let summary = session.summary(now);
        let farewell = Alert::session_ended(
            summary.duration_secs,
            summary.total_blinks,
            summary.rate_per_minute,
            now,
        );

        tracing::info!(
            session_id = %summary.session_id,
            duration_secs = summary.duration_secs,
            total_blinks = summary.total_blinks,
            rate = summary.rate_per_minute,
            "Monitoring session stopped"
        );

        session.push_alert(farewell.clone());
        guard.ended_alerts = Some(session.alerts());

        self.publish(MonitorEvent::Alert(farewell));
        self.publish(MonitorEvent::SessionEnded(summary.clone()));
        Ok(summary)
    }

    pub async fn process_frame(
        &self,
        landmarks: Option<&[Landmark]>,
    ) -> Result<FrameOutcome, MonitorError> {
        let mut guard = self.state.lock().await;
        let session = guard.session.as_mut().ok_or(MonitorError::NotRunning)?;

        let outcome = session.process_frame(landmarks, self.clock.now())?;
        if let FrameOutcome::Measured {
            blink: Some(event),
            blink_count,
            ..
        } = &outcome
        {
            self.publish(MonitorEvent::Blink {
                event: *event,
                blink_count: *blink_count,
            });
        }
        Ok(outcome)
    }

    pub async fn status(&self) -> Result<StatusSnapshot, MonitorError> {
        let mut guard = self.state.lock().await;
        let session = guard.session.as_mut().ok_or(MonitorError::NotRunning)?;
        Ok(session.status(self.clock.now()))
    }

    /// Alert feed of the running session, or of the last finished one.
    pub async fn alerts(&self) -> Result<Vec<Alert>, MonitorError> {
        let guard = self.state.lock().await;
        match (&guard.session, &guard.ended_alerts) {
            (Some(session), _) => Ok(session.alerts()),
            (None, Some(ended)) => Ok(ended.clone()),
            (None, None) => Err(MonitorError::NotRunning),
        }
    }

    /// Scheduler tick. A no-op returning `None` while idle.
    pub async fn refresh(&self) -> Option<RefreshOutcome> {
        let mut guard = self.state.lock().await;
        let session = guard.session.as_mut()?;

        let outcome = session.refresh(self.clock.now());
        self.publish(MonitorEvent::Status(outcome.status.clone()));
        for alert in &outcome.alerts {
            self.publish(MonitorEvent::Alert(alert.clone()));
        }
        Some(outcome)
    }

    fn publish(&self, event: MonitorEvent) {
        // 没有订阅者时 send 返回 Err，属于正常情况
        let _ = self.events.send(event);
    }
}

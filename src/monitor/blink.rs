//! 眨眼检测状态机
//!
//! 每帧输入一个 EAR（眼部纵横比）值：连续 N 帧低于阈值后再回到阈值以上，
//! 记为一次眨眼。眨眼事件保留在 60 秒滚动窗口中用于估算每分钟眨眼次数，
//! 累计眨眼数不受窗口裁剪影响。

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::monitor::config::BlinkConfig;

/// One confirmed closure-then-reopening cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlinkEvent {
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EyePhase {
    Open,
    /// 正在累计低于阈值的帧
    Closing { frames_below: u32 },
}

#[derive(Debug, Clone)]
pub struct BlinkStateMachine {
    ear_threshold: f64,
    min_frames: u32,
    window: Duration,
    phase: EyePhase,
    events: VecDeque<BlinkEvent>,
    blink_count: u64,
    last_blink_at: Option<DateTime<Utc>>,
}

impl Default for BlinkStateMachine {
    fn default() -> Self {
        Self::new(BlinkConfig::default())
    }
}

impl BlinkStateMachine {
    pub fn new(config: BlinkConfig) -> Self {
        Self {
            ear_threshold: config.ear_threshold,
            min_frames: config.consecutive_frames,
            window: Duration::seconds(config.window_secs),
            phase: EyePhase::Open,
            events: VecDeque::with_capacity(64),
            blink_count: 0,
            last_blink_at: None,
        }
    }

    /// Feed one openness sample.
    ///
    /// Returns the blink event when this sample is the first one back at/above the
    /// threshold after at least `consecutive_frames` samples below it. Any sample at or
    /// above the threshold puts the machine back into [`EyePhase::Open`], whether or not
    /// a blink fired.
    pub fn observe(&mut self, openness: f64, now: DateTime<Utc>) -> Option<BlinkEvent> {
        if openness < self.ear_threshold {
            let frames_below = match self.phase {
                EyePhase::Open => 1,
                EyePhase::Closing { frames_below } => frames_below.saturating_add(1),
            };
            self.phase = EyePhase::Closing { frames_below };
            return None;
        }

        let confirmed = matches!(
            self.phase,
            EyePhase::Closing { frames_below } if frames_below >= self.min_frames
        );
        self.phase = EyePhase::Open;

        if !confirmed {
            return None;
        }

        let event = BlinkEvent { at: now };
        self.blink_count += 1;
        self.last_blink_at = Some(now);
        self.events.push_back(event);
        self.prune(now);

        tracing::debug!(blink_count = self.blink_count, "blink confirmed");
        Some(event)
    }

    /// Blinks per minute over the trailing window.
    ///
    /// The rate is extrapolated from the span between the oldest retained blink and
    /// `now`, not from the full window length, so it reads low right after startup.
    /// Fewer than two retained blinks yield 0.
    pub fn current_rate_per_minute(&mut self, now: DateTime<Utc>) -> u32 {
        self.prune(now);

        if self.events.len() < 2 {
            return 0;
        }

        let Some(oldest) = self.events.front() else {
            return 0;
        };
        let elapsed_secs = (now - oldest.at).num_milliseconds() as f64 / 1000.0;
        if elapsed_secs <= 0.0 {
            return 0;
        }

        let rate = self.events.len() as f64 / elapsed_secs * 60.0;
        rate.round() as u32
    }

    pub fn blink_count(&self) -> u64 {
        self.blink_count
    }

    pub fn last_blink_at(&self) -> Option<DateTime<Utc>> {
        self.last_blink_at
    }

    pub fn phase(&self) -> EyePhase {
        self.phase
    }

    pub fn frames_below(&self) -> u32 {
        match self.phase {
            EyePhase::Open => 0,
            EyePhase::Closing { frames_below } => frames_below,
        }
    }

    pub fn ear_threshold(&self) -> f64 {
        self.ear_threshold
    }

    pub fn recent_events(&self) -> impl Iterator<Item = &BlinkEvent> {
        self.events.iter()
    }

    pub fn reset(&mut self) {
        self.phase = EyePhase::Open;
        self.events.clear();
        self.blink_count = 0;
        self.last_blink_at = None;
    }

    /// Drop events that are a full window or more older than `now`.
    fn prune(&mut self, now: DateTime<Utc>) {
        while let Some(front) = self.events.front() {
            if now - front.at >= self.window {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }
}

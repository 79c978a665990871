use serde::Serialize;

use crate::monitor::config::AlertConfig;

/// 眨眼率健康等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlinkHealth {
    Healthy,
    BelowAverage,
    Low,
}

impl BlinkHealth {
    pub fn classify(rate_per_minute: u32, config: &AlertConfig) -> Self {
        if rate_per_minute >= config.healthy_rate {
            Self::Healthy
        } else if rate_per_minute >= config.low_rate {
            Self::BelowAverage
        } else {
            Self::Low
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Healthy => "Healthy Blink Rate",
            Self::BelowAverage => "Below Average",
            Self::Low => "Low Blink Rate",
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            Self::Healthy => "Keep it up! Your eyes are well-hydrated.",
            Self::BelowAverage => "Try to blink more frequently to avoid dry eyes.",
            Self::Low => "Blink more! Your eyes need moisture.",
        }
    }
}

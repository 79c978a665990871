/// EAR 阈值，低于此值视为闭眼
pub const DEFAULT_EAR_THRESHOLD: f64 = 0.21;

/// 连续低于阈值的最少帧数
pub const DEFAULT_CONSECUTIVE_FRAMES: u32 = 2;

/// 眨眼率滚动窗口（秒）
pub const DEFAULT_BLINK_WINDOW_SECS: i64 = 60;

/// 两次提醒之间的冷却时间（秒）
pub const DEFAULT_ALERT_COOLDOWN_SECS: i64 = 30;

/// 超过此时长未眨眼触发提醒（秒）
pub const DEFAULT_NO_BLINK_ALERT_SECS: i64 = 30;

/// 20-20-20 休息提醒间隔（分钟）
pub const DEFAULT_BREAK_REMINDER_MINUTES: i64 = 20;

/// 低于此眨眼率（次/分钟）视为偏低
pub const DEFAULT_LOW_BLINK_RATE: u32 = 10;

/// 不低于此眨眼率（次/分钟）视为健康
pub const DEFAULT_HEALTHY_BLINK_RATE: u32 = 15;

/// 提醒列表保留条数
pub const DEFAULT_MAX_ALERTS: usize = 5;

/// EAR 历史长度，30fps 下约 10 秒
pub const DEFAULT_EAR_HISTORY_LEN: usize = 300;

/// 休息提醒的触发宽度（毫秒），与每秒一次的刷新节拍匹配
pub const BREAK_REMINDER_SLACK_MS: i64 = 1_200;

/// 默认同时在线的 SSE 连接上限
pub const DEFAULT_MAX_SSE_CONNECTIONS: usize = 64;

/// 监控事件广播通道容量
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// 单帧允许的最大关键点数量（Face Mesh 含虹膜为 478 点）
pub const MAX_LANDMARKS_PER_FRAME: usize = 1024;

/// 时长类配置（秒）的上限：一天
pub const MAX_CONFIG_SECS: i64 = 86_400;

/// 休息提醒间隔的上限（分钟）：一天
pub const MAX_BREAK_REMINDER_MINUTES: i64 = 24 * 60;

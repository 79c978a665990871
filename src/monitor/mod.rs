//! 眨眼监测核心
//!
//! - `ear`: 由人脸关键点计算 EAR
//! - `blink`: 眨眼状态机与滚动眨眼率
//! - `health`: 眨眼率健康分级
//! - `alerts`: 护眼提醒规则与提醒列表
//! - `session`: 单次监测会话
//! - `hub`: 会话生命周期、串行访问与事件广播

pub mod alerts;
pub mod blink;
pub mod clock;
pub mod config;
pub mod ear;
pub mod health;
pub mod hub;
pub mod session;

pub use blink::{BlinkEvent, BlinkStateMachine};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::MonitorConfig;
pub use hub::{MonitorError, MonitorEvent, MonitorHub};
pub use session::MonitorSession;

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use eye_strain_monitor::config::{Config, LimitsConfig, WorkerConfig};
use eye_strain_monitor::monitor::{ManualClock, MonitorConfig, MonitorHub};
use eye_strain_monitor::routes::build_router;
use eye_strain_monitor::state::AppState;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub shutdown_tx: broadcast::Sender<()>,
}

pub fn test_epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("valid epoch")
}

fn spawn_with(monitor: MonitorConfig, max_sse_connections: usize) -> TestApp {
    // 直接构造 Config，避免 set_var 造成多线程测试环境变量竞态
    let config = Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        worker: WorkerConfig {
            is_leader: false,
            ..WorkerConfig::default()
        },
        limits: LimitsConfig {
            max_sse_connections,
        },
        monitor,
    };

    let clock = Arc::new(ManualClock::new(test_epoch()));
    let hub = Arc::new(MonitorHub::new(config.monitor, clock.clone()));
    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(hub, &config, shutdown_tx.clone());
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        clock,
        shutdown_tx,
    }
}

pub fn spawn_test_app() -> TestApp {
    spawn_with(MonitorConfig::default(), 64)
}

pub fn spawn_test_app_with_monitor(monitor: MonitorConfig) -> TestApp {
    spawn_with(monitor, 64)
}

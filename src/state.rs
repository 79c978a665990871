use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use crate::config::Config;
use crate::monitor::MonitorHub;

#[derive(Clone)]
pub struct AppState {
    hub: Arc<MonitorHub>,
    config: Arc<Config>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
}

impl AppState {
    pub fn new(hub: Arc<MonitorHub>, config: &Config, shutdown_tx: broadcast::Sender<()>) -> Self {
        Self {
            hub,
            config: Arc::new(config.clone()),
            shutdown_tx,
            started_at: Instant::now(),
        }
    }

    pub fn hub(&self) -> &MonitorHub {
        &self.hub
    }

    pub fn hub_arc(&self) -> Arc<MonitorHub> {
        self.hub.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn shutdown_tx(&self) -> &broadcast::Sender<()> {
        &self.shutdown_tx
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::broadcast;

    use crate::config::Config;
    use crate::monitor::{MonitorConfig, MonitorHub, SystemClock};

    use super::*;

    fn state(tx: broadcast::Sender<()>) -> AppState {
        let cfg = Config::from_env();
        let hub = Arc::new(MonitorHub::new(
            MonitorConfig::default(),
            Arc::new(SystemClock),
        ));
        AppState::new(hub, &cfg, tx)
    }

    #[tokio::test]
    async fn clones_share_the_same_hub() {
        let (tx, _) = broadcast::channel(4);
        let state = state(tx);
        let cloned = state.clone();

        state.hub().start().await.unwrap();
        assert!(cloned.hub().is_running().await);
    }

    #[tokio::test]
    async fn shutdown_receiver_can_clone() {
        let (tx, _) = broadcast::channel(4);
        let state = state(tx.clone());

        let mut rx1 = state.shutdown_rx();
        let mut rx2 = state.shutdown_rx();
        tx.send(()).unwrap();
        rx1.recv().await.unwrap();
        rx2.recv().await.unwrap();
    }
}

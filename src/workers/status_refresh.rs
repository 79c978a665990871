use crate::monitor::MonitorHub;

pub async fn run(hub: &MonitorHub) {
    let Some(outcome) = hub.refresh().await else {
        return;
    };

    tracing::debug!(
        blink_count = outcome.status.blink_count,
        rate = outcome.status.rate_per_minute,
        health = ?outcome.status.health,
        "status_refresh: tick"
    );
    if !outcome.alerts.is_empty() {
        tracing::info!(raised = outcome.alerts.len(), "status_refresh: alerts raised");
    }
}

pub mod status_refresh;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::WorkerConfig;
use crate::monitor::MonitorHub;

/// Timeout for individual worker invocations.
const WORKER_TIMEOUT: Duration = Duration::from_secs(5);

/// Drain period before scheduler shutdown to let in-flight tasks complete.
#[cfg(test)]
const DRAIN_TIMEOUT: Duration = Duration::from_millis(10);
#[cfg(not(test))]
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerName {
    StatusRefresh,
}

impl WorkerName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StatusRefresh => "status_refresh",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub name: WorkerName,
    pub cron: String,
    pub enabled: bool,
}

pub struct WorkerManager {
    hub: Arc<MonitorHub>,
    shutdown_rx: broadcast::Receiver<()>,
    config: WorkerConfig,
}

impl WorkerManager {
    pub fn new(
        hub: Arc<MonitorHub>,
        shutdown_rx: broadcast::Receiver<()>,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            hub,
            shutdown_rx,
            config: config.clone(),
        }
    }

    /// Single source of truth for all planned jobs and their cron schedules.
    pub fn planned_jobs(&self) -> Vec<JobSpec> {
        if !self.config.is_leader {
            return Vec::new();
        }

        vec![JobSpec {
            name: WorkerName::StatusRefresh,
            cron: self.config.status_refresh_cron.clone(),
            enabled: true,
        }]
    }

    /// Start the worker scheduler. Returns an error if the scheduler cannot be created or started.
    pub async fn start(mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !self.config.is_leader {
            tracing::info!("Worker leader disabled; skipping worker startup");
            return Ok(());
        }

        let mut scheduler = JobScheduler::new().await?;

        self.register_jobs(&scheduler).await;

        scheduler.start().await?;

        tracing::info!("Worker manager started");
        let _ = self.shutdown_rx.recv().await;

        tracing::info!(
            drain_ms = DRAIN_TIMEOUT.as_millis() as u64,
            "Worker manager shutting down"
        );
        tokio::time::sleep(DRAIN_TIMEOUT).await;
        let _ = scheduler.shutdown().await;
        Ok(())
    }

    async fn register_jobs(&self, scheduler: &JobScheduler) {
        for spec in self.planned_jobs() {
            if !spec.enabled {
                tracing::info!(name = spec.name.as_str(), "Skipping disabled worker");
                continue;
            }

            let name_str = spec.name.as_str();
            match spec.name {
                WorkerName::StatusRefresh => {
                    let hub = self.hub.clone();
                    add_job(scheduler, &spec.cron, name_str, move || {
                        let hub = hub.clone();
                        async move {
                            status_refresh::run(&hub).await;
                        }
                    })
                    .await;
                }
            }
            tracing::info!(name = name_str, cron = %spec.cron, "Registered worker");
        }
    }
}

/// Add a job to the scheduler with an overlap guard and timeout wrapper.
async fn add_job<Fut, F>(scheduler: &JobScheduler, cron: &str, name: &'static str, mut run: F)
where
    F: FnMut() -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let running = Arc::new(AtomicBool::new(false));

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let guard = running.clone();

        if guard
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!(
                worker = name,
                "Skipping worker invocation: previous run still in progress"
            );
            return Box::pin(async {});
        }

        let fut = run();
        Box::pin(async move {
            if tokio::time::timeout(WORKER_TIMEOUT, fut).await.is_err() {
                tracing::error!(
                    worker = name,
                    timeout_secs = WORKER_TIMEOUT.as_secs(),
                    "Worker timed out"
                );
            }
            guard.store(false, Ordering::SeqCst);
        })
    });

    match job {
        Ok(job) => {
            if let Err(err) = scheduler.add(job).await {
                tracing::error!(error=%err, cron, worker = name, "Failed to add worker job");
            }
        }
        Err(err) => tracing::error!(error=%err, cron, worker = name, "Failed to create worker job"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::broadcast;

    use crate::config::WorkerConfig;
    use crate::monitor::{MonitorConfig, MonitorHub, SystemClock};

    use super::*;

    fn hub() -> Arc<MonitorHub> {
        Arc::new(MonitorHub::new(
            MonitorConfig::default(),
            Arc::new(SystemClock),
        ))
    }

    #[tokio::test]
    async fn leader_switch_controls_job_registration() {
        let (tx, _) = broadcast::channel(2);
        let worker_cfg = WorkerConfig {
            is_leader: false,
            ..WorkerConfig::default()
        };

        let manager = WorkerManager::new(hub(), tx.subscribe(), &worker_cfg);
        assert!(manager.planned_jobs().is_empty());
    }

    #[tokio::test]
    async fn non_leader_start_returns_immediately() {
        let (tx, _) = broadcast::channel(2);
        let worker_cfg = WorkerConfig {
            is_leader: false,
            ..WorkerConfig::default()
        };

        let manager = WorkerManager::new(hub(), tx.subscribe(), &worker_cfg);
        manager
            .start()
            .await
            .expect("non-leader start should succeed");
    }

    #[tokio::test]
    async fn leader_plans_per_second_refresh() {
        let (tx, _) = broadcast::channel(2);
        let manager = WorkerManager::new(hub(), tx.subscribe(), &WorkerConfig::default());
        let jobs = manager.planned_jobs();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, WorkerName::StatusRefresh);
        assert_eq!(jobs[0].cron, "* * * * * *");
        assert!(jobs[0].enabled);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn leader_shuts_down_on_signal() {
        let (tx, _) = broadcast::channel(2);
        let manager = WorkerManager::new(hub(), tx.subscribe(), &WorkerConfig::default());
        let handle = tokio::spawn(manager.start());

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(()).expect("worker is subscribed");

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("worker exits after shutdown")
            .expect("worker task did not panic");
        assert!(result.is_ok());
    }

    #[test]
    fn all_worker_names_have_str() {
        assert_eq!(WorkerName::StatusRefresh.as_str(), "status_refresh");
    }
}

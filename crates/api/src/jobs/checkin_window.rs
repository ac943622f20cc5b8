//! Daily check-in window job.

use std::sync::Arc;

use domain::models::{ScheduleWindow, WindowKind};
use tracing::info;

use super::scheduler::{Job, JobSchedule};
use crate::services::{CheckinRunner, RunReport, Trigger};

/// Runs the roster when one of the daily windows opens.
pub struct CheckinWindowJob {
    runner: Arc<CheckinRunner>,
    window: WindowKind,
    hour: u32,
    minute: u32,
}

impl CheckinWindowJob {
    pub fn new(runner: Arc<CheckinRunner>, window: WindowKind, hour: u32, minute: u32) -> Self {
        Self {
            runner,
            window,
            hour,
            minute,
        }
    }

    /// Builds the job from a stored window; `None` when its start time is malformed.
    pub fn for_window(runner: Arc<CheckinRunner>, window: WindowKind, config: &ScheduleWindow) -> Option<Self> {
        let (hour, minute) = config.start_time()?;
        Some(Self::new(runner, window, hour, minute))
    }
}

#[async_trait::async_trait]
impl Job for CheckinWindowJob {
    fn name(&self) -> &'static str {
        match self.window {
            WindowKind::Pagi => "checkin_pagi",
            WindowKind::Siang => "checkin_siang",
            WindowKind::Sore => "checkin_sore",
        }
    }

    fn schedule(&self) -> JobSchedule {
        JobSchedule::DailyAt {
            hour: self.hour,
            minute: self.minute,
        }
    }

    async fn execute(&self) -> Result<(), String> {
        match self.runner.run(Trigger::Scheduled(self.window)).await {
            RunReport::Skipped(reason) => {
                info!(window = %self.window, reason = %reason, "Window skipped");
            }
            RunReport::NoUsers => {
                info!(window = %self.window, "No employees to check in");
            }
            RunReport::Completed(summary) => {
                info!(window = %self.window, "Window completed: {}", summary);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::services::{
        AttemptError, AttemptExecutor, DirectoryEntry, DirectoryError, EmployeeDirectory,
        MockNotificationService,
    };
    use domain::models::{AttemptOutcome, AttemptRequest};
    use persistence::Store;

    use crate::config::PacingConfig;

    struct NoopExecutor;

    #[async_trait::async_trait]
    impl AttemptExecutor for NoopExecutor {
        async fn attempt(&self, _request: &AttemptRequest) -> Result<AttemptOutcome, AttemptError> {
            Err(AttemptError::Browser("unused".to_string()))
        }
    }

    struct EmptyDirectory;

    #[async_trait::async_trait]
    impl EmployeeDirectory for EmptyDirectory {
        async fn fetch(&self, _office_code: &str) -> Result<Vec<DirectoryEntry>, DirectoryError> {
            Ok(Vec::new())
        }
    }

    fn runner(store: Store) -> Arc<CheckinRunner> {
        Arc::new(CheckinRunner::new(
            store,
            Arc::new(NoopExecutor),
            Arc::new(MockNotificationService::new()),
            Arc::new(EmptyDirectory),
            PacingConfig::none(),
        ))
    }

    #[test]
    fn test_job_from_window() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(Store::open(dir.path()));

        let job = CheckinWindowJob::for_window(
            runner.clone(),
            WindowKind::Siang,
            &ScheduleWindow::new("Presensi Siang", "12:15", "13:00"),
        )
        .unwrap();
        assert_eq!(job.name(), "checkin_siang");
        assert_eq!(job.schedule(), JobSchedule::DailyAt { hour: 12, minute: 15 });

        let malformed = ScheduleWindow::new("Presensi Sore", "4pm", "17:00");
        assert!(CheckinWindowJob::for_window(runner, WindowKind::Sore, &malformed).is_none());
    }

    #[tokio::test]
    async fn test_execute_never_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path());
        let mut settings = store.settings.get().await;
        settings.schedules.pagi.enabled = false;
        store.settings.save(&settings).await.unwrap();

        let job = CheckinWindowJob::new(runner(store.clone()), WindowKind::Pagi, 7, 0);
        assert!(job.execute().await.is_ok());

        // Either a non-working day or the disabled window skipped the run.
        let logs = store.logs.list().await;
        assert_eq!(logs.len(), 1);
        assert!(logs[0].message.contains("skipped"));
    }
}

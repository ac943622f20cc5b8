//! Check-in run orchestration.
//!
//! A run walks the roster strictly sequentially: one browser attempt at a
//! time, randomized pauses before and between attempts, one log entry per
//! employee and a fire-and-forget notification per outcome.

use std::sync::Arc;

use chrono::{NaiveDate, Timelike};
use domain::models::{
    AttemptRequest, Coordinates, Employee, LogEntry, OutcomeKind, Settings, WindowKind,
};
use domain::services::{
    AttemptExecutor, CheckinReport, DirectoryError, EmployeeDirectory, NotificationResult,
    NotificationService,
};
use persistence::repositories::ImportSummary;
use persistence::{PersistenceError, Store};
use serde::Serialize;
use shared::calendar::{self, NonWorkingReason};
use tracing::Instrument;

use crate::config::PacingConfig;
use crate::middleware::metrics::{
    record_checkin_attempt, record_checkin_duration, record_notification,
};

/// What started a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Daily window trigger; subject to the working-day and window guards.
    Scheduled(WindowKind),
    /// Dashboard or CLI trigger; guards are bypassed.
    Manual,
}

/// Why a scheduled run did not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NonWorkingDay(NonWorkingReason),
    WindowDisabled(WindowKind),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NonWorkingDay(reason) => write!(f, "non-working day: {}", reason),
            SkipReason::WindowDisabled(window) => write!(f, "{} window is disabled", window),
        }
    }
}

/// Result for one employee within a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeResult {
    pub nip: String,
    pub name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<OutcomeKind>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub schedule: String,
    pub success: usize,
    pub failed: usize,
    pub results: Vec<EmployeeResult>,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} success, {} failed", self.success, self.failed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunReport {
    Skipped(SkipReason),
    NoUsers,
    Completed(RunSummary),
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Employee {0} not found")]
    EmployeeNotFound(String),

    #[error("Employee {0} has no credentials")]
    MissingCredentials(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub struct CheckinRunner {
    store: Store,
    executor: Arc<dyn AttemptExecutor>,
    notifier: Arc<dyn NotificationService>,
    directory: Arc<dyn EmployeeDirectory>,
    pacing: PacingConfig,
}

impl CheckinRunner {
    pub fn new(
        store: Store,
        executor: Arc<dyn AttemptExecutor>,
        notifier: Arc<dyn NotificationService>,
        directory: Arc<dyn EmployeeDirectory>,
        pacing: PacingConfig,
    ) -> Self {
        Self {
            store,
            executor,
            notifier,
            directory,
            pacing,
        }
    }

    pub fn directory(&self) -> &Arc<dyn EmployeeDirectory> {
        &self.directory
    }

    /// Runs the whole roster for today.
    pub async fn run(&self, trigger: Trigger) -> RunReport {
        self.run_on(trigger, calendar::local_now().date_naive()).await
    }

    /// Runs the whole roster, evaluating the guards against `today`.
    pub async fn run_on(&self, trigger: Trigger, today: NaiveDate) -> RunReport {
        let span = tracing::info_span!("checkin_run", trigger = ?trigger);
        self.run_inner(trigger, today).instrument(span).await
    }

    async fn run_inner(&self, trigger: Trigger, today: NaiveDate) -> RunReport {
        let settings = self.store.settings.get().await;
        let window = match trigger {
            Trigger::Scheduled(window) => window,
            Trigger::Manual => WindowKind::for_hour(calendar::local_now().hour()),
        };
        let schedule = settings.schedules.get(window).label.clone();

        if let Trigger::Scheduled(window) = trigger {
            if let Some(reason) = self.guard(&settings, window, today) {
                tracing::info!(schedule = %schedule, reason = %reason, "Scheduled run skipped");
                self.append_log(
                    LogEntry::info(format!("{} skipped: {}", schedule, reason)).schedule(&schedule),
                )
                .await;
                return RunReport::Skipped(reason);
            }

            let delay = self.pacing.pre_run(window).sample();
            tracing::info!(delay_secs = delay.as_secs(), "Waiting before scheduled run");
            tokio::time::sleep(delay).await;
        }

        let employees: Vec<Employee> = self
            .load_roster()
            .await
            .into_iter()
            .filter(Employee::is_runnable)
            .collect();

        if employees.is_empty() {
            tracing::warn!("No runnable employees, nothing to do");
            return RunReport::NoUsers;
        }

        tracing::info!(count = employees.len(), schedule = %schedule, "Starting check-in run");

        let mut summary = RunSummary {
            schedule: schedule.clone(),
            ..Default::default()
        };
        let last = employees.len() - 1;

        for (index, employee) in employees.iter().enumerate() {
            tokio::time::sleep(self.pacing.attempt_jitter.sample()).await;

            let result = self.process_employee(employee, &settings, &schedule).await;
            if result.success {
                summary.success += 1;
            } else {
                summary.failed += 1;
            }
            summary.results.push(result);

            if index != last {
                tokio::time::sleep(self.pacing.between_employees.sample()).await;
            }
        }

        tracing::info!(
            schedule = %schedule,
            success = summary.success,
            failed = summary.failed,
            "Check-in run finished: {}",
            summary
        );
        RunReport::Completed(summary)
    }

    /// Checks in one employee immediately, without the pre-attempt pause.
    pub async fn run_one(&self, nip: &str) -> Result<EmployeeResult, RunError> {
        let employee = self
            .store
            .employees
            .find(nip)
            .await
            .ok_or_else(|| RunError::EmployeeNotFound(nip.to_string()))?;
        if !employee.has_credentials() {
            return Err(RunError::MissingCredentials(nip.to_string()));
        }

        let settings = self.store.settings.get().await;
        let window = WindowKind::for_hour(calendar::local_now().hour());
        let schedule = settings.schedules.get(window).label.clone();

        let span = tracing::info_span!("checkin_single", nip = %employee.nip);
        Ok(self
            .process_employee(&employee, &settings, &schedule)
            .instrument(span)
            .await)
    }

    /// Pulls the directory for the configured office code into the roster.
    pub async fn sync_roster(&self) -> Result<ImportSummary, SyncError> {
        let settings = self.store.settings.get().await;
        let office_code = settings.office_code.trim();
        if office_code.is_empty() {
            return Err(DirectoryError::MissingOfficeCode.into());
        }

        let entries = self.directory.fetch(office_code).await?;
        let employees = entries.into_iter().map(|e| e.into_employee()).collect();
        let summary = self.store.employees.import(employees).await?;
        tracing::info!(
            office_code = %office_code,
            added = summary.added,
            skipped = summary.skipped,
            "Roster synchronized from directory"
        );
        Ok(summary)
    }

    fn guard(&self, settings: &Settings, window: WindowKind, today: NaiveDate) -> Option<SkipReason> {
        if let Some(reason) = calendar::non_working_reason(today) {
            return Some(SkipReason::NonWorkingDay(reason));
        }
        if !settings.schedules.get(window).enabled {
            return Some(SkipReason::WindowDisabled(window));
        }
        None
    }

    async fn load_roster(&self) -> Vec<Employee> {
        let roster = self.store.employees.list().await;
        if !roster.is_empty() {
            return roster;
        }

        tracing::info!("Roster is empty, loading from employee directory");
        match self.sync_roster().await {
            Ok(_) => self.store.employees.list().await,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load roster from directory");
                Vec::new()
            }
        }
    }

    async fn process_employee(
        &self,
        employee: &Employee,
        settings: &Settings,
        schedule: &str,
    ) -> EmployeeResult {
        let request = AttemptRequest {
            nip: employee.nip.clone(),
            password: employee.password.clone(),
            mode: settings.attendance_mode,
            shift: settings
                .shift
                .clone()
                .filter(|_| settings.attendance_mode.requires_shift()),
            coordinates: Coordinates {
                latitude: settings.latitude,
                longitude: settings.longitude,
            },
        };

        let started = std::time::Instant::now();
        let attempt = self.executor.attempt(&request).await;
        record_checkin_duration(started.elapsed().as_secs_f64());

        let result = match attempt {
            Ok(outcome) => {
                record_checkin_attempt(outcome.kind.as_str());
                tracing::info!(
                    nip = %employee.nip,
                    outcome = %outcome.kind,
                    checkin_time = ?outcome.checkin_time,
                    "Attempt finished"
                );
                EmployeeResult {
                    nip: employee.nip.clone(),
                    name: employee.name.clone(),
                    success: outcome.success,
                    kind: Some(outcome.kind),
                    message: outcome.message,
                    checkin_time: outcome.checkin_time,
                }
            }
            Err(e) => {
                record_checkin_attempt("error");
                tracing::error!(nip = %employee.nip, error = %e, "Attempt failed");
                EmployeeResult {
                    nip: employee.nip.clone(),
                    name: employee.name.clone(),
                    success: false,
                    kind: None,
                    message: e.to_string(),
                    checkin_time: None,
                }
            }
        };

        let entry = if result.success {
            LogEntry::success(result.message.clone())
        } else {
            LogEntry::error(result.message.clone())
        };
        self.append_log(
            entry
                .employee(employee.label())
                .schedule(schedule)
                .checkin_time(result.checkin_time.clone()),
        )
        .await;

        self.spawn_notification(employee, settings, schedule, &result);
        result
    }

    fn spawn_notification(
        &self,
        employee: &Employee,
        settings: &Settings,
        schedule: &str,
        result: &EmployeeResult,
    ) {
        let Some(phone) = employee.phone() else {
            return;
        };
        if settings.whatsapp.device_token().is_none() {
            return;
        }

        let report = CheckinReport {
            name: employee.name.clone(),
            nip: employee.nip.clone(),
            schedule: schedule.to_string(),
            checkin_time: result.checkin_time.clone(),
            location: settings.location_label.clone(),
            mode: settings.attendance_mode,
            success: result.success,
            message: result.message.clone(),
        };
        let phone = phone.to_string();
        let notifier = Arc::clone(&self.notifier);

        tokio::spawn(async move {
            let outcome = notifier.send_checkin_report(&phone, &report).await;
            record_notification(notification_label(&outcome));
            if let NotificationResult::Failed(reason) = &outcome {
                tracing::warn!(nip = %report.nip, reason = %reason, "Check-in notification failed");
            }
        });
    }

    async fn append_log(&self, entry: LogEntry) {
        if let Err(e) = self.store.logs.append(entry).await {
            tracing::error!(error = %e, "Failed to append log entry");
        }
    }
}

fn notification_label(result: &NotificationResult) -> &'static str {
    match result {
        NotificationResult::Sent => "sent",
        NotificationResult::NoToken => "no_token",
        NotificationResult::NoRecipient => "no_recipient",
        NotificationResult::Failed(_) => "failed",
    }
}

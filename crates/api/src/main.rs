use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use domain::models::WindowKind;
use persistence::Store;
use tracing::{info, warn};

use checkin_api::{
    app::{create_app, AppState},
    config::Config,
    jobs::{CheckinWindowJob, JobScheduler},
    middleware::{init_metrics, logging::init_logging},
    services::{
        BrowserExecutor, CheckinRunner, HttpEmployeeDirectory, RunReport, Trigger,
        WhatsAppGateway, WhatsAppNotifier,
    },
};

/// Grace period for in-flight jobs after a shutdown signal.
const JOB_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Attendance check-in automation with its dashboard API.
#[derive(Debug, Parser)]
#[command(name = "checkin", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the dashboard API and run the daily windows (default)
    Serve,
    /// Import the office's employee directory into the roster
    SyncRoster,
    /// Check in every enabled employee once, right now
    RunNow,
    /// Run one daily window as the scheduler would, guards included
    RunWindow {
        /// pagi, siang or sore
        window: WindowKind,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::load().context("Failed to load configuration")?;
    init_logging(&config.logging);
    init_metrics().context("Failed to install metrics recorder")?;

    info!("Starting check-in service v{}", env!("CARGO_PKG_VERSION"));

    let store = Store::open(&config.storage.data_dir);
    let gateway = WhatsAppGateway::new(&config.whatsapp)?;
    let runner = Arc::new(build_runner(&config, store.clone())?);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config, store, runner, gateway).await,
        Commands::SyncRoster => {
            let summary = runner.sync_roster().await?;
            info!(
                added = summary.added,
                skipped = summary.skipped,
                total = summary.total,
                "Roster synchronized"
            );
            Ok(())
        }
        Commands::RunNow => {
            report(runner.run(Trigger::Manual).await);
            Ok(())
        }
        Commands::RunWindow { window } => {
            report(runner.run(Trigger::Scheduled(window)).await);
            Ok(())
        }
    }
}

fn build_runner(config: &Config, store: Store) -> Result<CheckinRunner> {
    let executor = BrowserExecutor::new(
        config.portal.clone(),
        config.browser.clone(),
        config.pacing.clone(),
        config.storage.screenshot_dir.clone(),
        config.classifier.build(),
    );
    let notifier = WhatsAppNotifier::new(WhatsAppGateway::new(&config.whatsapp)?, store.clone());
    let directory = HttpEmployeeDirectory::new(&config.portal)?;

    Ok(CheckinRunner::new(
        store,
        Arc::new(executor),
        Arc::new(notifier),
        Arc::new(directory),
        config.pacing.clone(),
    ))
}

async fn serve(
    config: Config,
    store: Store,
    runner: Arc<CheckinRunner>,
    gateway: WhatsAppGateway,
) -> Result<()> {
    let mut scheduler = JobScheduler::new();
    if config.scheduler.enabled {
        // Window start times are read once here; edits apply after a restart.
        let settings = store.settings.get().await;
        for window in WindowKind::ALL {
            match CheckinWindowJob::for_window(
                Arc::clone(&runner),
                window,
                settings.schedules.get(window),
            ) {
                Some(job) => scheduler.register(job),
                None => warn!(
                    window = %window,
                    start = %settings.schedules.get(window).start,
                    "Malformed window start time, window not scheduled"
                ),
            }
        }
        scheduler.start();
    } else {
        info!("Scheduler disabled; check-ins run only on demand");
    }

    let addr = config.socket_addr()?;
    let app = create_app(AppState::new(config, store, runner, gateway));

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(JOB_SHUTDOWN_TIMEOUT).await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn report(report: RunReport) {
    match report {
        RunReport::Completed(summary) => info!("Run finished: {}", summary),
        RunReport::NoUsers => warn!("No employees to check in"),
        RunReport::Skipped(reason) => info!(reason = %reason, "Run skipped"),
    }
}

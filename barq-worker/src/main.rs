//! # Barq Worker
//!
//! Background job runner: scans for overdue tasks every hour and
//! dispatches calendar reminders every minute. Both jobs write
//! notification rows; nothing here serves HTTP.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p barq-worker
//! ```

use barq_shared::db::pool::{create_pool, DatabaseConfig};
use barq_worker::{overdue::OverdueScanner, reminders::ReminderDispatcher};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const OVERDUE_INTERVAL: Duration = Duration::from_secs(3600);
const REMINDER_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "barq_worker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Barq Worker v{} starting", env!("CARGO_PKG_VERSION"));

    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

    let db = create_pool(DatabaseConfig {
        url: database_url,
        ..Default::default()
    })
    .await?;

    let scanner = OverdueScanner::new(db.clone());
    let dispatcher = ReminderDispatcher::new(db);

    let mut overdue_tick = tokio::time::interval(OVERDUE_INTERVAL);
    let mut reminder_tick = tokio::time::interval(REMINDER_INTERVAL);

    tracing::info!("Worker running");

    loop {
        tokio::select! {
            _ = overdue_tick.tick() => {
                if let Err(e) = scanner.run_once().await {
                    tracing::error!("Overdue scan failed: {}", e);
                }
            }
            _ = reminder_tick.tick() => {
                if let Err(e) = dispatcher.run_once().await {
                    tracing::error!("Reminder dispatch failed: {}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received, exiting");
                break;
            }
        }
    }

    Ok(())
}

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use courier_channels::{EmailChannel, SmsChannel};
use courier_core::{ChannelKind, CourierConfig, Frequency, NotificationSettings};
use courier_manager::{ChannelRoute, NotificationManager};
use courier_scheduler::{BatchScheduler, Clock};
use courier_users::{User, UserDirectory, UserError};

/// Fixed id of the user the gateway notifies on startup to prove the
/// pipeline end to end.
const DEMO_USER_ID: &str = "demo";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courier=info".into()),
        )
        .init();

    // load config: COURIER_CONFIG env > ~/.courier/courier.toml
    let config_path = std::env::var("COURIER_CONFIG").ok();
    let config = CourierConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        CourierConfig::default()
    });

    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");
    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    let directory = UserDirectory::new(db)?;

    let transport_delay = Duration::from_millis(config.channels.transport_delay_ms);
    let email = Arc::new(EmailChannel::new(directory.clone(), transport_delay));
    let sms = Arc::new(SmsChannel::new(directory.clone(), transport_delay));

    let daily = Arc::new(BatchScheduler::new(Frequency::Daily));
    let weekly = Arc::new(BatchScheduler::new(Frequency::Weekly));
    let mut clock = Clock::from_config(&config.clock);

    let manager = NotificationManager::new(
        directory.clone(),
        vec![
            ChannelRoute::new(ChannelKind::Email, email),
            ChannelRoute::new(ChannelKind::Sms, sms),
        ],
        HashMap::from([
            (Frequency::Daily, daily),
            (Frequency::Weekly, weekly),
        ]),
        &mut clock,
    )?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let handles = clock.start(shutdown_rx);
    info!(
        daily_period_secs = config.clock.daily_period_secs,
        weekly_period_secs = config.clock.weekly_period_secs,
        "courier gateway running, press Ctrl-C to stop"
    );

    // Startup smoke notification: proves directory, channels, and manager
    // are wired before any real traffic arrives.
    seed_demo_user(&directory)?;
    manager.notify(DEMO_USER_ID, "courier gateway is up").await;

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    shutdown_tx.send(true)?;
    for handle in handles {
        handle.await?;
    }

    // Batches are in-memory only: drain whatever is still pending so a
    // restart doesn't silently discard queued notifications.
    manager.notify_frequency(Frequency::Daily).await;
    manager.notify_frequency(Frequency::Weekly).await;
    info!("goodbye");

    Ok(())
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}

/// Seed the demo user. Safe to call on every boot; an existing row (and
/// its accumulated error log) is left untouched.
fn seed_demo_user(directory: &UserDirectory) -> anyhow::Result<()> {
    let mut user = User::new(DEMO_USER_ID, "Demo User");
    user.email = Some("demo@courier.local".to_string());
    user.phone = Some("0600000000".to_string());
    user.settings = Some(NotificationSettings {
        enabled: true,
        by_email: true,
        by_sms: true,
        frequency: Frequency::Immediate,
    });
    match directory.add_user(&user) {
        Ok(()) => info!(user_id = DEMO_USER_ID, "demo user seeded"),
        Err(UserError::AlreadyExists(_)) => {
            debug!(user_id = DEMO_USER_ID, "demo user already present");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use courier_core::config::ClockConfig;
use courier_core::{DeliveryFailure, Frequency};

use crate::batch::BatchScheduler;
use crate::error::{Result, SchedulerError};

/// Process-wide periodic signal source.
///
/// Each registered cadence gets its own spawned interval loop, so a slow
/// flush on one cadence never delays another. Task failures surface through
/// the mpsc sender registered with the cadence; a full channel applies
/// backpressure to that one loop rather than dropping the failure, so every
/// delivery error reaches the consumer. Nothing from a flush ever escapes
/// into the timer loop itself.
pub struct Clock {
    periods: HashMap<Frequency, Duration>,
    slots: Vec<CadenceSlot>,
}

struct CadenceSlot {
    cadence: Frequency,
    period: Duration,
    scheduler: Arc<BatchScheduler>,
    failure_tx: mpsc::Sender<DeliveryFailure>,
}

impl Clock {
    /// A clock firing each cadence at the given period.
    pub fn new(periods: HashMap<Frequency, Duration>) -> Self {
        Self {
            periods,
            slots: Vec::new(),
        }
    }

    /// Daily and weekly cadences with periods taken from the config
    /// (shortened periods make simulated days pass in seconds).
    pub fn from_config(config: &ClockConfig) -> Self {
        Self::new(HashMap::from([
            (
                Frequency::Daily,
                Duration::from_secs(config.daily_period_secs),
            ),
            (
                Frequency::Weekly,
                Duration::from_secs(config.weekly_period_secs),
            ),
        ]))
    }

    /// Subscribe a scheduler's flush to a cadence, wiring the channel its
    /// delivery failures are reported through.
    ///
    /// Fails when the cadence has no configured period or is already taken.
    pub fn on(
        &mut self,
        cadence: Frequency,
        scheduler: Arc<BatchScheduler>,
        failure_tx: mpsc::Sender<DeliveryFailure>,
    ) -> Result<()> {
        let period = *self
            .periods
            .get(&cadence)
            .ok_or(SchedulerError::UnknownCadence(cadence))?;
        if self.slots.iter().any(|slot| slot.cadence == cadence) {
            return Err(SchedulerError::AlreadyRegistered(cadence));
        }
        debug!(cadence = %cadence, period_secs = period.as_secs(), "cadence subscription registered");
        self.slots.push(CadenceSlot {
            cadence,
            period,
            scheduler,
            failure_tx,
        });
        Ok(())
    }

    /// Spawn one tick loop per registered cadence.
    ///
    /// The loops run until `shutdown` flips to `true`. The returned handles
    /// let the caller await a clean stop.
    pub fn start(self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        self.slots
            .into_iter()
            .map(|slot| tokio::spawn(run_cadence(slot, shutdown.clone())))
            .collect()
    }
}

async fn run_cadence(slot: CadenceSlot, mut shutdown: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(slot.period);
    // Overlapping ticks (a flush slower than the period) coalesce instead
    // of bursting.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // A tokio interval yields its first tick immediately; consume it so the
    // cadence first fires one full period after startup.
    interval.tick().await;
    info!(cadence = %slot.cadence, period_secs = slot.period.as_secs(), "cadence started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let failures = slot.scheduler.run().await;
                for failure in failures {
                    // Awaiting here stalls only this cadence's loop when the
                    // channel is full; no failure is ever dropped.
                    if slot.failure_tx.send(failure).await.is_err() {
                        // Nobody listens for this cadence's failures any
                        // more; stop this loop, other cadences keep ticking.
                        error!(cadence = %slot.cadence, "failure channel closed — stopping cadence");
                        return;
                    }
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!(cadence = %slot.cadence, "cadence stopped");
                    return;
                }
            }
        }
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use courier_channels::NotificationChannel;
use courier_core::{ChannelKind, DeliveryFailure, Frequency, NotificationSettings};
use courier_scheduler::{BatchScheduler, Clock, Result as SchedulerResult};
use courier_users::UserDirectory;

/// Buffered failures between the clock loops and the forwarder task.
const FAILURE_CHANNEL_CAPACITY: usize = 256;

/// One entry in the manager's fixed channel list: the adapter plus the
/// settings flag that gates it. Dispatch iterates this list instead of
/// branching on individual settings fields.
pub struct ChannelRoute {
    pub kind: ChannelKind,
    pub channel: Arc<dyn NotificationChannel>,
}

impl ChannelRoute {
    pub fn new(kind: ChannelKind, channel: Arc<dyn NotificationChannel>) -> Self {
        Self { kind, channel }
    }
}

/// The orchestrator: routes each notification request to immediate delivery
/// or into the cadence's batch scheduler, per the user's settings.
///
/// The batch registry is an explicit map injected at construction; a
/// missing frequency key is the intentional "no batching for this
/// frequency" state, not an error.
pub struct NotificationManager {
    directory: UserDirectory,
    routes: Vec<ChannelRoute>,
    batches: HashMap<Frequency, Arc<BatchScheduler>>,
}

impl NotificationManager {
    /// Wire the manager into the clock.
    ///
    /// Every registry entry gets its cadence subscription here, before any
    /// notification traffic, and the forwarder task that drains flush
    /// failures into the directory's error log starts immediately — so no
    /// delivery error is ever lost.
    pub fn new(
        directory: UserDirectory,
        routes: Vec<ChannelRoute>,
        batches: HashMap<Frequency, Arc<BatchScheduler>>,
        clock: &mut Clock,
    ) -> SchedulerResult<Self> {
        let (failure_tx, mut failure_rx) = mpsc::channel(FAILURE_CHANNEL_CAPACITY);
        for (frequency, scheduler) in &batches {
            clock.on(*frequency, Arc::clone(scheduler), failure_tx.clone())?;
        }

        let failure_log = directory.clone();
        tokio::spawn(async move {
            while let Some(failure) = failure_rx.recv().await {
                failure_log.cannot_send_notification(&failure);
            }
        });

        info!(
            channels = routes.len(),
            cadences = batches.len(),
            "notification manager wired"
        );
        Ok(Self {
            directory,
            routes,
            batches,
        })
    }

    /// Dispatch one notification according to the user's settings.
    ///
    /// Unknown users and disabled settings are silent no-ops. Immediate
    /// delivery completes before this returns; batched delivery only
    /// enqueues. Never fails the caller — every delivery problem lands in
    /// the user's error log instead.
    pub async fn notify(&self, user_id: &str, message: &str) {
        let settings = match self.directory.get_user_settings(user_id) {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                debug!(user_id = %user_id, "notify for unknown user ignored");
                return;
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "settings lookup failed, notification dropped");
                return;
            }
        };
        if !settings.enabled {
            debug!(user_id = %user_id, "notifications disabled for user");
            return;
        }

        match settings.frequency {
            Frequency::Immediate => self.send_notification(user_id, &settings, message).await,
            frequency => self.enqueue_batch(frequency, user_id, &settings, message),
        }
    }

    /// Send on every enabled channel now, concurrently.
    ///
    /// Waits until all launched sends have settled; one channel's failure
    /// never prevents the others from being attempted.
    pub async fn send_notification(
        &self,
        user_id: &str,
        settings: &NotificationSettings,
        message: &str,
    ) {
        let sends = self.enabled_routes(settings).map(|route| {
            let channel = Arc::clone(&route.channel);
            async move {
                match channel.send(user_id, message).await {
                    Ok(()) => None,
                    Err(e) => Some(DeliveryFailure {
                        user_id: user_id.to_string(),
                        error: e.to_string(),
                    }),
                }
            }
        });

        for failure in join_all(sends).await.into_iter().flatten() {
            self.directory.cannot_send_notification(&failure);
        }
    }

    /// Flush the batch registered for `frequency` right now, if any.
    /// A frequency without a scheduler is a repeatable no-op.
    pub async fn notify_frequency(&self, frequency: Frequency) {
        let Some(scheduler) = self.batches.get(&frequency) else {
            debug!(frequency = %frequency, "no batch scheduler for frequency, nothing to flush");
            return;
        };
        for failure in scheduler.run().await {
            self.directory.cannot_send_notification(&failure);
        }
    }

    /// One task per enabled channel into the frequency's scheduler. The
    /// tasks capture everything they need; nothing runs until the flush.
    fn enqueue_batch(
        &self,
        frequency: Frequency,
        user_id: &str,
        settings: &NotificationSettings,
        message: &str,
    ) {
        let Some(scheduler) = self.batches.get(&frequency) else {
            debug!(
                user_id = %user_id,
                frequency = %frequency,
                "no batch scheduler for frequency, notification dropped"
            );
            return;
        };

        for route in self.enabled_routes(settings) {
            let channel = Arc::clone(&route.channel);
            let user = user_id.to_string();
            let body = message.to_string();
            scheduler.add_task(Box::pin(async move {
                match channel.send(&user, &body).await {
                    Ok(()) => None,
                    Err(e) => Some(DeliveryFailure {
                        user_id: user,
                        error: e.to_string(),
                    }),
                }
            }));
        }
        debug!(user_id = %user_id, frequency = %frequency, "notification batched");
    }

    fn enabled_routes<'a>(
        &'a self,
        settings: &'a NotificationSettings,
    ) -> impl Iterator<Item = &'a ChannelRoute> {
        self.routes
            .iter()
            .filter(move |route| settings.channel_enabled(route.kind))
    }
}

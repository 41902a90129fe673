// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic sweep driver.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::SyncConfig;
use crate::source::StateSource;

use super::{SyncEngine, SyncOrigin};

/// Runs [`SyncEngine::sync_all`] at a fixed interval.
///
/// Each sweep runs in its own task. A sweep that panics is logged and the
/// loop resumes after the fault backoff instead of the poll interval, so a
/// misbehaving source cannot stop polling for good.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use appliance_sync::config::{DeviceConfig, SyncConfig};
/// use appliance_sync::event::ChangePublisher;
/// use appliance_sync::source::MemorySource;
/// use appliance_sync::store::DeviceStore;
/// use appliance_sync::sync::{Scheduler, SyncEngine};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let config = SyncConfig::new().with_poll_interval(Duration::from_millis(100));
/// let store = Arc::new(DeviceStore::new(&DeviceConfig::default_catalogue()));
/// let engine = SyncEngine::new(MemorySource::new(), store, ChangePublisher::default(), &config);
///
/// let handle = Scheduler::new(engine, &config).spawn();
/// handle.shutdown().await;
/// # }
/// ```
#[derive(Debug)]
pub struct Scheduler<S> {
    engine: SyncEngine<S>,
    poll_interval: Duration,
    fault_backoff: Duration,
}

impl<S: StateSource> Scheduler<S> {
    /// Creates a scheduler for `engine` with the timing from `config`.
    #[must_use]
    pub fn new(engine: SyncEngine<S>, config: &SyncConfig) -> Self {
        Self {
            engine,
            poll_interval: config.poll_interval(),
            fault_backoff: config.fault_backoff(),
        }
    }

    /// Starts the polling loop on the current tokio runtime.
    ///
    /// The first sweep starts immediately.
    #[must_use = "dropping the handle stops the scheduler"]
    pub fn spawn(self) -> SchedulerHandle {
        let (stop, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(stop_rx));
        SchedulerHandle { stop, task }
    }

    async fn run(self, mut stop: watch::Receiver<bool>) {
        tracing::info!(
            poll_interval_ms = u64::try_from(self.poll_interval.as_millis()).unwrap_or(u64::MAX),
            "Scheduler started"
        );

        loop {
            let stopped = *stop.borrow_and_update();
            if stopped {
                break;
            }

            let engine = self.engine.clone();
            let sweep = tokio::spawn(async move { engine.sync_all(SyncOrigin::Periodic).await });

            // The sweep is awaited to completion even if a stop arrives
            // meanwhile; the stop is seen by `changed` below.
            let delay = match sweep.await {
                Ok(_) => self.poll_interval,
                Err(e) if e.is_panic() => {
                    tracing::error!(error = %e, "Sweep panicked, backing off");
                    self.fault_backoff
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Sweep cancelled");
                    break;
                }
            };

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                changed = stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Scheduler stopped");
    }
}

/// Handle to a running [`Scheduler`].
///
/// Dropping the handle also stops the loop once the current sweep is done.
#[derive(Debug)]
pub struct SchedulerHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Returns `true` while the loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Signals the loop to stop and waits for it to exit.
    ///
    /// A sweep that is already running completes first.
    pub async fn shutdown(self) {
        self.stop.send_replace(true);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Scheduler task ended abnormally");
        }
    }
}

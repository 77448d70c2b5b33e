//! Recurring auto-save poll.
//!
//! The host has no change-notification hook, so drift between the live chord
//! and the persisted one is found by polling. Each timer owns one background
//! thread; ticks for a given timer never overlap. A timer stops when its
//! handle is stopped or dropped, or after `max_ticks` ticks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info};

use crate::config::DEFAULT_AUTO_SAVE_INTERVAL_MS;

/// Poll interval and stop condition for one auto-save timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoSaveConfig {
    pub interval: Duration,
    /// Stop after this many ticks. `None` = run until stopped.
    pub max_ticks: Option<u64>,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_AUTO_SAVE_INTERVAL_MS),
            max_ticks: None,
        }
    }
}

impl AutoSaveConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }
}

#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

/// Handle to a running auto-save timer. Dropping it stops the timer.
pub struct AutoSaveHandle {
    name: String,
    signal: Arc<StopSignal>,
    ticks: Arc<AtomicU64>,
    thread_handle: Option<JoinHandle<()>>,
}

impl AutoSaveHandle {
    /// Start a timer that calls `tick` every `config.interval`.
    pub fn spawn<F>(name: &str, config: AutoSaveConfig, mut tick: F) -> std::io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let signal = Arc::new(StopSignal::default());
        let ticks = Arc::new(AtomicU64::new(0));

        let loop_signal = Arc::clone(&signal);
        let loop_ticks = Arc::clone(&ticks);
        let loop_name = name.to_string();

        let thread_handle = thread::Builder::new()
            .name(format!("auto-save-{}", name))
            .spawn(move || {
                info!(
                    shortcut_id = %loop_name,
                    interval_ms = config.interval.as_millis() as u64,
                    max_ticks = ?config.max_ticks,
                    "Auto-save loop started"
                );
                loop {
                    {
                        let mut stopped = loop_signal.stopped.lock();
                        if !*stopped {
                            let _ = loop_signal.wake.wait_while_for(
                                &mut stopped,
                                |stopped| !*stopped,
                                config.interval,
                            );
                        }
                        if *stopped {
                            break;
                        }
                    }

                    tick();

                    let count = loop_ticks.fetch_add(1, Ordering::SeqCst) + 1;
                    if config.max_ticks.is_some_and(|max| count >= max) {
                        debug!(shortcut_id = %loop_name, ticks = count, "Auto-save tick limit reached");
                        break;
                    }
                }
                info!(shortcut_id = %loop_name, "Auto-save loop stopping");
            })?;

        Ok(Self {
            name: name.to_string(),
            signal,
            ticks,
            thread_handle: Some(thread_handle),
        })
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the timer and wait for an in-flight tick to finish.
    pub fn stop(&mut self) {
        *self.signal.stopped.lock() = true;
        self.signal.wake.notify_all();

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
            debug!(shortcut_id = %self.name, "Auto-save timer stopped");
        }
    }
}

impl Drop for AutoSaveHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

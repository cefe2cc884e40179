//! Background presence updater
//!
//! Publishes the viewer's current activity ("viewing teapot.obj") through a
//! pluggable transport on a fixed interval from a worker thread. Transport
//! failures are tolerated up to a point: a success resets the counter, but
//! three consecutive failures stop rescheduling for good so a dead endpoint
//! is not hammered for the rest of the session.

use kiln_core::Result;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// Consecutive failures after which the updater stops for good
const MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// The status published on each interval
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceStatus {
    /// Short activity line, e.g. "Viewing a model"
    pub state: String,
    /// Detail line, e.g. the model file name
    pub details: String,
}

/// Destination for presence updates
pub trait PresenceTransport: Send {
    fn connect(&mut self) -> Result<()>;
    fn update(&mut self, status: &PresenceStatus) -> Result<()>;
}

/// Transport that just logs updates to stdout
#[derive(Debug, Default)]
pub struct LogPresence;

impl PresenceTransport for LogPresence {
    fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, status: &PresenceStatus) -> Result<()> {
        println!("Presence: {} - {}", status.state, status.details);
        Ok(())
    }
}

/// Owns the worker thread and the shared status it publishes
pub struct PresenceUpdater {
    status: Arc<Mutex<PresenceStatus>>,
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl PresenceUpdater {
    /// Spawn the worker. The first publish happens after one interval.
    pub fn start(mut transport: Box<dyn PresenceTransport>, interval: Duration) -> Self {
        let status = Arc::new(Mutex::new(PresenceStatus::default()));
        let (stop, stop_rx) = mpsc::channel::<()>();

        let worker_status = status.clone();
        let worker = std::thread::spawn(move || {
            if let Err(e) = transport.connect() {
                eprintln!("Presence: connect failed: {e}");
                return;
            }

            let mut consecutive_failures = 0u32;
            loop {
                match stop_rx.recv_timeout(interval) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                    Err(RecvTimeoutError::Timeout) => {}
                }

                let snapshot = match worker_status.lock() {
                    Ok(guard) => guard.clone(),
                    Err(_) => return,
                };

                match transport.update(&snapshot) {
                    Ok(()) => consecutive_failures = 0,
                    Err(e) => {
                        consecutive_failures += 1;
                        eprintln!(
                            "Presence: update failed ({consecutive_failures}/{MAX_CONSECUTIVE_FAILURES}): {e}"
                        );
                        if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                            eprintln!("Presence: giving up");
                            return;
                        }
                    }
                }
            }
        });

        Self {
            status,
            stop: Some(stop),
            worker: Some(worker),
        }
    }

    /// Replace the status published on the next interval.
    pub fn set_status(&self, state: impl Into<String>, details: impl Into<String>) {
        if let Ok(mut guard) = self.status.lock() {
            guard.state = state.into();
            guard.details = details.into();
        }
    }
}

impl Drop for PresenceUpdater {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::KilnError;

    /// Scripted transport: pops one outcome per update call
    struct MockTransport {
        outcomes: Vec<bool>,
        calls: Arc<Mutex<u32>>,
    }

    impl PresenceTransport for MockTransport {
        fn connect(&mut self) -> Result<()> {
            Ok(())
        }

        fn update(&mut self, _status: &PresenceStatus) -> Result<()> {
            let mut calls = self.calls.lock().unwrap();
            let index = *calls as usize;
            *calls += 1;
            if self.outcomes.get(index).copied().unwrap_or(true) {
                Ok(())
            } else {
                Err(KilnError::PresenceError("scripted failure".into()))
            }
        }
    }

    fn run_updater(outcomes: Vec<bool>, intervals_to_wait: u64) -> u32 {
        let calls = Arc::new(Mutex::new(0));
        let transport = MockTransport {
            outcomes,
            calls: calls.clone(),
        };
        let interval = Duration::from_millis(10);
        let updater = PresenceUpdater::start(Box::new(transport), interval);
        std::thread::sleep(interval * intervals_to_wait as u32 + Duration::from_millis(25));
        drop(updater);
        let count = *calls.lock().unwrap();
        count
    }

    #[test]
    fn publishes_on_each_interval() {
        let calls = run_updater(vec![], 5);
        assert!(calls >= 3, "expected several updates, saw {calls}");
    }

    #[test]
    fn stops_after_three_consecutive_failures() {
        // Every update fails; the worker must stop at exactly 3 calls no
        // matter how long it runs
        let calls = run_updater(vec![false; 32], 10);
        assert_eq!(calls, 3);
    }

    #[test]
    fn success_resets_the_failure_count() {
        // fail, fail, ok, fail, fail, fail: the streak before the success
        // does not count toward the cutoff
        let calls = run_updater(vec![false, false, true, false, false, false], 12);
        assert_eq!(calls, 6);
    }

    #[test]
    fn set_status_is_visible_to_the_worker() {
        let status = Arc::new(Mutex::new(PresenceStatus::default()));
        let updater = PresenceUpdater {
            status: status.clone(),
            stop: None,
            worker: None,
        };
        updater.set_status("Viewing a model", "teapot.obj");
        assert_eq!(status.lock().unwrap().details, "teapot.obj");
    }
}

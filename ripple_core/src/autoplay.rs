//! Autoplay - a timer thread that triggers ripples without user input.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{info, warn};

use crate::engine::RippleEngine;
use crate::events::EngineEvent;

/// Autoplay settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoplayConfig {
    pub interval_ms: u64,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self { interval_ms: 3_000 }
    }
}

impl AutoplayConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

/// Handle to a running autoplay timer. Dropping it stops the timer.
pub struct Autoplay {
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
    fired: Arc<AtomicU64>,
}

impl Autoplay {
    /// Start firing `autoplay_step` on `engine` every `interval`.
    pub fn start(engine: Arc<Mutex<RippleEngine>>, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let running = Arc::new(AtomicBool::new(true));
        let fired = Arc::new(AtomicU64::new(0));

        let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        engine.lock().emit(EngineEvent::AutoplayStarted { interval_ms });
        info!(interval_ms, "autoplay started");

        let running_clone = Arc::clone(&running);
        let fired_clone = Arc::clone(&fired);
        let thread = std::thread::Builder::new()
            .name("ripples-autoplay".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    let mut engine = engine.lock();
                    match engine.autoplay_step() {
                        Ok(_) => {
                            fired_clone.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(err) => warn!(error = %err, "autoplay step failed"),
                    }
                }

                let ripples = fired_clone.load(Ordering::Relaxed);
                running_clone.store(false, Ordering::Release);
                engine.lock().emit(EngineEvent::AutoplayStopped { ripples });
                info!(ripples, "autoplay stopped");
            })
            .ok();

        if thread.is_none() {
            warn!("failed to spawn autoplay thread");
            running.store(false, Ordering::Release);
        }

        Self {
            stop_tx: Some(stop_tx),
            thread,
            running,
            fired,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ripples fired so far.
    pub fn fired(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }

    /// Stop the timer and wait for the thread. Returns the ripples fired.
    pub fn stop(mut self) -> u64 {
        self.shutdown();
        self.fired()
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("autoplay thread panicked");
            }
        }
    }
}

impl Drop for Autoplay {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use std::time::Instant;
    use world_rules::Catalog;

    fn shared_engine() -> Arc<Mutex<RippleEngine>> {
        let config = EngineConfig {
            seed: Some(3),
            ..EngineConfig::default()
        };
        let mut engine = RippleEngine::new(Catalog::builtin().unwrap(), config);
        engine.load_scenario(&"lighthouse".into()).unwrap();
        Arc::new(Mutex::new(engine))
    }

    #[test]
    fn test_autoplay_fires_and_stops() {
        let engine = shared_engine();
        let autoplay = Autoplay::start(Arc::clone(&engine), Duration::from_millis(10));

        let deadline = Instant::now() + Duration::from_secs(5);
        while autoplay.fired() < 3 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(autoplay.is_running());

        let fired = autoplay.stop();
        assert!(fired >= 3);

        let engine = engine.lock();
        assert_eq!(engine.tick(), fired);
        assert_eq!(engine.audit().len() as u64, fired.min(50));
    }

    #[test]
    fn test_stop_is_prompt_with_long_interval() {
        let engine = shared_engine();
        let autoplay = Autoplay::start(Arc::clone(&engine), Duration::from_secs(60));

        let started = Instant::now();
        assert_eq!(autoplay.stop(), 0);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(engine.lock().tick(), 0);
    }

    #[test]
    fn test_lifecycle_events() {
        let engine = shared_engine();
        let names = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&names);
        engine.lock().subscribe(move |event| sink.lock().push(event.name()));

        drop(Autoplay::start(Arc::clone(&engine), Duration::from_secs(60)));

        assert_eq!(*names.lock(), vec!["autoplay_started", "autoplay_stopped"]);
    }

    #[test]
    fn test_errors_do_not_stop_the_timer() {
        let engine = Arc::new(Mutex::new(RippleEngine::new(
            Catalog::builtin().unwrap(),
            EngineConfig::default(),
        )));
        // No scenario loaded: every step fails.
        let autoplay = Autoplay::start(Arc::clone(&engine), Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(40));
        assert!(autoplay.is_running());
        assert_eq!(autoplay.stop(), 0);
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

/// Cooperative shutdown request shared between the signal handler and the
/// watch loop.
///
/// The loop checks it between cycles; waits on it wake as soon as shutdown
/// is requested instead of sleeping out the full poll interval.
#[derive(Debug)]
pub struct ShutdownToken {
    requested: AtomicBool,
    condvar: Condvar,
    mutex: Mutex<()>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
            condvar: Condvar::new(),
            mutex: Mutex::new(()),
        }
    }

    /// Request shutdown and wake every waiter.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
        // Hold the lock so a waiter between its check and its wait cannot miss the wakeup
        let _guard = self.mutex.lock();
        self.condvar.notify_all();
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Sleep for `duration` unless shutdown is requested first.
    ///
    /// Returns `true` if shutdown was requested.
    pub fn wait(&self, duration: Duration) -> bool {
        if self.is_requested() {
            return true;
        }

        let Ok(guard) = self.mutex.lock() else {
            return true;
        };
        match self
            .condvar
            .wait_timeout_while(guard, duration, |_| !self.is_requested())
        {
            Ok(_) => self.is_requested(),
            // Poisoned mutex, nothing sensible left to wait for
            Err(_) => true,
        }
    }
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a handler for SIGINT, SIGTERM and SIGHUP that requests shutdown.
///
/// Only one handler can exist per process; a second call fails.
pub fn install_signal_handler() -> Result<Arc<ShutdownToken>> {
    let token = Arc::new(ShutdownToken::new());
    ctrlc::set_handler(termination_handler(Arc::clone(&token)))
        .context("Failed to install signal handler")?;
    Ok(token)
}

fn termination_handler(token: Arc<ShutdownToken>) -> impl FnMut() + Send + 'static {
    move || {
        if token.is_requested() {
            info!("Shutdown already in progress");
            return;
        }
        info!("Received termination signal, stopping after the current cycle...");
        token.request();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    /// Runs cycles the way the watch loop does and counts them
    fn run_cycles(token: &ShutdownToken, interval: Duration, limit: u32) -> u32 {
        let mut cycles = 0;
        while !token.is_requested() && cycles < limit {
            cycles += 1;
            if token.wait(interval) {
                break;
            }
        }
        cycles
    }

    #[test]
    fn test_install_signal_handler_once() {
        let token = install_signal_handler().unwrap();
        assert!(!token.is_requested());

        let err = install_signal_handler().unwrap_err();
        assert!(format!("{:#}", err).starts_with("Failed to install signal handler"));
    }

    #[test]
    fn test_termination_handler_requests_shutdown() {
        let token = Arc::new(ShutdownToken::new());
        let mut handler = termination_handler(Arc::clone(&token));

        handler();
        assert!(token.is_requested());

        // A repeated signal is harmless
        handler();
        assert!(token.is_requested());
    }

    #[test]
    fn test_cycles_run_until_limit_without_signal() {
        let token = ShutdownToken::new();
        let start = Instant::now();
        assert_eq!(run_cycles(&token, Duration::from_millis(10), 3), 3);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_signal_during_poll_interval_ends_watch() {
        let token = Arc::new(ShutdownToken::new());
        let mut handler = termination_handler(Arc::clone(&token));
        let watcher = Arc::clone(&token);

        let handle = thread::spawn(move || {
            let start = Instant::now();
            let cycles = run_cycles(&watcher, Duration::from_secs(5), 100);
            (cycles, start.elapsed())
        });

        thread::sleep(Duration::from_millis(50));
        handler();

        let (cycles, elapsed) = handle.join().unwrap();
        assert_eq!(cycles, 1);
        assert!(elapsed < Duration::from_secs(1));
    }

    #[test]
    fn test_signal_before_first_cycle_skips_watch() {
        let token = ShutdownToken::new();
        token.request();
        assert_eq!(run_cycles(&token, Duration::from_secs(5), 100), 0);
        assert!(token.wait(Duration::from_secs(5)));
    }
}

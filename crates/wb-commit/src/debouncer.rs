//! Debounced commit primitive
//!
//! A [`Debouncer`] holds the latest observed value and a single commit timer.
//! Every observation replaces the value, aborts the previous timer and
//! spawns a fresh one. Timers carry a generation number; a timer whose
//! generation is no longer current does nothing when it wakes, so a timer
//! that slips past `abort` can never commit early.

use crate::error::DebounceError;
use crate::status::CommitStatus;
use chrono::Utc;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use wb_diagnostics::{default_reporter, Diagnostic, DiagnosticKind, Reporter};

/// Quiet period used by the editor autosave
pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

/// Commit callback shared between the debouncer and its timer
///
/// Runs on a tokio worker thread. Slow or blocking callbacks (a synced file
/// write, say) occupy that worker until they return.
pub type CommitFn<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

/// State shared with the live timer
struct Shared<T> {
    pending: Option<T>,
    generation: u64,
    /// Commits taken by a timer and not yet finished
    in_flight: usize,
    status: CommitStatus,
}

/// Coalesces bursts of values into one deferred commit
///
/// Must be used from inside a tokio runtime (or built with
/// [`Debouncer::with_runtime`]). Dropping the debouncer is teardown: the
/// pending value, if any, is discarded without committing.
pub struct Debouncer<T> {
    delay: Duration,
    commit: CommitFn<T>,
    shared: Arc<Mutex<Shared<T>>>,
    /// Serializes commit callbacks
    gate: Arc<Mutex<()>>,
    timer: Option<JoinHandle<()>>,
    runtime: Handle,
    reporter: Arc<dyn Reporter>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create debouncer on the current tokio runtime
    ///
    /// # Errors
    /// - `DebounceError::NoRuntime` when called outside a tokio runtime
    pub fn new<F>(commit: F, delay: Duration) -> Result<Self, DebounceError>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let runtime =
            Handle::try_current().map_err(|e| DebounceError::NoRuntime(e.to_string()))?;
        Ok(Self::with_runtime(runtime, commit, delay))
    }

    /// Create debouncer scheduling its timers on `runtime`
    #[must_use]
    pub fn with_runtime<F>(runtime: Handle, commit: F, delay: Duration) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            commit: Arc::new(commit),
            shared: Arc::new(Mutex::new(Shared {
                pending: None,
                generation: 0,
                in_flight: 0,
                status: CommitStatus::default(),
            })),
            gate: Arc::new(Mutex::new(())),
            timer: None,
            runtime,
            reporter: default_reporter(),
        }
    }

    /// Route diagnostics to `reporter` instead of `tracing`
    #[inline]
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Record a new value and restart the quiet period
    ///
    /// Call once per logical change. The commit callback is never invoked
    /// from inside this call.
    pub fn observe(&mut self, value: T) {
        let (generation, superseded) = {
            let mut shared = self.shared.lock();
            let superseded = shared.pending.replace(value).is_some();
            if superseded {
                shared.status.superseded_count += 1;
            }
            shared.generation = shared.generation.wrapping_add(1);
            shared.status.pending = true;
            (shared.generation, superseded)
        };

        if superseded {
            self.reporter.report(Diagnostic::new(
                DiagnosticKind::CommitSuperseded,
                "pending value replaced before its commit",
            ));
        }

        if let Some(previous) = self.timer.take() {
            previous.abort();
        }

        let timer = CommitTimer {
            generation,
            delay: self.delay,
            commit: Arc::clone(&self.commit),
            shared: Arc::clone(&self.shared),
            gate: Arc::clone(&self.gate),
            reporter: Arc::clone(&self.reporter),
        };
        self.timer = Some(self.runtime.spawn(timer.run()));

        tracing::debug!(
            generation,
            delay_ms = u64::try_from(self.delay.as_millis()).unwrap_or(u64::MAX),
            "commit scheduled"
        );
    }

    /// Replace callback and delay, then observe
    ///
    /// Mirrors callers that pass the callback and delay on every change.
    pub fn observe_with<F>(&mut self, value: T, commit: F, delay: Duration)
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.commit = Arc::new(commit);
        self.delay = delay;
        self.observe(value);
    }
}

impl<T> Debouncer<T> {
    /// Discard the pending value and its timer
    ///
    /// Returns the discarded value. The debouncer stays usable.
    pub fn cancel(&mut self) -> Option<T> {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let discarded = {
            let mut shared = self.shared.lock();
            shared.generation = shared.generation.wrapping_add(1);
            shared.status.pending = false;
            shared.pending.take()
        };

        if discarded.is_some() {
            self.reporter.report(Diagnostic::new(
                DiagnosticKind::CommitAbandoned,
                "pending value discarded by teardown",
            ));
        }

        discarded
    }

    /// Snapshot of the current bookkeeping
    #[must_use]
    pub fn status(&self) -> CommitStatus {
        self.shared.lock().status.clone()
    }

    /// A value is waiting for its timer
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.shared.lock().status.pending
    }

    /// Quiet period
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the quiet period; applies from the next observation
    #[inline]
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<T> fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

/// One scheduled commit
struct CommitTimer<T> {
    generation: u64,
    delay: Duration,
    commit: CommitFn<T>,
    shared: Arc<Mutex<Shared<T>>>,
    gate: Arc<Mutex<()>>,
    reporter: Arc<dyn Reporter>,
}

impl<T: Send + 'static> CommitTimer<T> {
    async fn run(self) {
        tokio::time::sleep(self.delay).await;
        self.fire();
    }

    fn fire(self) {
        let value = {
            let mut shared = self.shared.lock();
            if shared.generation != self.generation {
                return;
            }
            let value = shared.pending.take();
            shared.status.pending = false;
            if value.is_some() {
                shared.in_flight += 1;
                shared.status.committing = true;
            }
            value
        };

        let Some(value) = value else {
            return;
        };

        let _gate = self.gate.lock();
        let _finish = FinishCommit {
            shared: &self.shared,
        };
        (self.commit)(value);

        self.reporter.report(Diagnostic::new(
            DiagnosticKind::CommitFired,
            format!("committed generation {}", self.generation),
        ));
    }
}

/// Closes out the status when the callback returns or unwinds
struct FinishCommit<'a, T> {
    shared: &'a Mutex<Shared<T>>,
}

impl<T> Drop for FinishCommit<'_, T> {
    fn drop(&mut self) {
        let mut shared = self.shared.lock();
        shared.in_flight = shared.in_flight.saturating_sub(1);
        if !std::thread::panicking() {
            shared.status.record_commit(Utc::now());
        }
        // A later timer may already hold a value and wait on the gate
        shared.status.committing = shared.in_flight > 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::time::{sleep, Instant};
    use wb_diagnostics::RecordingReporter;

    type Log<T> = Arc<Mutex<Vec<(T, Instant)>>>;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn recorder<T: Send + 'static>() -> (Log<T>, impl Fn(T) + Send + Sync + 'static) {
        let log: Log<T> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        (log, move |value| sink.lock().push((value, Instant::now())))
    }

    fn values<T: Clone>(log: &Log<T>) -> Vec<T> {
        log.lock().iter().map(|(v, _)| v.clone()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn burst_commits_once_with_last_value() {
        let (log, commit) = recorder();
        let mut debouncer = Debouncer::new(commit, ms(300)).unwrap();

        for v in 1..=5 {
            debouncer.observe(v);
            sleep(ms(50)).await;
        }
        sleep(ms(1000)).await;

        assert_eq!(values(&log), vec![5]);
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_period_restarts_on_each_observation() {
        let start = Instant::now();
        let (log, commit) = recorder();
        let mut debouncer = Debouncer::new(commit, ms(300)).unwrap();

        debouncer.observe(1);
        sleep(ms(100)).await;
        debouncer.observe(2);

        // The first timer would have fired at 300ms.
        sleep(ms(250)).await;
        assert!(log.lock().is_empty());

        sleep(ms(100)).await;
        let entries = log.lock().clone();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, 2);
        let elapsed = entries[0].1 - start;
        assert!(elapsed >= ms(400), "fired at {elapsed:?}");
        assert!(elapsed < ms(410), "fired at {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_commit_separately() {
        let (log, commit) = recorder();
        let mut debouncer = Debouncer::new(commit, ms(200)).unwrap();

        debouncer.observe("a1");
        debouncer.observe("a2");
        sleep(ms(500)).await;
        debouncer.observe("b1");
        debouncer.observe("b2");
        sleep(ms(500)).await;

        assert_eq!(values(&log), vec!["a2", "b2"]);
        assert_eq!(debouncer.status().commit_count, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_prevents_commit() {
        let (log, commit) = recorder();
        let reporter = Arc::new(RecordingReporter::new());
        let mut debouncer = Debouncer::new(commit, ms(300))
            .unwrap()
            .with_reporter(reporter.clone());

        debouncer.observe(42);
        sleep(ms(100)).await;
        drop(debouncer);
        sleep(ms(1000)).await;

        assert!(log.lock().is_empty());
        assert_eq!(reporter.count(DiagnosticKind::CommitAbandoned), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_returns_discarded_value_and_stays_usable() {
        let (log, commit) = recorder();
        let mut debouncer = Debouncer::new(commit, ms(100)).unwrap();

        debouncer.observe(1);
        assert_eq!(debouncer.cancel(), Some(1));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.cancel(), None);

        sleep(ms(500)).await;
        assert!(log.lock().is_empty());

        debouncer.observe(2);
        sleep(ms(500)).await;
        assert_eq!(values(&log), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_never_commits_synchronously() {
        let (log, commit) = recorder();
        let mut debouncer = Debouncer::new(commit, Duration::ZERO).unwrap();

        debouncer.observe(7);
        assert!(log.lock().is_empty());
        assert!(debouncer.is_pending());

        sleep(ms(10)).await;
        assert_eq!(values(&log), vec![7]);
    }

    #[tokio::test(start_paused = true)]
    async fn observe_with_replaces_callback_and_delay() {
        let (first_log, first) = recorder();
        let (second_log, second) = recorder();
        let mut debouncer = Debouncer::new(first, ms(300)).unwrap();

        debouncer.observe(1);
        debouncer.observe_with(2, second, ms(50));
        assert_eq!(debouncer.delay(), ms(50));

        sleep(ms(100)).await;
        assert!(first_log.lock().is_empty());
        assert_eq!(values(&second_log), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn status_tracks_superseded_and_commits() {
        let (_log, commit) = recorder();
        let reporter = Arc::new(RecordingReporter::new());
        let mut debouncer = Debouncer::new(commit, ms(100))
            .unwrap()
            .with_reporter(reporter.clone());

        debouncer.observe(1);
        debouncer.observe(2);
        debouncer.observe(3);

        let status = debouncer.status();
        assert!(status.pending);
        assert_eq!(status.superseded_count, 2);
        assert!(!status.has_committed());

        sleep(ms(200)).await;
        let status = debouncer.status();
        assert!(status.is_idle());
        assert_eq!(status.commit_count, 1);
        assert!(status.last_committed_at.is_some());
        assert_eq!(reporter.count(DiagnosticKind::CommitSuperseded), 2);
        assert_eq!(reporter.count(DiagnosticKind::CommitFired), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_commit_is_not_caught_or_retried() {
        let (log, record) = recorder();
        let commit = move |v: i32| {
            assert!(v != 1, "commit rejected {v}");
            record(v);
        };
        let mut debouncer = Debouncer::new(commit, ms(100)).unwrap();

        debouncer.observe(1);
        sleep(ms(200)).await;
        let status = debouncer.status();
        assert!(!status.committing);
        assert_eq!(status.commit_count, 0);

        sleep(ms(1000)).await;
        assert!(log.lock().is_empty());

        debouncer.observe(2);
        sleep(ms(200)).await;
        assert_eq!(values(&log), vec![2]);
    }

    #[test]
    fn new_outside_runtime_fails() {
        let result = Debouncer::<i32>::new(|_| {}, ms(10));
        assert!(matches!(result, Err(DebounceError::NoRuntime(_))));
    }

    #[test]
    fn with_runtime_schedules_on_given_handle() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();
        let (log, commit) = recorder();
        let mut debouncer = Debouncer::with_runtime(runtime.handle().clone(), commit, ms(50));

        debouncer.observe("saved");
        runtime.block_on(async { sleep(ms(100)).await });

        assert_eq!(values(&log), vec!["saved"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn overlapping_timers_stay_committing_and_never_run_concurrently() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let committed = Arc::new(Mutex::new(Vec::new()));
        let commit = {
            let (running, peak, committed) =
                (Arc::clone(&running), Arc::clone(&peak), Arc::clone(&committed));
            move |v: i32| {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(300));
                committed.lock().push(v);
                running.fetch_sub(1, Ordering::SeqCst);
            }
        };
        let mut debouncer = Debouncer::new(commit, Duration::ZERO).unwrap();

        debouncer.observe(1);
        tokio::time::sleep(ms(100)).await;
        debouncer.observe(2);

        // First callback is running, second waits on the gate
        tokio::time::sleep(ms(100)).await;
        assert!(debouncer.status().committing);

        // First has finished, second is running
        tokio::time::sleep(ms(250)).await;
        let status = debouncer.status();
        assert_eq!(status.commit_count, 1);
        assert!(status.committing);
        assert!(!status.is_idle());

        let mut waited = 0;
        while !debouncer.status().is_idle() && waited < 50 {
            tokio::time::sleep(ms(50)).await;
            waited += 1;
        }
        let status = debouncer.status();
        assert!(status.is_idle());
        assert_eq!(status.commit_count, 2);
        assert_eq!(*committed.lock(), vec![1, 2]);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn commit_runs_on_a_runtime_worker() {
        let on_runtime = Arc::new(Mutex::new(None));
        let seen = Arc::clone(&on_runtime);
        let mut debouncer = Debouncer::new(
            move |_: ()| *seen.lock() = Some(Handle::try_current().is_ok()),
            ms(10),
        )
        .unwrap();

        debouncer.observe(());
        sleep(ms(20)).await;
        assert_eq!(*on_runtime.lock(), Some(true));
    }
}

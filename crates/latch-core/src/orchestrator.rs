//! The refresh orchestrator: periodic cycle and debounced persistence
//!
//! Two background tasks run over the single-owner engine:
//!
//! - The refresh cycle reads the external usage counter each period,
//!   applies a changed total through the tracker, and re-runs the evaluator
//!   unconditionally (policy/chore edits can happen outside the tick). It
//!   also re-schedules chore instances when the local day rolls over.
//! - The saver listens on the engine's change notifier and writes the
//!   snapshot only after a quiet period with no further mutations; rapid
//!   mutation bursts coalesce into one write. A pending write lost at
//!   process exit is acceptable (write-behind), but `shutdown` performs a
//!   final save after joining both tasks.
//!
//! `start` is a guarded no-op when already running; `shutdown` cancels via
//! a watch channel and awaits both join handles before returning.

use latch_device::UsageCounter;
use latch_store::Store;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{EngineEvent, HouseholdEngine};

/// Timing knobs for the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Period of the refresh cycle
    pub refresh_period: Duration,

    /// Quiet period before a scheduled save actually executes
    pub debounce_quiet: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            refresh_period: Duration::from_secs(2),
            debounce_quiet: Duration::from_millis(400),
        }
    }
}

/// Owns the periodic refresh cycle and the debounced snapshot saver
pub struct RefreshOrchestrator {
    engine: Arc<Mutex<HouseholdEngine>>,
    store: Arc<dyn Store>,
    usage: Arc<dyn UsageCounter>,
    config: OrchestratorConfig,
    shutdown_tx: watch::Sender<bool>,
    refresh_handle: Option<JoinHandle<()>>,
    saver_handle: Option<JoinHandle<()>>,
}

impl RefreshOrchestrator {
    pub fn new(
        engine: Arc<Mutex<HouseholdEngine>>,
        store: Arc<dyn Store>,
        usage: Arc<dyn UsageCounter>,
        config: OrchestratorConfig,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            engine,
            store,
            usage,
            config,
            shutdown_tx,
            refresh_handle: None,
            saver_handle: None,
        }
    }

    /// Whether the background tasks are running
    pub fn is_running(&self) -> bool {
        self.refresh_handle.is_some()
    }

    /// Start both background tasks. A no-op if already started.
    pub async fn start(&mut self) {
        if self.refresh_handle.is_some() {
            debug!("Orchestrator already running, start ignored");
            return;
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.engine.lock().await.set_change_notifier(event_tx);

        self.refresh_handle = Some(tokio::spawn(run_refresh_cycle(
            self.engine.clone(),
            self.usage.clone(),
            self.config.refresh_period,
            self.shutdown_tx.subscribe(),
        )));
        self.saver_handle = Some(tokio::spawn(run_debounced_saver(
            self.engine.clone(),
            self.store.clone(),
            self.config.debounce_quiet,
            event_rx,
            self.shutdown_tx.subscribe(),
        )));

        info!(
            refresh_period_ms = self.config.refresh_period.as_millis() as u64,
            debounce_ms = self.config.debounce_quiet.as_millis() as u64,
            "Orchestrator started"
        );
    }

    /// Stop both tasks, wait for them, and write one final snapshot.
    pub async fn shutdown(&mut self) {
        let _ = self.shutdown_tx.send(true);

        if let Some(handle) = self.refresh_handle.take() {
            let _ = handle.await;
        }
        if let Some(handle) = self.saver_handle.take() {
            let _ = handle.await;
        }

        self.persist_snapshot().await;
        info!("Orchestrator stopped");
    }

    /// Write the current snapshot immediately, bypassing the debounce.
    pub async fn persist_snapshot(&self) {
        let snapshot = self.engine.lock().await.snapshot();
        if let Err(e) = self.store.save_snapshot(&snapshot) {
            warn!(error = %e, "Snapshot save failed");
        }
    }
}

async fn run_refresh_cycle(
    engine: Arc<Mutex<HouseholdEngine>>,
    usage: Arc<dyn UsageCounter>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    let mut last_usage: Option<u64> = None;
    let mut last_day = latch_util::now().date_naive();

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = interval.tick() => {
                let now = latch_util::now();

                // Day rollover: yesterday's allocation no longer applies and
                // today's obligations don't exist yet.
                if now.date_naive() != last_day {
                    last_day = now.date_naive();
                    last_usage = None;
                    let scheduled = engine.lock().await.schedule_today(now);
                    info!(day = %last_day, scheduled, "Day rolled over");
                }

                match usage.usage_seconds_today() {
                    Ok(seconds) => {
                        let mut engine = engine.lock().await;
                        if last_usage != Some(seconds) {
                            last_usage = Some(seconds);
                            engine.apply_usage_seconds(seconds, now);
                        } else {
                            engine.refresh(now);
                        }
                    }
                    Err(e) => {
                        // Usage is unavailable, the verdict still has to track
                        // policy and chore edits.
                        warn!(error = %e, "Usage read failed");
                        engine.lock().await.refresh(now);
                    }
                }
            }
        }
    }
}

async fn run_debounced_saver(
    engine: Arc<Mutex<HouseholdEngine>>,
    store: Arc<dyn Store>,
    quiet: Duration,
    mut events: mpsc::UnboundedReceiver<EngineEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                if !event.mutates_state() {
                    if let EngineEvent::VerdictChanged { verdict } = &event {
                        debug!(locked = verdict.is_locked(), "Verdict published");
                    }
                    continue;
                }

                // A mutation arrived: wait out the quiet period, restarting
                // it for every further mutation, then write once.
                loop {
                    tokio::select! {
                        _ = shutdown.changed() => return,
                        _ = tokio::time::sleep(quiet) => break,
                        more = events.recv() => {
                            if more.is_none() {
                                break;
                            }
                        }
                    }
                }

                let snapshot = engine.lock().await.snapshot();
                match store.save_snapshot(&snapshot) {
                    Ok(()) => debug!("Debounced snapshot saved"),
                    Err(e) => warn!(error = %e, "Debounced snapshot save failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use latch_device::{MockRestriction, MockUsageCounter};
    use latch_domain::{HouseholdSnapshot, ManualOverride, Recurrence};
    use latch_store::{AuditEvent, SqliteStore, StoreResult};
    use std::sync::Mutex as StdMutex;

    /// Store double that records every snapshot write
    #[derive(Default)]
    struct RecordingStore {
        saves: StdMutex<Vec<HouseholdSnapshot>>,
    }

    impl RecordingStore {
        fn save_count(&self) -> usize {
            self.saves.lock().unwrap().len()
        }

        fn last_save(&self) -> Option<HouseholdSnapshot> {
            self.saves.lock().unwrap().last().cloned()
        }
    }

    impl Store for RecordingStore {
        fn load_snapshot(&self) -> StoreResult<Option<HouseholdSnapshot>> {
            Ok(None)
        }

        fn save_snapshot(&self, snapshot: &HouseholdSnapshot) -> StoreResult<()> {
            self.saves.lock().unwrap().push(snapshot.clone());
            Ok(())
        }

        fn append_audit(&self, _event: AuditEvent) -> StoreResult<()> {
            Ok(())
        }

        fn get_recent_audits(&self, _limit: usize) -> StoreResult<Vec<AuditEvent>> {
            Ok(vec![])
        }

        fn get_usage_seconds(&self, _day: NaiveDate) -> StoreResult<u64> {
            Ok(0)
        }

        fn set_usage_seconds(&self, _day: NaiveDate, _seconds: u64) -> StoreResult<()> {
            Ok(())
        }

        fn is_healthy(&self) -> bool {
            true
        }
    }

    fn make_orchestrator(
        store: Arc<dyn Store>,
        counter: Arc<MockUsageCounter>,
    ) -> (RefreshOrchestrator, Arc<Mutex<HouseholdEngine>>) {
        let restriction = Arc::new(MockRestriction::new());
        let engine = Arc::new(Mutex::new(HouseholdEngine::new(
            store.clone(),
            restriction,
            None,
        )));
        let orchestrator = RefreshOrchestrator::new(
            engine.clone(),
            store,
            counter,
            OrchestratorConfig::default(),
        );
        (orchestrator, engine)
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_cycle_applies_usage_to_goals() {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        let counter = Arc::new(MockUsageCounter::new());
        counter.set_seconds(1500);
        let (mut orchestrator, engine) = make_orchestrator(store, counter.clone());

        {
            let mut engine = engine.lock().await;
            let now = latch_util::now();
            engine.add_goal("Reading", 20, now);
            engine.add_goal("Math practice", 15, now);
        }

        orchestrator.start().await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        {
            let engine = engine.lock().await;
            assert_eq!(engine.learning_goals()[0].progress_seconds, 1200);
            assert_eq!(engine.learning_goals()[1].progress_seconds, 300);
        }

        orchestrator.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_cycle_survives_usage_read_failure() {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        let counter = Arc::new(MockUsageCounter::new());
        *counter.fail_read.lock().unwrap() = true;
        let (mut orchestrator, engine) = make_orchestrator(store, counter.clone());

        {
            let mut engine = engine.lock().await;
            engine.add_goal("Reading", 20, latch_util::now());
        }

        orchestrator.start().await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        // Reads failing the whole time: no progress, loop still alive.
        assert_eq!(engine.lock().await.learning_goals()[0].progress_seconds, 0);

        *counter.fail_read.lock().unwrap() = false;
        counter.set_seconds(600);
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(
            engine.lock().await.learning_goals()[0].progress_seconds,
            600
        );

        orchestrator.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_mutations_coalesce_into_one_save() {
        let recording = Arc::new(RecordingStore::default());
        let store: Arc<dyn Store> = recording.clone();
        let counter = Arc::new(MockUsageCounter::new());
        let (mut orchestrator, engine) = make_orchestrator(store, counter);

        orchestrator.start().await;

        {
            let mut engine = engine.lock().await;
            let now = latch_util::now();
            engine.add_chore("Make bed", "", 10, Recurrence::Daily, None, now);
            engine.add_chore("Homework", "", 25, Recurrence::Weekdays, None, now);
            engine.add_goal("Reading", 20, now);
            engine.set_override(ManualOverride::Locked, now);
        }

        // Well past the quiet period, before the next mutation.
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(recording.save_count(), 1);
        let saved = recording.last_save().unwrap();
        assert_eq!(saved.chores.len(), 2);
        assert_eq!(saved.learning_goals.len(), 1);
        assert_eq!(saved.parent_override, ManualOverride::Locked);

        // A later mutation gets its own write.
        engine
            .lock()
            .await
            .set_override(ManualOverride::None, latch_util::now());
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(recording.save_count(), 2);

        orchestrator.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_is_a_no_op() {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        let counter = Arc::new(MockUsageCounter::new());
        let (mut orchestrator, _engine) = make_orchestrator(store, counter);

        assert!(!orchestrator.is_running());
        orchestrator.start().await;
        assert!(orchestrator.is_running());
        orchestrator.start().await;
        assert!(orchestrator.is_running());

        orchestrator.shutdown().await;
        assert!(!orchestrator.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_writes_a_final_snapshot() {
        let recording = Arc::new(RecordingStore::default());
        let store: Arc<dyn Store> = recording.clone();
        let counter = Arc::new(MockUsageCounter::new());
        let (mut orchestrator, engine) = make_orchestrator(store, counter);

        orchestrator.start().await;

        // Mutate and shut down inside the quiet window: the debounced write
        // is lost, the shutdown write is not.
        engine
            .lock()
            .await
            .set_override(ManualOverride::Unlocked, latch_util::now());
        orchestrator.shutdown().await;

        assert!(recording.save_count() >= 1);
        assert_eq!(
            recording.last_save().unwrap().parent_override,
            ManualOverride::Unlocked
        );
    }
}

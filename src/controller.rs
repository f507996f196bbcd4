//! Owning service for both engines.
//!
//! All shared state lives behind two lock domains: the fleet (registry +
//! run clock) and the log feed. Periodic tasks and caller-triggered
//! operations serialize on the owning mutex, so mutations on one
//! satellite never race. Tasks are aborted on shutdown and on drop.

use crate::command::{
    link_fault_response, not_found_response, simulate_command, CommandResponse,
};
use crate::config::ConstellationConfig;
use crate::fleet::{FleetRegistry, SatelliteEvent, SequenceOutcome, TransitionOutcome};
use crate::global_state::{derive_global_state, GlobalState};
use crate::logs::{LogEntry, LogFilters, LogGenerator, LogStore};
use crate::rng::SimRng;
use crate::run::{RunClock, RunStatus};
use crate::satellite::Satellite;
use crate::state_machine::SatelliteState;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time;

fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

struct FleetState {
    registry: FleetRegistry,
    run_clock: RunClock,
    rng: SimRng,
}

impl FleetState {
    /// Re-derive the aggregate state and feed the run clock. Called after
    /// every fleet mutation.
    fn refresh_run(&mut self, now_ms: u64) {
        let derived = derive_global_state(self.registry.satellites());
        self.run_clock.observe(derived, now_ms);
    }
}

struct FeedState {
    store: LogStore,
    generator: LogGenerator,
    filters: LogFilters,
    paused: bool,
    auto_scroll: bool,
    rng: SimRng,
}

/// Public face of the constellation engines. The presentation layer
/// holds one of these and calls nothing else.
pub struct ConstellationController {
    config: ConstellationConfig,
    fleet: Arc<Mutex<FleetState>>,
    feed: Arc<Mutex<FeedState>>,
    tasks: Vec<JoinHandle<()>>,
}

impl ConstellationController {
    /// Build the stock fleet and spawn the periodic tasks.
    pub fn start(config: ConstellationConfig) -> Self {
        Self::start_seeded(config, None)
    }

    /// Like [`start`](Self::start), with a fixed seed for deterministic
    /// simulation sequences.
    pub fn start_seeded(config: ConstellationConfig, seed: Option<u64>) -> Self {
        let now_ms = epoch_ms();
        let mut fleet_rng = seed.map_or_else(SimRng::new, SimRng::with_seed);
        let feed_rng = seed.map_or_else(SimRng::new, |s| SimRng::with_seed(s ^ 0x5EED));

        let mut registry = FleetRegistry::new(now_ms, &mut fleet_rng);
        registry.set_heartbeat_timeout_ms(config.heartbeat_timeout_ms);

        let fleet = Arc::new(Mutex::new(FleetState {
            registry,
            run_clock: RunClock::new(),
            rng: fleet_rng,
        }));
        let feed = Arc::new(Mutex::new(FeedState {
            store: LogStore::new(now_ms),
            generator: LogGenerator::new(),
            filters: LogFilters::new(),
            paused: false,
            auto_scroll: true,
            rng: feed_rng,
        }));

        let mut controller = Self {
            config,
            fleet,
            feed,
            tasks: Vec::new(),
        };
        controller.spawn_tasks();
        controller
    }

    fn spawn_tasks(&mut self) {
        let config = &self.config;

        // Heartbeat sweep.
        self.tasks.push(Self::spawn_fleet_task(
            &self.fleet,
            config.sweep_period_ms,
            |state, now_ms| {
                state.registry.sweep(now_ms);
                state.refresh_run(now_ms);
            },
        ));

        // Inbound-heartbeat refresh simulator.
        self.tasks.push(Self::spawn_fleet_task(
            &self.fleet,
            config.refresh_period_ms,
            |state, now_ms| {
                state.registry.refresh_random_heartbeat(now_ms, &mut state.rng);
            },
        ));

        // Run-duration tick.
        self.tasks.push(Self::spawn_fleet_task(
            &self.fleet,
            config.run_tick_period_ms,
            |state, now_ms| {
                state.refresh_run(now_ms);
                state.run_clock.tick();
            },
        ));

        // Log synthesis.
        let feed = Arc::clone(&self.feed);
        let synthesis_period = config.log_synthesis_period_ms;
        self.tasks.push(tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_millis(synthesis_period));
            loop {
                interval.tick().await;
                let mut guard = feed.lock().await;
                let state = &mut *guard;
                if state.paused {
                    continue;
                }
                let entry = state.generator.generate(epoch_ms(), &mut state.rng);
                state.store.append(entry);
            }
        }));

        // Rate-metric recompute.
        let feed = Arc::clone(&self.feed);
        let rate_period = config.rate_recompute_period_ms;
        self.tasks.push(tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_millis(rate_period));
            loop {
                interval.tick().await;
                feed.lock().await.store.recompute_rate(epoch_ms());
            }
        }));
    }

    fn spawn_fleet_task(
        fleet: &Arc<Mutex<FleetState>>,
        period_ms: u64,
        body: impl Fn(&mut FleetState, u64) + Send + 'static,
    ) -> JoinHandle<()> {
        let fleet = Arc::clone(fleet);
        tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_millis(period_ms));
            loop {
                interval.tick().await;
                let mut state = fleet.lock().await;
                body(&mut state, epoch_ms());
            }
        })
    }

    // ---- fleet queries ----

    pub async fn satellites(&self) -> Vec<Satellite> {
        self.fleet.lock().await.registry.satellites().to_vec()
    }

    pub async fn satellite(&self, id: &str) -> Option<Satellite> {
        self.fleet.lock().await.registry.snapshot(id)
    }

    pub async fn recent_events(&self, id: &str) -> Vec<SatelliteEvent> {
        self.fleet.lock().await.registry.recent_events(id)
    }

    pub async fn global_state(&self) -> GlobalState {
        let state = self.fleet.lock().await;
        derive_global_state(state.registry.satellites())
    }

    pub async fn run_status(&self) -> RunStatus {
        self.fleet.lock().await.run_clock.status()
    }

    // ---- fleet commands ----

    pub async fn transition(&self, id: &str, new_state: SatelliteState) -> TransitionOutcome {
        let mut state = self.fleet.lock().await;
        let now_ms = epoch_ms();
        let outcome = state.registry.transition(id, new_state, now_ms);
        if outcome == TransitionOutcome::Applied {
            state.refresh_run(now_ms);
        }
        outcome
    }

    pub async fn update_sequence(&self, id: &str, sequence: u32) -> SequenceOutcome {
        self.fleet
            .lock()
            .await
            .registry
            .update_sequence(id, sequence, epoch_ms())
    }

    /// Round-trip a command to a satellite.
    ///
    /// The entity is snapshotted at call time; the simulated link latency
    /// elapses without holding either lock, and the result is applied on
    /// completion (last write wins).
    pub async fn send_command(&self, id: &str, command: &str) -> CommandResponse {
        let snapshot = self.fleet.lock().await.registry.snapshot(id);
        let Some(snapshot) = snapshot else {
            tracing::warn!(id, command, "command for unknown satellite");
            return not_found_response();
        };

        time::sleep(Duration::from_millis(self.config.command_latency_ms)).await;

        let mut state = self.fleet.lock().await;
        let faulted = self.config.command_fault_percent > 0.0
            && state.rng.chance(self.config.command_fault_percent);
        let response = if faulted {
            link_fault_response(command)
        } else {
            simulate_command(&snapshot, command)
        };
        state
            .registry
            .apply_command_result(id, command, response.status, epoch_ms());
        tracing::info!(id, command, status = %response.status, "command completed");
        response
    }

    // ---- log feed ----

    pub async fn log_entries(&self) -> Vec<LogEntry> {
        self.feed.lock().await.store.snapshot()
    }

    pub async fn filtered_entries(&self) -> Vec<LogEntry> {
        let state = self.feed.lock().await;
        state.store.filtered(&state.filters)
    }

    pub async fn filters(&self) -> LogFilters {
        self.feed.lock().await.filters.clone()
    }

    pub async fn set_filters(&self, filters: LogFilters) {
        self.feed.lock().await.filters = filters;
    }

    pub async fn reset_filters(&self) {
        self.feed.lock().await.filters = LogFilters::new();
    }

    pub async fn clear_logs(&self) {
        self.feed.lock().await.store.clear(epoch_ms());
    }

    pub async fn messages_per_minute(&self) -> u64 {
        self.feed.lock().await.store.messages_per_minute()
    }

    pub async fn set_paused(&self, paused: bool) {
        self.feed.lock().await.paused = paused;
    }

    pub async fn is_paused(&self) -> bool {
        self.feed.lock().await.paused
    }

    pub async fn set_auto_scroll(&self, auto_scroll: bool) {
        self.feed.lock().await.auto_scroll = auto_scroll;
    }

    pub async fn auto_scroll(&self) -> bool {
        self.feed.lock().await.auto_scroll
    }

    /// Abort every periodic task. Idempotent; also runs on drop so no
    /// timer outlives the controller.
    pub fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        tracing::info!("constellation controller stopped");
    }
}

impl Drop for ConstellationController {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

//! # Constellation Ground-Segment Simulator
//!
//! Supervision engines for a small fleet of networked satellites plus an
//! observatory log feed, with no real transport behind either: commands
//! are answered by a deterministic local simulator and log entries are
//! synthesized in-process.
//!
//! ## Features
//!
//! - **Lifecycle supervision**: per-satellite finite-state machine with
//!   operator transitions and a full-reboot recovery path
//! - **Liveness monitoring**: periodic heartbeat sweep that fails
//!   satellites out of service after three missed heartbeats
//! - **Command interface**: async round-trip simulation with the fixed
//!   ground-station command vocabulary
//! - **Observatory feed**: bounded log buffer with multi-dimensional,
//!   overridable filtering and a messages-per-minute rate metric
//! - **Deterministic simulation**: injected clock values and a seedable
//!   value source keep every test replayable
//!
//! ## Quick Start
//!
//! ```no_run
//! use constellation::{ConstellationController, ConstellationConfig};
//! use constellation::state_machine::SatelliteState;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut controller = ConstellationController::start(ConstellationConfig::default());
//!
//! controller.transition("sat-1", SatelliteState::Initialized).await;
//! let response = controller.send_command("sat-1", "get_version").await;
//! println!("{}", response.payload);
//!
//! controller.shutdown();
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`state_machine`] - lifecycle states and the legal transition table
//! - [`satellite`] - the supervised entity model and the stock fleet
//! - [`fleet`] - registry applying transitions, sweeps, and write-backs
//! - [`command`] - deterministic command-response simulation
//! - [`global_state`] - fleet-wide aggregate state derivation
//! - [`run`] - run identity and duration tracking
//! - [`logs`] - log entry model, bounded store, filters, and synthesis
//! - [`controller`] - owning service, periodic tasks, and the public API

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]

pub mod command;
pub mod config;
pub mod controller;
pub mod fleet;
pub mod global_state;
pub mod logs;
pub mod rng;
pub mod run;
pub mod satellite;
pub mod state_machine;

// Re-export main public types for convenience
pub use command::{CommandResponse, CommandStatus};
pub use config::ConstellationConfig;
pub use controller::ConstellationController;
pub use fleet::{FleetRegistry, SatelliteEvent, SequenceOutcome, TransitionOutcome};
pub use global_state::{derive_global_state, GlobalState};
pub use logs::{LogEntry, LogFilters, LogLevel};
pub use satellite::Satellite;
pub use state_machine::{LifecycleAction, SatelliteState};

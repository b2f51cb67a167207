//! Blackout Scenario Harness
//!
//! Drives the `blackout_core` world through deterministic, self-checking
//! scenarios and through worlds described in JSON.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                ScenarioRunner                │
//! │  ┌──────────────┐      ┌─────────────────┐   │
//! │  │  ScenarioId  │      │ WorldDefinition │   │
//! │  │  (built-in)  │      │     (JSON)      │   │
//! │  └──────┬───────┘      └────────┬────────┘   │
//! │         └──────────┬────────────┘            │
//! │               ┌────▼─────┐                   │
//! │               │ Blackout │ simulate() × N    │
//! │               └────┬─────┘                   │
//! │         metrics ◄──┴──► SimExport frames     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use blackout_sim::{ScenarioRunner, ScenarioId};
//!
//! let result = ScenarioRunner::new().run(ScenarioId::RelayChain);
//! assert!(result.passed);
//! ```

pub mod config;
pub mod exporter;
pub mod runner;
pub mod scenarios;

pub use config::{ConfigError, SimConfig, WorldDefinition};
pub use exporter::{FrameEvent, SimExport, SimFrame};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use scenarios::ScenarioId;

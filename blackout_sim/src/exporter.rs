//! JSON exporter for offline inspection of a run.
//!
//! Exports per-tick snapshots of every entity plus the transfer events of
//! that tick.

use blackout_core::{Blackout, EntityInfo, TransferEvent};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// A single frame of simulation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    /// Tick number after which this frame was taken
    pub tick: u64,

    /// Snapshot of every entity
    pub entities: Vec<EntityInfo>,

    /// Transfer outcomes of this tick
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub events: Vec<FrameEvent>,
}

impl SimFrame {
    /// Captures the current state of `world`.
    pub fn capture(world: &Blackout) -> Self {
        Self {
            tick: world.tick_count(),
            entities: world.entities().map(EntityInfo::from).collect(),
            events: world.last_events().iter().map(FrameEvent::from).collect(),
        }
    }
}

/// One transfer event in exportable form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameEvent {
    pub from: String,
    pub to: String,
    pub filename: String,
    pub outcome: String,
}

impl From<&TransferEvent> for FrameEvent {
    fn from(event: &TransferEvent) -> Self {
        Self {
            from: event.link.from.clone(),
            to: event.link.to.clone(),
            filename: event.filename.clone(),
            outcome: format!("{:?}", event.outcome),
        }
    }
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Ticks executed
    pub total_ticks: u64,

    /// All frames
    pub frames: Vec<SimFrame>,

    /// Final results
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str) -> Self {
        Self {
            scenario: scenario.to_string(),
            total_ticks: 0,
            frames: Vec::new(),
            passed: false,
            failure_reason: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.total_ticks = frame.tick;
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool, failure_reason: Option<String>) {
        self.passed = passed;
        self.failure_reason = failure_reason;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

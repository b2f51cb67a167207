//! Run configuration and JSON world definitions.

use blackout_core::{Blackout, EntityError, EntityKind, Slope, TransferError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or building a world.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid world definition: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),

    #[error("Transfer of {file} rejected at tick {tick}: {source}")]
    Transfer {
        tick: u64,
        file: String,
        #[source]
        source: TransferError,
    },
}

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Ticks to run when the world definition does not say
    pub ticks: u64,

    /// Export a frame every this many ticks
    pub export_interval: u64,

    /// Fail a world run on the first rejected scheduled send
    pub strict_sends: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ticks: 100,
            export_interval: 1,
            strict_sends: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceDef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub position: f64,
    #[serde(default)]
    pub moving: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatelliteDef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub height: f64,
    pub position: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDef {
    pub device: String,
    pub name: String,
    pub content: String,
}

/// A `send_file` request issued before the given tick runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendDef {
    #[serde(default)]
    pub at_tick: u64,
    pub file: String,
    pub from: String,
    pub to: String,
}

/// A complete world: entities, terrain, files, and scheduled sends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldDefinition {
    #[serde(default)]
    pub devices: Vec<DeviceDef>,

    #[serde(default)]
    pub satellites: Vec<SatelliteDef>,

    #[serde(default)]
    pub slopes: Vec<Slope>,

    #[serde(default)]
    pub files: Vec<FileDef>,

    #[serde(default)]
    pub sends: Vec<SendDef>,

    /// Overrides `SimConfig::ticks`
    #[serde(default)]
    pub ticks: Option<u64>,
}

impl WorldDefinition {
    /// Reads a definition from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Builds the initial world. Scheduled sends are not applied.
    pub fn build(&self) -> Result<Blackout, ConfigError> {
        let mut world = Blackout::new();

        for device in &self.devices {
            if device.moving {
                world.create_moving_device(&device.id, device.kind, device.position)?;
            } else {
                world.create_device(&device.id, device.kind, device.position)?;
            }
        }
        for satellite in &self.satellites {
            world.create_satellite(&satellite.id, satellite.kind, satellite.height, satellite.position)?;
        }
        for slope in &self.slopes {
            world.create_slope(slope.start, slope.end, slope.gradient);
        }
        for file in &self.files {
            world.add_file_to_device(&file.device, &file.name, &file.content);
        }

        Ok(world)
    }

    /// Sends scheduled for just before `tick` runs.
    pub fn sends_at(&self, tick: u64) -> impl Iterator<Item = &SendDef> {
        self.sends.iter().filter(move |send| send.at_tick == tick)
    }
}

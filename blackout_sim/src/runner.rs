//! Scenario runner - executes built-in scenarios and JSON-defined worlds.

use crate::config::{ConfigError, SimConfig, WorldDefinition};
use crate::exporter::{SimExport, SimFrame};
use crate::scenarios::ScenarioId;
use blackout_core::{Blackout, EntityKind, Outcome, TransferError, TransferEvent, RADIUS_OF_JUPITER};
use tracing::{debug, info, warn};

/// Orbit used by the built-in scenarios: 10 000 km above the surface.
const ORBIT: f64 = RADIUS_OF_JUPITER + 10_000.0;

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario or world name
    pub scenario: String,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Total ticks executed
    pub total_ticks: u64,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioMetrics {
    pub sends_admitted: u64,
    pub sends_rejected: u64,

    /// File-ticks in which a transfer advanced
    pub progress_steps: u64,

    pub transfers_completed: u64,

    /// Transfers resolved by a lost link (teleport or not)
    pub transfers_aborted: u64,

    /// Aborts that damaged file content
    pub teleport_corruptions: u64,
}

impl ScenarioMetrics {
    fn record(&mut self, events: &[TransferEvent]) {
        for event in events {
            match event.outcome {
                Outcome::Pending => {}
                Outcome::Progressed { .. } => self.progress_steps += 1,
                Outcome::Completed => self.transfers_completed += 1,
                outcome if outcome.is_abort() => {
                    self.transfers_aborted += 1;
                    if matches!(outcome, Outcome::SourceCorrupted | Outcome::PartialDelivered) {
                        self.teleport_corruptions += 1;
                    }
                }
                _ => {}
            }
        }
    }
}

/// A world being driven tick by tick, with metrics and optional export.
struct Session<'a> {
    world: Blackout,
    metrics: ScenarioMetrics,
    export: Option<&'a mut SimExport>,
    export_interval: u64,
}

impl<'a> Session<'a> {
    fn new(world: Blackout, export: Option<&'a mut SimExport>, export_interval: u64) -> Self {
        Self {
            world,
            metrics: ScenarioMetrics::default(),
            export,
            export_interval: export_interval.max(1),
        }
    }

    fn send(&mut self, file: &str, from: &str, to: &str) -> Result<(), TransferError> {
        let result = self.world.send_file(file, from, to);
        match &result {
            Ok(()) => self.metrics.sends_admitted += 1,
            Err(e) => {
                debug!("  send {} {} -> {} rejected: {}", file, from, to, e);
                self.metrics.sends_rejected += 1;
            }
        }
        result
    }

    fn tick(&mut self) {
        self.world.simulate();
        self.metrics.record(self.world.last_events());

        if let Some(export) = self.export.as_deref_mut() {
            if self.world.tick_count() % self.export_interval == 0 {
                export.add_frame(SimFrame::capture(&self.world));
            }
        }
    }

    fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    fn info(&self, id: &str) -> Result<blackout_core::EntityInfo, String> {
        self.world
            .get_info(id)
            .ok_or_else(|| format!("{} vanished", id))
    }

    fn finish(self, scenario: &str, outcome: Result<(), String>) -> ScenarioResult {
        let passed = outcome.is_ok();
        let failure_reason = outcome.err();
        let total_ticks = self.world.tick_count();

        if let Some(export) = self.export {
            export.finalize(passed, failure_reason.clone());
        }

        ScenarioResult {
            scenario: scenario.to_string(),
            passed,
            total_ticks,
            failure_reason,
            metrics: self.metrics,
        }
    }
}

fn ensure(condition: bool, reason: impl FnOnce() -> String) -> Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(reason())
    }
}

fn setup(result: Result<(), blackout_core::EntityError>) -> Result<(), String> {
    result.map_err(|e| format!("setup failed: {}", e))
}

/// Runs scenarios.
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    config: SimConfig,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the run configuration.
    pub fn with_config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        self.run_scenario(scenario, None)
    }

    /// Runs a scenario, recording frames into `export`.
    pub fn run_with_export(&self, scenario: ScenarioId, export: &mut SimExport) -> ScenarioResult {
        self.run_scenario(scenario, Some(export))
    }

    fn run_scenario(&self, scenario: ScenarioId, export: Option<&mut SimExport>) -> ScenarioResult {
        info!("Starting scenario: {} - {}", scenario.name(), scenario.description());

        let mut session = Session::new(Blackout::new(), export, self.config.export_interval);
        let outcome = match scenario {
            ScenarioId::SharedLink => run_shared_link(&mut session),
            ScenarioId::StandardStorage => run_standard_storage(&mut session),
            ScenarioId::TeleportLoss => run_teleport_loss(&mut session),
            ScenarioId::RelayChain => run_relay_chain(&mut session),
            ScenarioId::SlopeWalk => run_slope_walk(&mut session),
            ScenarioId::LinkBreak => run_link_break(&mut session),
        };

        let result = session.finish(scenario.name(), outcome);
        info!(
            "{} finished after {} ticks: {} completed, {} aborted",
            result.scenario, result.total_ticks, result.metrics.transfers_completed, result.metrics.transfers_aborted
        );
        result
    }

    /// Runs a world read from a definition, applying its scheduled sends.
    ///
    /// Rejected sends are logged and counted, unless `strict_sends` is set.
    pub fn run_world(
        &self,
        name: &str,
        definition: &WorldDefinition,
        export: Option<&mut SimExport>,
    ) -> Result<ScenarioResult, ConfigError> {
        let world = definition.build()?;
        let ticks = definition.ticks.unwrap_or(self.config.ticks);
        info!("Running world {} for {} ticks", name, ticks);

        let mut session = Session::new(world, export, self.config.export_interval);
        for tick in 0..ticks {
            for send in definition.sends_at(tick) {
                if let Err(e) = session.send(&send.file, &send.from, &send.to) {
                    if self.config.strict_sends {
                        return Err(ConfigError::Transfer {
                            tick,
                            file: send.file.clone(),
                            source: e,
                        });
                    }
                    warn!("Tick {}: send of {} from {} to {} rejected: {}", tick, send.file, send.from, send.to, e);
                }
            }
            session.tick();
        }

        Ok(session.finish(name, Ok(())))
    }
}

fn run_shared_link(session: &mut Session<'_>) -> Result<(), String> {
    setup(session.world.create_device("d1", EntityKind::HandheldDevice, 40.0))?;
    setup(session.world.create_satellite("t1", EntityKind::TeleportingSatellite, ORBIT, 40.0))?;

    let names = ["a", "b", "c"];
    for name in names {
        session.world.add_file_to_device("d1", name, "0123456789");
        session.send(name, "d1", "t1").map_err(|e| e.to_string())?;
    }

    session.tick();
    let info = session.info("t1")?;
    for name in names {
        let delivered = info.files.get(name).map(|f| f.data.len());
        ensure(delivered == Some(5), || format!("{} advanced to {:?}, expected 5", name, delivered))?;
    }

    session.tick();
    let info = session.info("t1")?;
    ensure(info.files.values().all(|f| f.is_complete), || "files incomplete after 2 ticks".into())?;
    ensure(session.metrics.transfers_completed == 3, || {
        format!("{} transfers completed", session.metrics.transfers_completed)
    })
}

fn run_standard_storage(session: &mut Session<'_>) -> Result<(), String> {
    setup(session.world.create_device("d1", EntityKind::HandheldDevice, 10.0))?;
    setup(session.world.create_satellite("s1", EntityKind::StandardSatellite, ORBIT, 20.0))?;
    for name in ["a", "b", "c", "d"] {
        session.world.add_file_to_device("d1", name, "xy");
    }

    session.send("a", "d1", "s1").map_err(|e| e.to_string())?;
    let second = session.send("b", "d1", "s1");
    ensure(matches!(second, Err(TransferError::NoBandwidth(_))), || {
        format!("concurrent send returned {:?}", second)
    })?;

    session.run(2);
    for name in ["b", "c"] {
        session.send(name, "d1", "s1").map_err(|e| e.to_string())?;
        session.run(2);
    }

    let stored = session.info("s1")?.files.len();
    ensure(stored == 3, || format!("satellite stores {} files, expected 3", stored))?;

    let fourth = session.send("d", "d1", "s1");
    ensure(matches!(fourth, Err(TransferError::NoStorageSpace(_))), || {
        format!("fourth send returned {:?}", fourth)
    })
}

fn run_teleport_loss(session: &mut Session<'_>) -> Result<(), String> {
    let content = "Transmitting the telemetry to the teleporter";
    setup(session.world.create_device("d1", EntityKind::HandheldDevice, 180.0))?;
    setup(session.world.create_satellite("t1", EntityKind::TeleportingSatellite, ORBIT, 179.0))?;
    session.world.add_file_to_device("d1", "log", content);
    session.send("log", "d1", "t1").map_err(|e| e.to_string())?;

    session.run(2);

    let source = session.info("d1")?;
    let expected = blackout_core::file::strip_teleport_noise(content);
    let file = source.files.get("log").ok_or("source file vanished")?;
    ensure(file.data == expected, || format!("source holds {:?}", file.data))?;
    ensure(file.size == expected.len() && file.is_complete, || "source size not reset".into())?;
    ensure(session.info("t1")?.files.is_empty(), || "shell survived the teleport".into())?;
    ensure(session.metrics.teleport_corruptions == 1, || {
        format!("{} corruptions recorded", session.metrics.teleport_corruptions)
    })
}

fn run_relay_chain(session: &mut Session<'_>) -> Result<(), String> {
    setup(session.world.create_device("d1", EntityKind::HandheldDevice, 140.0))?;
    setup(session.world.create_satellite("r1", EntityKind::RelaySatellite, ORBIT, 160.0))?;
    setup(session.world.create_satellite("s2", EntityKind::StandardSatellite, ORBIT, 190.0))?;
    session.world.add_file_to_device("d1", "ping", "x");

    let reachable = session.world.communicable_entities_in_range("d1");
    ensure(reachable.iter().any(|id| id == "s2"), || format!("d1 reaches only {:?}", reachable))?;

    session.send("ping", "d1", "s2").map_err(|e| e.to_string())?;
    session.tick();

    let delivered = session.info("s2")?.files.get("ping").map(|f| f.is_complete);
    ensure(delivered == Some(true), || format!("relayed file state {:?}", delivered))?;
    ensure(session.info("r1")?.files.is_empty(), || "relay stored a file".into())
}

fn run_slope_walk(session: &mut Session<'_>) -> Result<(), String> {
    setup(session.world.create_moving_device("walker", EntityKind::LaptopDevice, 55.0))?;
    session.world.create_slope(40.0, 60.0, 20.0);
    session.world.create_slope(20.0, 40.0, -20.0);

    let mut highest = RADIUS_OF_JUPITER;
    for _ in 0..1_600 {
        session.tick();
        let info = session.info("walker")?;
        ensure((0.0..360.0).contains(&info.position), || {
            format!("position {} escaped [0, 360)", info.position)
        })?;
        highest = highest.max(info.height);
    }

    let info = session.info("walker")?;
    ensure(info.position < 20.0, || format!("walker stopped at {:.2}", info.position))?;
    ensure(highest >= RADIUS_OF_JUPITER + 300.0, || {
        format!("walker peaked at {:.1} km above the surface", highest - RADIUS_OF_JUPITER)
    })
}

fn run_link_break(session: &mut Session<'_>) -> Result<(), String> {
    setup(session.world.create_device("d1", EntityKind::HandheldDevice, 0.0))?;
    setup(session.world.create_satellite("s1", EntityKind::StandardSatellite, ORBIT, 0.0))?;
    session.world.add_file_to_device("d1", "slow", &"s".repeat(40));
    session.send("slow", "d1", "s1").map_err(|e| e.to_string())?;

    session.run(30);

    ensure(session.world.transfers().is_empty(), || "transfer still registered".into())?;
    ensure(session.info("d1")?.files.is_empty(), || "source copy survived".into())?;
    ensure(session.info("s1")?.files.is_empty(), || "partial shell survived".into())?;
    ensure(session.metrics.transfers_aborted == 1, || {
        format!("{} aborts recorded", session.metrics.transfers_aborted)
    })
}

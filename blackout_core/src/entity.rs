//! Devices and satellites: the nodes of the relay network.
//!
//! The six concrete kinds form a closed enum. Everything that differs between
//! them (range, speed, bandwidth, storage, which peers they accept) lives in a
//! static capability table looked up through [`EntityKind::capabilities`].

use crate::error::EntityError;
use crate::file::File;
use crate::geometry::{normalize_degrees, RADIUS_OF_JUPITER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// All entities in a world, keyed by id.
pub type EntityMap = BTreeMap<String, Entity>;

/// Concrete entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    HandheldDevice,
    LaptopDevice,
    DesktopDevice,
    StandardSatellite,
    TeleportingSatellite,
    RelaySatellite,
}

/// Ground node or orbiting node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Device,
    Satellite,
}

/// Static per-kind constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capabilities {
    /// Maximum link distance in km
    pub max_range: f64,

    /// Linear speed in km per tick
    pub linear_speed: f64,

    /// Bytes per tick this kind can send (`None` = unlimited)
    pub send_bandwidth: Option<usize>,

    /// Bytes per tick this kind can receive (`None` = unlimited)
    pub receive_bandwidth: Option<usize>,

    /// Ceiling on stored files
    pub max_files: Option<usize>,

    /// Ceiling on aggregate stored bytes
    pub max_bytes: Option<usize>,

    /// Peer kinds this kind is willing to talk to
    pub admits: &'static [EntityKind],
}

use EntityKind::*;

const EVERYTHING: &[EntityKind] = &[
    HandheldDevice,
    LaptopDevice,
    DesktopDevice,
    StandardSatellite,
    TeleportingSatellite,
    RelaySatellite,
];

const NO_DESKTOPS: &[EntityKind] = &[
    HandheldDevice,
    LaptopDevice,
    StandardSatellite,
    TeleportingSatellite,
    RelaySatellite,
];

const NO_STANDARD_SATELLITES: &[EntityKind] = &[
    HandheldDevice,
    LaptopDevice,
    DesktopDevice,
    TeleportingSatellite,
    RelaySatellite,
];

const fn device(max_range: f64, linear_speed: f64, admits: &'static [EntityKind]) -> Capabilities {
    Capabilities {
        max_range,
        linear_speed,
        send_bandwidth: None,
        receive_bandwidth: None,
        max_files: None,
        max_bytes: None,
        admits,
    }
}

static HANDHELD: Capabilities = device(50_000.0, 50.0, EVERYTHING);
static LAPTOP: Capabilities = device(100_000.0, 30.0, EVERYTHING);
static DESKTOP: Capabilities = device(200_000.0, 20.0, NO_STANDARD_SATELLITES);

static STANDARD: Capabilities = Capabilities {
    max_range: 150_000.0,
    linear_speed: 2_500.0,
    send_bandwidth: Some(1),
    receive_bandwidth: Some(1),
    max_files: Some(3),
    max_bytes: Some(80),
    admits: NO_DESKTOPS,
};

static TELEPORTING: Capabilities = Capabilities {
    max_range: 200_000.0,
    linear_speed: 1_000.0,
    send_bandwidth: Some(10),
    receive_bandwidth: Some(15),
    max_files: None,
    max_bytes: Some(200),
    admits: EVERYTHING,
};

static RELAY: Capabilities = Capabilities {
    max_range: 300_000.0,
    linear_speed: 1_500.0,
    send_bandwidth: Some(0),
    receive_bandwidth: Some(0),
    max_files: None,
    max_bytes: None,
    admits: EVERYTHING,
};

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        HandheldDevice,
        LaptopDevice,
        DesktopDevice,
        StandardSatellite,
        TeleportingSatellite,
        RelaySatellite,
    ];

    pub fn capabilities(self) -> &'static Capabilities {
        match self {
            HandheldDevice => &HANDHELD,
            LaptopDevice => &LAPTOP,
            DesktopDevice => &DESKTOP,
            StandardSatellite => &STANDARD,
            TeleportingSatellite => &TELEPORTING,
            RelaySatellite => &RELAY,
        }
    }

    pub fn category(self) -> Category {
        match self {
            HandheldDevice | LaptopDevice | DesktopDevice => Category::Device,
            StandardSatellite | TeleportingSatellite | RelaySatellite => Category::Satellite,
        }
    }

    pub fn is_device(self) -> bool {
        self.category() == Category::Device
    }

    pub fn is_satellite(self) -> bool {
        self.category() == Category::Satellite
    }

    /// Type name as used by the outer layers.
    pub fn name(self) -> &'static str {
        match self {
            HandheldDevice => "HandheldDevice",
            LaptopDevice => "LaptopDevice",
            DesktopDevice => "DesktopDevice",
            StandardSatellite => "StandardSatellite",
            TeleportingSatellite => "TeleportingSatellite",
            RelaySatellite => "RelaySatellite",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EntityKind {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| EntityError::UnknownKind(s.to_string()))
    }
}

/// Direction of travel. Clockwise decreases the angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    Anticlockwise,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Clockwise => Orientation::Anticlockwise,
            Orientation::Anticlockwise => Orientation::Clockwise,
        }
    }

    /// Moves `position` by `step` degrees in this direction (not normalized).
    pub fn apply(self, position: f64, step: f64) -> f64 {
        match self {
            Orientation::Clockwise => position - step,
            Orientation::Anticlockwise => position + step,
        }
    }
}

/// Per-variant motion substate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Devices; only moving ones ever change position
    Ground { moving: bool },

    /// Standard satellites: steady clockwise orbit
    Orbit,

    /// Relay satellites: sweep toward, then oscillate inside, a fixed arc
    Relay { orientation: Orientation, settled: bool },

    /// Teleporting satellites: half-orbit sweep with periodic relocation
    Teleport { orientation: Orientation, just_teleported: bool },
}

/// A device or satellite together with its file table.
#[derive(Debug, Clone)]
pub struct Entity {
    id: String,
    kind: EntityKind,
    position: f64,
    height: f64,
    motion: Motion,
    files: BTreeMap<String, File>,
}

impl Entity {
    /// Creates a device on the surface.
    pub fn device(
        id: impl Into<String>,
        kind: EntityKind,
        position: f64,
        moving: bool,
    ) -> Result<Self, EntityError> {
        if !kind.is_device() {
            return Err(EntityError::WrongCategory {
                kind: kind.to_string(),
                expected: "device",
            });
        }
        Ok(Self::new(id.into(), kind, RADIUS_OF_JUPITER, position, Motion::Ground { moving }))
    }

    /// Creates a satellite `height` km from the body centre.
    pub fn satellite(
        id: impl Into<String>,
        kind: EntityKind,
        height: f64,
        position: f64,
    ) -> Result<Self, EntityError> {
        if !kind.is_satellite() {
            return Err(EntityError::WrongCategory {
                kind: kind.to_string(),
                expected: "satellite",
            });
        }
        let position = normalize_degrees(position);
        let motion = crate::motion::initial_motion(kind, position);
        Ok(Self::new(id.into(), kind, height, position, motion))
    }

    fn new(id: String, kind: EntityKind, height: f64, position: f64, motion: Motion) -> Self {
        Self {
            id,
            kind,
            position: normalize_degrees(position),
            height,
            motion,
            files: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn capabilities(&self) -> &'static Capabilities {
        self.kind.capabilities()
    }

    /// Angular position in degrees, always in `[0, 360)`.
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn is_moving(&self) -> bool {
        !matches!(self.motion, Motion::Ground { moving: false })
    }

    /// True only during the tick in which a teleporting satellite relocated.
    pub fn just_teleported(&self) -> bool {
        matches!(self.motion, Motion::Teleport { just_teleported: true, .. })
    }

    /// Whether this entity accepts links with `kind`.
    pub fn admits(&self, kind: EntityKind) -> bool {
        self.capabilities().admits.contains(&kind)
    }

    pub fn files(&self) -> &BTreeMap<String, File> {
        &self.files
    }

    pub fn file(&self, name: &str) -> Option<&File> {
        self.files.get(name)
    }

    /// Stores a fully resident file, replacing any file with the same name.
    pub fn add_resident_file(&mut self, name: &str, content: &str) {
        let file = File::resident(name, content, &self.id);
        self.files.insert(name.to_string(), file);
    }

    pub(crate) fn file_mut(&mut self, name: &str) -> Option<&mut File> {
        self.files.get_mut(name)
    }

    pub(crate) fn insert_file(&mut self, file: File) {
        self.files.insert(file.name().to_string(), file);
    }

    pub(crate) fn remove_file(&mut self, name: &str) -> Option<File> {
        self.files.remove(name)
    }

    pub(crate) fn set_position(&mut self, degrees: f64) {
        self.position = normalize_degrees(degrees);
    }

    pub(crate) fn set_height(&mut self, height: f64) {
        self.height = height;
    }

    pub(crate) fn set_motion(&mut self, motion: Motion) {
        self.motion = motion;
    }

    /// Incomplete files held here: incoming shells and outgoing sources.
    pub(crate) fn files_in_flight(&self) -> usize {
        self.files.values().filter(|f| !f.is_complete()).count()
    }

    pub(crate) fn stored_bytes(&self) -> usize {
        self.files.values().map(File::size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_name() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.name().parse::<EntityKind>().unwrap(), kind);
        }
        assert!(matches!(
            "WarpSatellite".parse::<EntityKind>(),
            Err(EntityError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_desktop_and_standard_refuse_each_other() {
        assert!(!DesktopDevice.capabilities().admits.contains(&StandardSatellite));
        assert!(!StandardSatellite.capabilities().admits.contains(&DesktopDevice));
        assert!(TeleportingSatellite.capabilities().admits.contains(&DesktopDevice));
    }

    #[test]
    fn test_device_sits_on_surface() {
        let device = Entity::device("d1", LaptopDevice, 370.0, false).unwrap();
        assert_eq!(device.height(), RADIUS_OF_JUPITER);
        assert!((device.position() - 10.0).abs() < 1e-9);
        assert!(!device.is_moving());
    }

    #[test]
    fn test_wrong_category_is_rejected() {
        assert!(Entity::device("d1", RelaySatellite, 0.0, false).is_err());
        assert!(Entity::satellite("s1", HandheldDevice, 80_000.0, 0.0).is_err());
    }

    #[test]
    fn test_resident_file_replaces_same_name() {
        let mut device = Entity::device("d1", HandheldDevice, 0.0, false).unwrap();
        device.add_resident_file("a", "one");
        device.add_resident_file("a", "three");
        assert_eq!(device.files().len(), 1);
        assert_eq!(device.file("a").unwrap().content(), "three");
        assert_eq!(device.stored_bytes(), 5);
    }
}

//! Per-tick movement of every entity kind.
//!
//! Each entity moves using only its own state and the slope list, so the
//! order in which entities are advanced within a tick does not matter.

use crate::entity::{Entity, EntityKind, Motion, Orientation};
use crate::geometry::{angular_step_degrees, RADIUS_OF_JUPITER};
use serde::{Deserialize, Serialize};

/// Lower bound of the arc a relay satellite oscillates in.
pub const RELAY_ARC_START: f64 = 140.0;

/// Upper bound of the relay arc.
pub const RELAY_ARC_END: f64 = 190.0;

/// Relays beyond this angle reach the arc faster going anticlockwise.
pub const RELAY_THRESHOLD: f64 = 345.0;

/// Whole degree at which a teleporting satellite relocates.
pub const TELEPORT_TRIGGER: f64 = 180.0;

/// Angle a teleporting satellite relocates to.
pub const TELEPORT_TARGET: f64 = 0.0;

/// A stretch of terrain that lifts moving devices off the base surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slope {
    pub start: f64,
    pub end: f64,
    pub gradient: f64,
}

impl Slope {
    pub fn new(start: f64, end: f64, gradient: f64) -> Self {
        Self { start, end, gradient }
    }

    /// Strictly inside `(start, end)`.
    pub fn contains(&self, position: f64) -> bool {
        position > self.start && position < self.end
    }

    /// Height of the terrain at `position`. Rising slopes are measured from
    /// their start, falling ones from their end.
    pub fn height_at(&self, position: f64) -> f64 {
        let anchor = if self.gradient > 0.0 {
            self.start
        } else if self.gradient < 0.0 {
            self.end
        } else {
            return RADIUS_OF_JUPITER;
        };
        RADIUS_OF_JUPITER + ((position - anchor).abs() * self.gradient).abs()
    }
}

/// Motion substate a freshly created satellite starts in.
pub(crate) fn initial_motion(kind: EntityKind, position: f64) -> Motion {
    match kind {
        EntityKind::HandheldDevice | EntityKind::LaptopDevice | EntityKind::DesktopDevice => {
            Motion::Ground { moving: false }
        }
        EntityKind::StandardSatellite => Motion::Orbit,
        EntityKind::TeleportingSatellite => Motion::Teleport {
            orientation: Orientation::Anticlockwise,
            just_teleported: false,
        },
        EntityKind::RelaySatellite => {
            if position > RELAY_ARC_START && position < RELAY_ARC_END {
                Motion::Relay { orientation: Orientation::Clockwise, settled: true }
            } else if position >= RELAY_ARC_END && position < RELAY_THRESHOLD {
                Motion::Relay { orientation: Orientation::Clockwise, settled: false }
            } else {
                Motion::Relay { orientation: Orientation::Anticlockwise, settled: false }
            }
        }
    }
}

/// Advances one entity by one tick.
pub fn advance(entity: &mut Entity, slopes: &[Slope]) {
    let position = entity.position();
    let speed = entity.capabilities().linear_speed;

    match entity.motion() {
        Motion::Ground { moving: false } => {}
        Motion::Ground { moving: true } => {
            if let Some(slope) = slopes.iter().find(|slope| slope.contains(position)) {
                entity.set_height(slope.height_at(position));
            }
            let step = angular_step_degrees(speed, entity.height());
            entity.set_position(Orientation::Clockwise.apply(position, step));
        }
        Motion::Orbit => {
            let step = angular_step_degrees(speed, entity.height());
            entity.set_position(Orientation::Clockwise.apply(position, step));
        }
        Motion::Relay { orientation, settled } => {
            let step = angular_step_degrees(speed, entity.height());
            let (next, motion) = relay_step(position, step, orientation, settled);
            entity.set_position(next);
            entity.set_motion(motion);
        }
        Motion::Teleport { orientation, .. } => {
            let step = angular_step_degrees(speed, entity.height());
            let (next, motion) = teleport_step(position, step, orientation);
            if matches!(motion, Motion::Teleport { just_teleported: true, .. }) {
                tracing::info!("{} teleported from {:.2} to {}", entity.id(), position, next);
            }
            entity.set_position(next);
            entity.set_motion(motion);
        }
    }
}

fn relay_step(position: f64, step: f64, orientation: Orientation, settled: bool) -> (f64, Motion) {
    if !settled {
        let settled = (RELAY_ARC_START..=RELAY_ARC_END).contains(&position);
        return (orientation.apply(position, step), Motion::Relay { orientation, settled });
    }

    let whole = position.trunc();
    let orientation = if whole < RELAY_ARC_START {
        Orientation::Anticlockwise
    } else if whole > RELAY_ARC_END {
        Orientation::Clockwise
    } else {
        orientation
    };
    (orientation.apply(position, step), Motion::Relay { orientation, settled: true })
}

fn teleport_step(position: f64, step: f64, orientation: Orientation) -> (f64, Motion) {
    let moved = crate::geometry::normalize_degrees(orientation.apply(position, step));
    if moved.trunc() == TELEPORT_TRIGGER {
        let motion = Motion::Teleport {
            orientation: orientation.flipped(),
            just_teleported: true,
        };
        return (TELEPORT_TARGET, motion);
    }
    (moved, Motion::Teleport { orientation, just_teleported: false })
}

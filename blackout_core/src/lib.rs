//! Blackout Core - File Transfer Across an Orbiting Relay Network
//!
//! Simulates devices on the surface of Jupiter and the satellites above them
//! exchanging files over bandwidth-limited, range-limited, line-of-sight
//! links, one minute per tick:
//! 1. **Motion**: standard orbits, relay arcs, teleporting sweeps, devices walking over slopes
//! 2. **Visibility**: range + occlusion + type compatibility, extended through relays
//! 3. **Transfers**: bandwidth rationing per link, storage admission, teleport damage
//!
//! # Example
//!
//! ```
//! use blackout_core::{Blackout, EntityKind, RADIUS_OF_JUPITER};
//!
//! let mut world = Blackout::new();
//! world.create_device("phone", EntityKind::HandheldDevice, 30.0).unwrap();
//! world
//!     .create_satellite("sat", EntityKind::TeleportingSatellite, RADIUS_OF_JUPITER + 10_000.0, 30.0)
//!     .unwrap();
//! world.add_file_to_device("phone", "hello.txt", "hello world");
//!
//! world.send_file("hello.txt", "phone", "sat").unwrap();
//! world.simulate();
//!
//! let info = world.get_info("sat").unwrap();
//! assert!(info.files["hello.txt"].is_complete);
//! ```

pub mod entity;
pub mod error;
pub mod file;
pub mod geometry;
pub mod info;
pub mod motion;
pub mod registry;
pub mod transfer;
pub mod visibility;
pub mod world;

// Re-export key types for convenience
pub use entity::{Capabilities, Category, Entity, EntityKind, Motion, Orientation};
pub use error::{EntityError, TransferError};
pub use file::File;
pub use geometry::RADIUS_OF_JUPITER;
pub use info::{EntityInfo, FileInfo};
pub use motion::Slope;
pub use registry::{InFlight, LinkKey, TransferRegistry};
pub use transfer::{Outcome, TransferEvent};
pub use world::Blackout;

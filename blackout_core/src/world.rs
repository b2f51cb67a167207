//! `Blackout` - the world container and its tick driver.

use crate::entity::{Entity, EntityKind, EntityMap};
use crate::error::{EntityError, TransferError};
use crate::info::EntityInfo;
use crate::motion::{self, Slope};
use crate::registry::TransferRegistry;
use crate::transfer::{self, TransferEvent};
use crate::visibility;
use tracing::{debug, info};

/// The simulated network: entities, transfers in flight, and terrain.
///
/// One call to [`Blackout::simulate`] is one tick: every entity moves, then
/// every registered transfer is evaluated against the new positions.
#[derive(Debug, Default, Clone)]
pub struct Blackout {
    entities: EntityMap,
    transfers: TransferRegistry,
    slopes: Vec<Slope>,
    tick_count: u64,
    last_events: Vec<TransferEvent>,
}

impl Blackout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a stationary device on the surface.
    pub fn create_device(&mut self, id: &str, kind: EntityKind, position: f64) -> Result<(), EntityError> {
        self.insert(Entity::device(id, kind, position, false)?)
    }

    /// Places a device that walks clockwise along the surface every tick.
    pub fn create_moving_device(
        &mut self,
        id: &str,
        kind: EntityKind,
        position: f64,
    ) -> Result<(), EntityError> {
        self.insert(Entity::device(id, kind, position, true)?)
    }

    /// Launches a satellite `height` km from the body centre.
    pub fn create_satellite(
        &mut self,
        id: &str,
        kind: EntityKind,
        height: f64,
        position: f64,
    ) -> Result<(), EntityError> {
        self.insert(Entity::satellite(id, kind, height, position)?)
    }

    fn insert(&mut self, entity: Entity) -> Result<(), EntityError> {
        if self.entities.contains_key(entity.id()) {
            return Err(EntityError::DuplicateId(entity.id().to_string()));
        }
        debug!("Created {} {} at {:.2}", entity.kind(), entity.id(), entity.position());
        self.entities.insert(entity.id().to_string(), entity);
        Ok(())
    }

    pub fn remove_device(&mut self, id: &str) {
        self.remove_entity(id, EntityKind::is_device);
    }

    pub fn remove_satellite(&mut self, id: &str) {
        self.remove_entity(id, EntityKind::is_satellite);
    }

    /// Removes an entity and unwinds every transfer it took part in.
    fn remove_entity(&mut self, id: &str, category: fn(EntityKind) -> bool) {
        if !self.entities.get(id).is_some_and(|e| category(e.kind())) {
            return;
        }
        self.entities.remove(id);

        for (key, flight) in self.transfers.purge(id) {
            transfer::unwind(&mut self.entities, &key, &flight);
        }
        info!("Removed {}", id);
    }

    pub fn list_device_ids(&self) -> Vec<String> {
        self.ids_where(EntityKind::is_device)
    }

    pub fn list_satellite_ids(&self) -> Vec<String> {
        self.ids_where(EntityKind::is_satellite)
    }

    fn ids_where(&self, category: fn(EntityKind) -> bool) -> Vec<String> {
        self.entities
            .values()
            .filter(|e| category(e.kind()))
            .map(|e| e.id().to_string())
            .collect()
    }

    /// Drops a fully resident file onto a device. Unknown ids are ignored.
    pub fn add_file_to_device(&mut self, id: &str, filename: &str, content: &str) {
        if let Some(device) = self.entities.get_mut(id).filter(|e| e.kind().is_device()) {
            device.add_resident_file(filename, content);
        }
    }

    /// Snapshot of one entity, or `None` if the id is unknown.
    pub fn get_info(&self, id: &str) -> Option<EntityInfo> {
        self.entities.get(id).map(EntityInfo::from)
    }

    /// Ids reachable from `id` right now, sorted.
    pub fn communicable_entities_in_range(&self, id: &str) -> Vec<String> {
        visibility::communicable(&self.entities, id).into_iter().collect()
    }

    /// Starts sending `filename` from `from` to `to`.
    pub fn send_file(&mut self, filename: &str, from: &str, to: &str) -> Result<(), TransferError> {
        transfer::admit(&mut self.entities, &mut self.transfers, filename, from, to)
    }

    /// Appends a slope; earlier slopes win where they overlap.
    pub fn create_slope(&mut self, start: f64, end: f64, gradient: f64) {
        self.slopes.push(Slope::new(start, end, gradient));
    }

    /// Advances the world by one tick.
    pub fn simulate(&mut self) {
        for entity in self.entities.values_mut() {
            motion::advance(entity, &self.slopes);
        }
        self.last_events = transfer::step(&mut self.entities, &mut self.transfers);
        self.tick_count += 1;
        debug!(
            "Tick {}: {} transfers in flight",
            self.tick_count,
            self.transfers.len()
        );
    }

    /// Advances the world by `ticks` ticks.
    pub fn simulate_for(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.simulate();
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Per-file outcomes of the most recent tick.
    pub fn last_events(&self) -> &[TransferEvent] {
        &self.last_events
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn transfers(&self) -> &TransferRegistry {
        &self.transfers
    }

    pub fn slopes(&self) -> &[Slope] {
        &self.slopes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RADIUS_OF_JUPITER;
    use EntityKind::*;

    const ORBIT: f64 = RADIUS_OF_JUPITER + 10_000.0;

    #[test]
    fn test_create_and_list() {
        let mut world = Blackout::new();
        world.create_device("d2", HandheldDevice, 10.0).unwrap();
        world.create_device("d1", LaptopDevice, 20.0).unwrap();
        world.create_satellite("s1", StandardSatellite, ORBIT, 30.0).unwrap();

        assert_eq!(world.list_device_ids(), vec!["d1", "d2"]);
        assert_eq!(world.list_satellite_ids(), vec!["s1"]);
        assert_eq!(
            world.create_device("d1", DesktopDevice, 0.0),
            Err(EntityError::DuplicateId("d1".into()))
        );
    }

    #[test]
    fn test_get_info_reports_files() {
        let mut world = Blackout::new();
        world.create_device("d1", HandheldDevice, 10.0).unwrap();
        world.add_file_to_device("d1", "hello.txt", "hi there");
        world.add_file_to_device("ghost", "x", "y");

        let info = world.get_info("d1").unwrap();
        assert_eq!(info.kind, HandheldDevice);
        assert_eq!(info.height, RADIUS_OF_JUPITER);
        let file = &info.files["hello.txt"];
        assert_eq!(file.data, "hi there");
        assert_eq!(file.size, 8);
        assert!(file.is_complete);
        assert!(world.get_info("ghost").is_none());
    }

    #[test]
    fn test_simulate_counts_ticks() {
        let mut world = Blackout::new();
        world.create_satellite("s1", StandardSatellite, ORBIT, 30.0).unwrap();
        world.simulate_for(5);
        assert_eq!(world.tick_count(), 5);
        assert!(world.get_info("s1").unwrap().position < 30.0);
    }

    #[test]
    fn test_remove_satellite_unwinds_transfers() {
        let mut world = Blackout::new();
        world.create_device("d1", HandheldDevice, 0.0).unwrap();
        world.create_satellite("s1", TeleportingSatellite, ORBIT, 0.0).unwrap();
        world.add_file_to_device("d1", "f", "some longer content here");
        world.send_file("f", "d1", "s1").unwrap();
        world.simulate();

        world.remove_device("s1");
        assert!(world.entity("s1").is_some());

        world.remove_satellite("s1");
        assert!(world.entity("s1").is_none());
        assert!(world.transfers().is_empty());
        assert!(world.get_info("d1").unwrap().files["f"].is_complete);
    }

    #[test]
    fn test_remove_device_drops_incoming_shell() {
        let mut world = Blackout::new();
        world.create_device("d1", HandheldDevice, 0.0).unwrap();
        world.create_satellite("s1", TeleportingSatellite, ORBIT, 0.0).unwrap();
        world.add_file_to_device("d1", "f", "content");
        world.send_file("f", "d1", "s1").unwrap();

        world.remove_device("d1");
        assert!(world.get_info("s1").unwrap().files.is_empty());
        assert!(world.transfers().is_empty());
    }
}

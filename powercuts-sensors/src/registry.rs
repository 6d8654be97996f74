//! Entity registry for one config entry.
//!
//! Sensors are registered once and never removed: when a power cut
//! disappears its sensors simply become unavailable, and when the set grows
//! past anything seen before, sensors for the new indices are added.

use powercuts_core::CoordinatorSnapshot;
use tracing::debug;

use crate::descriptor::OutageField;
use crate::entity::{EntityState, SensorContext, SensorEntity};

/// Sensors registered for one config entry.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    context: SensorContext,
    entities: Vec<SensorEntity>,
    indices: usize,
}

impl EntityRegistry {
    /// Registers the count sensor, field sensors for every record in
    /// `snapshot`, and the latest event sensor.
    pub fn setup(context: SensorContext, snapshot: &CoordinatorSnapshot) -> Self {
        let mut registry = Self {
            entities: vec![SensorEntity::count(context.clone())],
            context,
            indices: 0,
        };
        registry.add_indices(snapshot.len());
        registry
            .entities
            .push(SensorEntity::latest_event(registry.context.clone()));

        debug!(
            entry_id = %registry.context.entry_id,
            entities = registry.entities.len(),
            "Registered sensors"
        );
        registry
    }

    /// Adds sensors for indices not seen before and returns them.
    pub fn sync(&mut self, snapshot: &CoordinatorSnapshot) -> Vec<SensorEntity> {
        let before = self.entities.len();
        self.add_indices(snapshot.len());
        let added = self.entities[before..].to_vec();

        if !added.is_empty() {
            debug!(
                entry_id = %self.context.entry_id,
                added = added.len(),
                "Registered sensors for new power cuts"
            );
        }
        added
    }

    fn add_indices(&mut self, len: usize) {
        for index in self.indices..len {
            for field in OutageField::ALL {
                self.entities
                    .push(SensorEntity::field(self.context.clone(), index, field));
            }
        }
        self.indices = self.indices.max(len);
    }

    /// The entry these sensors belong to.
    pub fn context(&self) -> &SensorContext {
        &self.context
    }

    /// All registered sensors, in registration order.
    pub fn entities(&self) -> &[SensorEntity] {
        &self.entities
    }

    /// Number of power cut indices with registered sensors.
    pub fn tracked_indices(&self) -> usize {
        self.indices
    }

    /// Renders every registered sensor.
    pub fn render(&self, snapshot: &CoordinatorSnapshot) -> Vec<EntityState> {
        self.entities.iter().map(|e| e.render(snapshot)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powercuts_core::{OutageRecord, OutageSet};

    fn snapshot(count: usize) -> CoordinatorSnapshot {
        let records = (0..count)
            .map(|i| OutageRecord {
                reference: Some(format!("INCD-{i}")),
                postcode: Some("NE1 1AA".to_string()),
                ..OutageRecord::default()
            })
            .collect();
        CoordinatorSnapshot::with_data(OutageSet::new(records))
    }

    fn context() -> SensorContext {
        SensorContext::new("ne11aa", "Home", "NE1 1AA")
    }

    #[test]
    fn test_setup_without_data() {
        let registry = EntityRegistry::setup(context(), &CoordinatorSnapshot::empty());
        let ids: Vec<_> = registry.entities().iter().map(SensorEntity::unique_id).collect();
        assert_eq!(ids, vec!["ne11aa_count", "ne11aa_latest_event"]);
    }

    #[test]
    fn test_setup_with_two_cuts() {
        let registry = EntityRegistry::setup(context(), &snapshot(2));
        assert_eq!(registry.entities().len(), 2 + 2 * 7);
        assert_eq!(registry.tracked_indices(), 2);
        assert_eq!(
            registry.entities()[1].unique_id(),
            "ne11aa_power_cut_0_reference"
        );
    }

    #[test]
    fn test_sync_only_grows() {
        let mut registry = EntityRegistry::setup(context(), &snapshot(1));

        let added = registry.sync(&snapshot(3));
        assert_eq!(added.len(), 14);
        assert_eq!(added[0].unique_id(), "ne11aa_power_cut_1_reference");

        assert!(registry.sync(&snapshot(0)).is_empty());
        assert!(registry.sync(&snapshot(3)).is_empty());
        assert_eq!(registry.entities().len(), 2 + 3 * 7);
    }

    #[test]
    fn test_unique_ids_are_unique() {
        let registry = EntityRegistry::setup(context(), &snapshot(4));
        let mut ids: Vec<_> = registry.entities().iter().map(SensorEntity::unique_id).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_render_after_shrink() {
        let registry = EntityRegistry::setup(context(), &snapshot(2));
        let states = registry.render(&snapshot(1));

        let unavailable = states.iter().filter(|s| !s.available).count();
        assert_eq!(unavailable, 7);
    }
}

//! Lot manager: the set of level registries making up one parking lot.
//!
//! The manager is a plain owned value. The service decides when one exists,
//! which replaces any notion of a process-wide instance.

use std::collections::BTreeMap;

use crate::error::{ParkingError, Result};
use crate::level::{LevelRegistry, ParkOutcome};
use crate::policy::PolicyKind;
use crate::vehicle::{StatusRow, Vehicle};
use crate::{LevelId, MAX_LEVEL_CAPACITY, SlotNumber};

pub struct LotManager {
    levels: BTreeMap<LevelId, LevelRegistry>,
}

impl LotManager {
    /// Build one registry per `(levels[i], capacities[i])` pair.
    ///
    /// The slices must have equal length and name each level at most once.
    /// No capacity may exceed [`MAX_LEVEL_CAPACITY`].
    pub fn new(levels: &[LevelId], capacities: &[u32], policy: PolicyKind) -> Result<Self> {
        if levels.len() != capacities.len() {
            return Err(ParkingError::invalid("capacity"));
        }
        if capacities.iter().any(|&c| c > MAX_LEVEL_CAPACITY) {
            return Err(ParkingError::invalid("capacity"));
        }

        let mut registries = BTreeMap::new();
        for (&level, &capacity) in levels.iter().zip(capacities) {
            if registries.contains_key(&level) {
                return Err(ParkingError::invalid("level"));
            }
            registries.insert(level, LevelRegistry::new(level, capacity, policy.build()));
        }

        Ok(Self { levels: registries })
    }

    pub fn levels(&self) -> Vec<LevelId> {
        self.levels.keys().copied().collect()
    }

    pub fn total_capacity(&self) -> u64 {
        self.levels.values().map(|l| u64::from(l.capacity())).sum()
    }

    fn level(&self, level: LevelId) -> Result<&LevelRegistry> {
        self.levels
            .get(&level)
            .ok_or(ParkingError::UnknownLevel(level))
    }

    fn level_mut(&mut self, level: LevelId) -> Result<&mut LevelRegistry> {
        self.levels
            .get_mut(&level)
            .ok_or(ParkingError::UnknownLevel(level))
    }

    pub fn park(&mut self, level: LevelId, vehicle: Vehicle) -> Result<ParkOutcome> {
        Ok(self.level_mut(level)?.park(vehicle))
    }

    pub fn leave(&mut self, level: LevelId, slot: SlotNumber) -> Result<bool> {
        Ok(self.level_mut(level)?.leave(slot))
    }

    pub fn status(&self, level: LevelId) -> Result<Vec<StatusRow>> {
        Ok(self.level(level)?.status())
    }

    pub fn available_slots(&self, level: LevelId) -> Result<usize> {
        Ok(self.level(level)?.available_slots())
    }

    pub fn registrations_for_color(&self, level: LevelId, color: &str) -> Result<Vec<String>> {
        Ok(self.level(level)?.registrations_for_color(color))
    }

    pub fn slots_for_color(&self, level: LevelId, color: &str) -> Result<Vec<SlotNumber>> {
        Ok(self.level(level)?.slots_for_color(color))
    }

    pub fn slot_for_registration(
        &self,
        level: LevelId,
        registration_no: &str,
    ) -> Result<Option<SlotNumber>> {
        Ok(self.level(level)?.slot_for_registration(registration_no))
    }

    /// Tear down every level and forget them.
    pub fn teardown(&mut self) {
        for registry in self.levels.values_mut() {
            registry.teardown();
        }
        self.levels.clear();
    }
}

//! Per-level occupancy registry.
//!
//! Invariants held by every method:
//! - `occupied` and `by_registration` are exact inverses of each other.
//! - the policy's free set is exactly `1..=capacity` minus the occupied slots.

use std::collections::{BTreeMap, HashMap};

use crate::policy::AllocationPolicy;
use crate::vehicle::{StatusRow, Vehicle};
use crate::{LevelId, SlotNumber};

/// Result of asking a level to park a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParkOutcome {
    Allocated(SlotNumber),
    LotFull,
    AlreadyParked,
}

impl ParkOutcome {
    pub fn slot(&self) -> Option<SlotNumber> {
        match self {
            ParkOutcome::Allocated(slot) => Some(*slot),
            _ => None,
        }
    }
}

pub struct LevelRegistry {
    level: LevelId,
    capacity: u32,
    occupied: BTreeMap<SlotNumber, Vehicle>,
    by_registration: HashMap<String, SlotNumber>,
    policy: Box<dyn AllocationPolicy>,
}

impl LevelRegistry {
    /// Create a level with every slot in `1..=capacity` free.
    pub fn new(level: LevelId, capacity: u32, mut policy: Box<dyn AllocationPolicy>) -> Self {
        policy.clear();
        for slot in 1..=capacity {
            policy.add(slot);
        }
        Self {
            level,
            capacity,
            occupied: BTreeMap::new(),
            by_registration: HashMap::new(),
            policy,
        }
    }

    pub fn level(&self) -> LevelId {
        self.level
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    pub fn park(&mut self, vehicle: Vehicle) -> ParkOutcome {
        if self.by_registration.contains_key(vehicle.registration_no()) {
            tracing::debug!(
                level = self.level,
                registration_no = vehicle.registration_no(),
                "Vehicle already parked"
            );
            return ParkOutcome::AlreadyParked;
        }

        let Some(slot) = self.policy.next_slot() else {
            tracing::debug!(level = self.level, "No free slot");
            return ParkOutcome::LotFull;
        };

        tracing::debug!(
            level = self.level,
            slot,
            registration_no = vehicle.registration_no(),
            "Slot allocated"
        );
        self.by_registration
            .insert(vehicle.registration_no().to_string(), slot);
        self.occupied.insert(slot, vehicle);
        ParkOutcome::Allocated(slot)
    }

    /// Free `slot`. Returns `false` when the slot was not occupied.
    pub fn leave(&mut self, slot: SlotNumber) -> bool {
        let Some(vehicle) = self.occupied.remove(&slot) else {
            return false;
        };
        self.by_registration.remove(vehicle.registration_no());
        self.policy.add(slot);
        tracing::debug!(
            level = self.level,
            slot,
            registration_no = vehicle.registration_no(),
            "Slot released"
        );
        true
    }

    /// Occupied slots in ascending slot order.
    pub fn status(&self) -> Vec<StatusRow> {
        self.occupied
            .iter()
            .map(|(slot, vehicle)| StatusRow {
                slot: *slot,
                registration_no: vehicle.registration_no().to_string(),
                color: vehicle.color().to_string(),
            })
            .collect()
    }

    pub fn available_slots(&self) -> usize {
        self.capacity as usize - self.occupied.len()
    }

    pub fn registrations_for_color(&self, color: &str) -> Vec<String> {
        self.occupied
            .values()
            .filter(|v| v.has_color(color))
            .map(|v| v.registration_no().to_string())
            .collect()
    }

    pub fn slots_for_color(&self, color: &str) -> Vec<SlotNumber> {
        self.occupied
            .iter()
            .filter(|(_, v)| v.has_color(color))
            .map(|(slot, _)| *slot)
            .collect()
    }

    pub fn slot_for_registration(&self, registration_no: &str) -> Option<SlotNumber> {
        self.by_registration.get(registration_no).copied()
    }

    /// Drop all occupancy and free-slot state. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.occupied.clear();
        self.by_registration.clear();
        self.policy.clear();
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        assert_eq!(self.occupied.len(), self.by_registration.len());
        for (slot, vehicle) in &self.occupied {
            assert_eq!(self.by_registration.get(vehicle.registration_no()), Some(slot));
        }
        assert_eq!(
            self.policy.available() + self.occupied.len(),
            self.capacity as usize
        );
    }
}

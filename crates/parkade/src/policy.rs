//! Slot allocation policies.
//!
//! A policy owns the set of free slots of one level and decides which of them is
//! handed out next. Registries only talk to the [`AllocationPolicy`] trait, so new
//! orderings can be added here without touching the registry.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::SlotNumber;

/// Free-slot bookkeeping for a single level.
pub trait AllocationPolicy: Send + Sync {
    /// Mark `slot` free. Adding an already free slot is a no-op.
    fn add(&mut self, slot: SlotNumber);

    /// Remove and return the preferred free slot, or `None` when exhausted.
    fn next_slot(&mut self) -> Option<SlotNumber>;

    /// Withdraw a specific slot from the free set. Returns whether it was free.
    fn remove(&mut self, slot: SlotNumber) -> bool;

    /// Number of free slots.
    fn available(&self) -> usize;

    fn clear(&mut self);
}

/// Always hands out the lowest-numbered free slot.
#[derive(Debug, Default)]
pub struct NearestFirst {
    free: BTreeSet<SlotNumber>,
}

impl NearestFirst {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AllocationPolicy for NearestFirst {
    fn add(&mut self, slot: SlotNumber) {
        self.free.insert(slot);
    }

    fn next_slot(&mut self) -> Option<SlotNumber> {
        self.free.pop_first()
    }

    fn remove(&mut self, slot: SlotNumber) -> bool {
        self.free.remove(&slot)
    }

    fn available(&self) -> usize {
        self.free.len()
    }

    fn clear(&mut self) {
        self.free.clear();
    }
}

/// Always hands out the highest-numbered free slot.
#[derive(Debug, Default)]
pub struct FarthestFirst {
    free: BTreeSet<SlotNumber>,
}

impl FarthestFirst {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AllocationPolicy for FarthestFirst {
    fn add(&mut self, slot: SlotNumber) {
        self.free.insert(slot);
    }

    fn next_slot(&mut self) -> Option<SlotNumber> {
        self.free.pop_last()
    }

    fn remove(&mut self, slot: SlotNumber) -> bool {
        self.free.remove(&slot)
    }

    fn available(&self) -> usize {
        self.free.len()
    }

    fn clear(&mut self) {
        self.free.clear();
    }
}

/// Named policy selection, used by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PolicyKind {
    #[default]
    NearestFirst,
    FarthestFirst,
}

impl PolicyKind {
    pub fn build(self) -> Box<dyn AllocationPolicy> {
        match self {
            PolicyKind::NearestFirst => Box::new(NearestFirst::new()),
            PolicyKind::FarthestFirst => Box::new(FarthestFirst::new()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::NearestFirst => "nearest",
            PolicyKind::FarthestFirst => "farthest",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown allocation policy '{0}', expected 'nearest' or 'farthest'")]
pub struct UnknownPolicy(pub String);

impl FromStr for PolicyKind {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nearest" | "nearest-first" => Ok(PolicyKind::NearestFirst),
            "farthest" | "farthest-first" => Ok(PolicyKind::FarthestFirst),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(kind: PolicyKind, capacity: SlotNumber) -> Box<dyn AllocationPolicy> {
        let mut policy = kind.build();
        for slot in 1..=capacity {
            policy.add(slot);
        }
        policy
    }

    #[test]
    fn nearest_first_yields_ascending() {
        let mut policy = seeded(PolicyKind::NearestFirst, 3);
        assert_eq!(policy.next_slot(), Some(1));
        assert_eq!(policy.next_slot(), Some(2));
        assert_eq!(policy.next_slot(), Some(3));
        assert_eq!(policy.next_slot(), None);
    }

    #[test]
    fn nearest_first_reuses_returned_slot() {
        let mut policy = seeded(PolicyKind::NearestFirst, 5);
        for _ in 0..4 {
            policy.next_slot();
        }
        policy.add(2);
        assert_eq!(policy.next_slot(), Some(2));
        assert_eq!(policy.next_slot(), Some(5));
    }

    #[test]
    fn farthest_first_yields_descending() {
        let mut policy = seeded(PolicyKind::FarthestFirst, 3);
        assert_eq!(policy.next_slot(), Some(3));
        policy.add(3);
        assert_eq!(policy.next_slot(), Some(3));
        assert_eq!(policy.next_slot(), Some(2));
    }

    #[test]
    fn remove_withdraws_arbitrary_slot() {
        let mut policy = seeded(PolicyKind::NearestFirst, 4);
        assert!(policy.remove(1));
        assert!(!policy.remove(1));
        assert_eq!(policy.available(), 3);
        assert_eq!(policy.next_slot(), Some(2));
    }

    #[test]
    fn add_is_idempotent() {
        let mut policy = seeded(PolicyKind::NearestFirst, 2);
        policy.add(2);
        assert_eq!(policy.available(), 2);
        policy.clear();
        assert_eq!(policy.available(), 0);
        assert_eq!(policy.next_slot(), None);
    }

    #[test]
    fn policy_kind_parses_names() {
        assert_eq!("nearest".parse(), Ok(PolicyKind::NearestFirst));
        assert_eq!("farthest-first".parse(), Ok(PolicyKind::FarthestFirst));
        assert_eq!(
            "random".parse::<PolicyKind>(),
            Err(UnknownPolicy("random".to_string()))
        );
        assert_eq!(PolicyKind::default().to_string(), "nearest");
    }
}

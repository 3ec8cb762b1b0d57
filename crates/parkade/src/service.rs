//! ParkingService: the single entry point for callers.
//!
//! The service owns:
//! - The lot lifecycle (no lot until `create_parking_lot`, none again after `cleanup`)
//! - One reader/writer lock guarding every level of the lot
//! - Reporting of each outcome to the configured [`Reporter`]
//!
//! Existence checks and the operation they guard always run under one lock hold.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{ParkingError, Result};
use crate::level::ParkOutcome;
use crate::manager::LotManager;
use crate::policy::PolicyKind;
use crate::report::{Report, Reporter};
use crate::vehicle::{StatusRow, Vehicle};
use crate::{LevelId, SlotNumber};

type LotSlot = Option<LotManager>;

pub struct ParkingService {
    /// `None` until a lot is created.
    lot: RwLock<LotSlot>,
    reporter: Arc<dyn Reporter>,
    policy: PolicyKind,
}

impl ParkingService {
    pub fn new(reporter: Arc<dyn Reporter>) -> Self {
        Self {
            lot: RwLock::new(None),
            reporter,
            policy: PolicyKind::default(),
        }
    }

    /// Allocation policy used for lots created from now on.
    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> PolicyKind {
        self.policy
    }

    pub fn is_active(&self) -> bool {
        self.lot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn read_lot(&self) -> Result<RwLockReadGuard<'_, LotSlot>> {
        self.lot.read().map_err(|e| {
            tracing::warn!("Parking lot lock poisoned");
            ParkingError::processing(e.to_string())
        })
    }

    fn write_lot(&self) -> Result<RwLockWriteGuard<'_, LotSlot>> {
        self.lot.write().map_err(|e| {
            tracing::warn!("Parking lot lock poisoned");
            ParkingError::processing(e.to_string())
        })
    }

    fn emit(&self, report: Report) {
        self.reporter.report(&report);
    }

    /// Create a single-level lot.
    pub fn create_parking_lot(&self, level: LevelId, capacity: u32) -> Result<()> {
        self.create_parking_lot_levels(&[level], &[capacity])
    }

    /// Create a lot with one level per `(levels[i], capacities[i])` pair.
    ///
    /// Fails with `AlreadyExists` while a lot is active.
    pub fn create_parking_lot_levels(&self, levels: &[LevelId], capacities: &[u32]) -> Result<()> {
        let mut guard = self.write_lot()?;
        if guard.is_some() {
            tracing::warn!("Parking lot already created");
            return Err(ParkingError::AlreadyExists);
        }

        let lot = LotManager::new(levels, capacities, self.policy)?;
        let capacity = lot.total_capacity();
        tracing::info!(
            levels = ?lot.levels(),
            capacity,
            policy = %self.policy,
            "Created parking lot"
        );
        *guard = Some(lot);
        self.emit(Report::LotCreated { capacity });
        Ok(())
    }

    pub fn park(&self, level: LevelId, vehicle: Vehicle) -> Result<ParkOutcome> {
        let mut guard = self.write_lot()?;
        let lot = guard.as_mut().ok_or(ParkingError::NotExist)?;
        let outcome = lot.park(level, vehicle)?;

        self.emit(match outcome {
            ParkOutcome::Allocated(slot) => Report::Allocated(slot),
            ParkOutcome::LotFull => Report::LotFull,
            ParkOutcome::AlreadyParked => Report::AlreadyParked,
        });
        Ok(outcome)
    }

    /// Free `slot`. Returns `false` (and reports it) when the slot was already empty.
    pub fn unpark(&self, level: LevelId, slot: SlotNumber) -> Result<bool> {
        let mut guard = self.write_lot()?;
        let lot = guard.as_mut().ok_or(ParkingError::NotExist)?;
        let freed = lot.leave(level, slot)?;

        if freed {
            self.emit(Report::SlotFreed(slot));
        } else {
            self.emit(Report::SlotAlreadyEmpty);
        }
        Ok(freed)
    }

    pub fn status(&self, level: LevelId) -> Result<Vec<StatusRow>> {
        let guard = self.read_lot()?;
        let lot = guard.as_ref().ok_or(ParkingError::NotExist)?;
        let rows = lot.status(level)?;

        self.emit(Report::StatusHeader);
        if rows.is_empty() {
            self.emit(Report::LotEmpty);
        }
        for row in &rows {
            self.emit(Report::StatusRow(row.clone()));
        }
        Ok(rows)
    }

    pub fn available_slots(&self, level: LevelId) -> Result<usize> {
        let guard = self.read_lot()?;
        let lot = guard.as_ref().ok_or(ParkingError::NotExist)?;
        lot.available_slots(level)
    }

    pub fn registrations_for_color(&self, level: LevelId, color: &str) -> Result<Vec<String>> {
        let guard = self.read_lot()?;
        let lot = guard.as_ref().ok_or(ParkingError::NotExist)?;
        let registrations = lot.registrations_for_color(level, color)?;

        if registrations.is_empty() {
            self.emit(Report::NotFound);
        } else {
            self.emit(Report::Registrations(registrations.clone()));
        }
        Ok(registrations)
    }

    pub fn slots_for_color(&self, level: LevelId, color: &str) -> Result<Vec<SlotNumber>> {
        let guard = self.read_lot()?;
        let lot = guard.as_ref().ok_or(ParkingError::NotExist)?;
        let slots = lot.slots_for_color(level, color)?;

        if slots.is_empty() {
            self.emit(Report::NotFound);
        } else {
            self.emit(Report::Slots(slots.clone()));
        }
        Ok(slots)
    }

    pub fn slot_for_registration(
        &self,
        level: LevelId,
        registration_no: &str,
    ) -> Result<Option<SlotNumber>> {
        let guard = self.read_lot()?;
        let lot = guard.as_ref().ok_or(ParkingError::NotExist)?;
        let slot = lot.slot_for_registration(level, registration_no)?;

        match slot {
            Some(slot) => self.emit(Report::Slot(slot)),
            None => self.emit(Report::NotFound),
        }
        Ok(slot)
    }

    /// Tear the lot down so a new one can be created. No-op without a lot.
    ///
    /// Also recovers a poisoned lock, since all state behind it is discarded.
    pub fn cleanup(&self) {
        let mut guard = self.lot.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(mut lot) = guard.take() {
            lot.teardown();
            tracing::info!("Parking lot torn down");
        }
        drop(guard);
        self.lot.clear_poison();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryReporter;

    const LEVEL: LevelId = 1;

    fn service() -> (ParkingService, Arc<MemoryReporter>) {
        let reporter = Arc::new(MemoryReporter::new());
        let svc = ParkingService::new(Arc::clone(&reporter) as Arc<dyn Reporter>);
        (svc, reporter)
    }

    fn car(reg: &str, color: &str) -> Vehicle {
        Vehicle::new(reg, color).unwrap()
    }

    #[test]
    fn create_reports_capacity() {
        let (svc, out) = service();
        assert!(!svc.is_active());
        svc.create_parking_lot(LEVEL, 65).unwrap();
        assert!(svc.is_active());
        assert_eq!(out.lines(), vec!["Created parking lot with 65 slots"]);
    }

    #[test]
    fn create_twice_fails_until_cleanup() {
        let (svc, _out) = service();
        svc.create_parking_lot(LEVEL, 65).unwrap();
        let err = svc.create_parking_lot(LEVEL, 65).unwrap_err();
        assert!(matches!(err, ParkingError::AlreadyExists));

        svc.cleanup();
        assert!(!svc.is_active());
        svc.create_parking_lot(LEVEL, 3).unwrap();
        assert_eq!(svc.available_slots(LEVEL).unwrap(), 3);
    }

    #[test]
    fn every_operation_requires_a_lot() {
        let (svc, out) = service();
        let not_exist = |r: Result<()>| matches!(r, Err(ParkingError::NotExist));

        assert!(not_exist(svc.park(LEVEL, car("A", "white")).map(drop)));
        assert!(not_exist(svc.unpark(LEVEL, 1).map(drop)));
        assert!(not_exist(svc.status(LEVEL).map(drop)));
        assert!(not_exist(svc.available_slots(LEVEL).map(drop)));
        assert!(not_exist(svc.registrations_for_color(LEVEL, "white").map(drop)));
        assert!(not_exist(svc.slots_for_color(LEVEL, "white").map(drop)));
        assert!(not_exist(svc.slot_for_registration(LEVEL, "A").map(drop)));

        assert!(out.reports().is_empty());
        assert!(!svc.is_active());
        svc.cleanup();
    }

    #[test]
    fn lot_full_after_capacity() {
        let (svc, out) = service();
        svc.create_parking_lot(LEVEL, 2).unwrap();
        assert_eq!(
            svc.park(LEVEL, car("KA-01-HH-1234", "White")).unwrap(),
            ParkOutcome::Allocated(1)
        );
        assert_eq!(
            svc.park(LEVEL, car("KA-01-HH-9999", "White")).unwrap(),
            ParkOutcome::Allocated(2)
        );
        assert_eq!(
            svc.park(LEVEL, car("KA-01-BB-0001", "Black")).unwrap(),
            ParkOutcome::LotFull
        );
        insta::assert_snapshot!(out.lines().join("\n"), @r###"
        Created parking lot with 2 slots
        Allocated slot number: 1
        Allocated slot number: 2
        Sorry, parking lot is full
        "###);
    }

    #[test]
    fn oversized_capacity_is_rejected() {
        let (svc, out) = service();
        let err = svc.create_parking_lot(LEVEL, u32::MAX).unwrap_err();
        assert!(matches!(err, ParkingError::InvalidValue { name: "capacity" }));
        assert!(!svc.is_active());
        assert!(out.reports().is_empty());
    }

    #[test]
    fn creation_is_reported_before_any_park() {
        for _ in 0..50 {
            let (svc, out) = service();
            std::thread::scope(|s| {
                s.spawn(|| {
                    while svc.park(LEVEL, car("A", "white")).is_err() {
                        std::thread::yield_now();
                    }
                });
                svc.create_parking_lot(LEVEL, 2).unwrap();
            });
            assert_eq!(
                out.reports(),
                vec![Report::LotCreated { capacity: 2 }, Report::Allocated(1)]
            );
        }
    }

    #[test]
    fn unpark_then_nearest_slot_is_reused() {
        let (svc, out) = service();
        svc.create_parking_lot(LEVEL, 6).unwrap();
        for reg in ["KA-01-HH-1234", "KA-01-HH-9999", "KA-01-BB-0001"] {
            svc.park(LEVEL, car(reg, "White")).unwrap();
        }
        assert!(svc.unpark(LEVEL, 2).unwrap());
        assert_eq!(svc.available_slots(LEVEL).unwrap(), 4);
        assert_eq!(
            svc.park(LEVEL, car("KA-01-P-333", "Red")).unwrap(),
            ParkOutcome::Allocated(2)
        );
        assert!(out.lines().contains(&"Slot number 2 is free".to_string()));
    }

    #[test]
    fn leaving_twice_reports_already_empty() {
        let (svc, out) = service();
        svc.create_parking_lot(LEVEL, 99).unwrap();
        svc.park(LEVEL, car("KA-01-HH-1234", "White")).unwrap();
        svc.park(LEVEL, car("KA-01-HH-9999", "White")).unwrap();
        out.clear();

        assert!(svc.unpark(LEVEL, 1).unwrap());
        assert!(!svc.unpark(LEVEL, 1).unwrap());
        assert_eq!(
            out.lines(),
            vec!["Slot number 1 is free", "Slot number is Empty Already."]
        );
        assert_eq!(svc.available_slots(LEVEL).unwrap(), 98);
    }

    #[test]
    fn duplicate_vehicle_is_rejected() {
        let (svc, out) = service();
        svc.create_parking_lot(LEVEL, 3).unwrap();
        svc.park(LEVEL, car("KA-01-HH-1234", "White")).unwrap();
        assert_eq!(
            svc.park(LEVEL, car("KA-01-HH-1234", "White")).unwrap(),
            ParkOutcome::AlreadyParked
        );
        assert_eq!(svc.available_slots(LEVEL).unwrap(), 2);
        assert_eq!(out.lines().last().unwrap(), "Sorry, vehicle is already parked.");
    }

    #[test]
    fn status_on_empty_and_filled_lot() {
        let (svc, out) = service();
        svc.create_parking_lot(LEVEL, 8).unwrap();
        assert!(svc.status(LEVEL).unwrap().is_empty());

        svc.park(LEVEL, car("KA-01-HH-1234", "White")).unwrap();
        svc.park(LEVEL, car("KA-01-HH-9999", "White")).unwrap();
        let rows = svc.status(LEVEL).unwrap();
        assert_eq!(rows.iter().map(|r| r.slot).collect::<Vec<_>>(), vec![1, 2]);

        insta::assert_snapshot!(out.lines().join("\n"), @r###"
        Created parking lot with 8 slots
        Slot No.	Registration No.	Color
        Sorry, parking lot is empty.
        Allocated slot number: 1
        Allocated slot number: 2
        Slot No.	Registration No.	Color
        1	KA-01-HH-1234	White
        2	KA-01-HH-9999	White
        "###);
    }

    #[test]
    fn status_rows_serialize() {
        let (svc, _out) = service();
        svc.create_parking_lot(LEVEL, 2).unwrap();
        svc.park(LEVEL, car("KA-01-HH-1234", "White")).unwrap();
        insta::assert_json_snapshot!(svc.status(LEVEL).unwrap(), @r###"
        [
          {
            "slot": 1,
            "registration_no": "KA-01-HH-1234",
            "color": "White"
          }
        ]
        "###);
    }

    #[test]
    fn color_and_registration_queries() {
        let (svc, out) = service();
        svc.create_parking_lot(LEVEL, 6).unwrap();
        svc.park(LEVEL, car("KA-01-HH-1234", "White")).unwrap();
        svc.park(LEVEL, car("KA-01-HH-9999", "White")).unwrap();
        svc.park(LEVEL, car("KA-01-BB-0001", "Black")).unwrap();
        out.clear();

        assert_eq!(
            svc.registrations_for_color(LEVEL, "White").unwrap(),
            vec!["KA-01-HH-1234", "KA-01-HH-9999"]
        );
        assert_eq!(svc.slots_for_color(LEVEL, "Black").unwrap(), vec![3]);
        assert_eq!(svc.slots_for_color(LEVEL, "Red").unwrap(), Vec::<u32>::new());
        assert_eq!(
            svc.slot_for_registration(LEVEL, "KA-01-HH-9999").unwrap(),
            Some(2)
        );
        assert_eq!(svc.slot_for_registration(LEVEL, "MH-04-AY-1111").unwrap(), None);

        insta::assert_snapshot!(out.lines().join("\n"), @r###"
        KA-01-HH-1234,KA-01-HH-9999
        3
        Not Found
        2
        Not Found
        "###);
    }

    #[test]
    fn unknown_level_fails_without_reporting() {
        let (svc, out) = service();
        svc.create_parking_lot(LEVEL, 2).unwrap();
        out.clear();
        assert!(matches!(
            svc.park(4, car("A", "white")),
            Err(ParkingError::UnknownLevel(4))
        ));
        assert!(out.reports().is_empty());
    }

    #[test]
    fn multi_level_lot() {
        let (svc, out) = service();
        svc.create_parking_lot_levels(&[1, 2], &[2, 3]).unwrap();
        assert_eq!(out.lines(), vec!["Created parking lot with 5 slots"]);
        svc.park(2, car("A", "white")).unwrap();
        assert_eq!(svc.available_slots(1).unwrap(), 2);
        assert_eq!(svc.available_slots(2).unwrap(), 2);

        assert!(matches!(
            svc.create_parking_lot_levels(&[3], &[1]),
            Err(ParkingError::AlreadyExists)
        ));
    }

    #[test]
    fn invalid_levels_leave_service_uninitialized() {
        let (svc, out) = service();
        assert!(matches!(
            svc.create_parking_lot_levels(&[1, 1], &[2, 2]),
            Err(ParkingError::InvalidValue { name: "level" })
        ));
        assert!(!svc.is_active());
        assert!(out.reports().is_empty());
    }

    #[test]
    fn farthest_policy_is_applied() {
        let (svc, _out) = service();
        let svc = svc.with_policy(PolicyKind::FarthestFirst);
        assert_eq!(svc.policy(), PolicyKind::FarthestFirst);
        svc.create_parking_lot(LEVEL, 4).unwrap();
        assert_eq!(
            svc.park(LEVEL, car("A", "white")).unwrap(),
            ParkOutcome::Allocated(4)
        );
    }

    #[test]
    fn concurrent_parking_hands_out_each_slot_once() {
        let (svc, _out) = service();
        svc.create_parking_lot(LEVEL, 100).unwrap();

        let mut slots: Vec<SlotNumber> = std::thread::scope(|scope| {
            let parkers: Vec<_> = (0..8)
                .map(|t| {
                    let svc = &svc;
                    scope.spawn(move || {
                        (0..15)
                            .filter_map(|i| {
                                svc.park(LEVEL, car(&format!("T{t}-{i}"), "white"))
                                    .unwrap()
                                    .slot()
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            let readers: Vec<_> = (0..2)
                .map(|_| {
                    let svc = &svc;
                    scope.spawn(move || {
                        for _ in 0..50 {
                            let occupied = svc.status(LEVEL).unwrap().len();
                            let available = svc.available_slots(LEVEL).unwrap();
                            assert!(occupied <= 100);
                            assert!(available <= 100);
                        }
                    })
                })
                .collect();

            for reader in readers {
                reader.join().unwrap();
            }
            parkers
                .into_iter()
                .flat_map(|p| p.join().unwrap())
                .collect()
        });

        // 120 requests against 100 slots: every slot granted exactly once.
        slots.sort_unstable();
        assert_eq!(slots, (1..=100).collect::<Vec<_>>());
        assert_eq!(svc.available_slots(LEVEL).unwrap(), 0);
    }

    #[test]
    fn concurrent_duplicate_park_allocates_once() {
        let (svc, _out) = service();
        svc.create_parking_lot(LEVEL, 10).unwrap();

        let outcomes: Vec<ParkOutcome> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..6)
                .map(|_| {
                    let svc = &svc;
                    scope.spawn(move || svc.park(LEVEL, car("KA-01-HH-1234", "White")).unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let allocated = outcomes.iter().filter(|o| o.slot().is_some()).count();
        assert_eq!(allocated, 1);
        assert_eq!(svc.available_slots(LEVEL).unwrap(), 9);
    }

    #[test]
    fn poisoned_lock_surfaces_processing_error() {
        let (svc, _out) = service();
        svc.create_parking_lot(LEVEL, 2).unwrap();
        let svc = Arc::new(svc);

        let poisoner = Arc::clone(&svc);
        let result = std::thread::spawn::<_, ()>(move || {
            let _guard = poisoner.lot.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(result.is_err());

        let err = svc.park(LEVEL, car("A", "white")).unwrap_err();
        assert!(matches!(err, ParkingError::Processing { .. }));
        assert!(matches!(
            svc.status(LEVEL),
            Err(ParkingError::Processing { .. })
        ));

        svc.cleanup();
        assert!(!svc.is_active());
        svc.create_parking_lot(LEVEL, 1).unwrap();
        assert_eq!(
            svc.park(LEVEL, car("A", "white")).unwrap(),
            ParkOutcome::Allocated(1)
        );
    }
}

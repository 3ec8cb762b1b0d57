//! parkade: slot allocation and level registry engine for parking lots.

pub mod error;
pub mod level;
pub mod manager;
pub mod policy;
pub mod report;
pub mod service;
pub mod vehicle;

/// Integer address of a parking slot within a level, starting at 1.
pub type SlotNumber = u32;

/// Integer identifier of a parking level.
pub type LevelId = u32;

/// Level used when callers do not name one.
pub const DEFAULT_LEVEL: LevelId = 1;

/// Largest capacity a single level accepts. Every slot is seeded as free at creation.
pub const MAX_LEVEL_CAPACITY: u32 = 1_000_000;

pub use error::{ParkingError, Result};
pub use level::{LevelRegistry, ParkOutcome};
pub use manager::LotManager;
pub use policy::{AllocationPolicy, FarthestFirst, NearestFirst, PolicyKind, UnknownPolicy};
pub use report::{ConsoleReporter, MemoryReporter, Report, Reporter};
pub use service::ParkingService;
pub use vehicle::{StatusRow, Vehicle};

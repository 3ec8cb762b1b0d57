use thiserror::Error;

use crate::LevelId;

/// Failure kinds surfaced by the parking service.
///
/// Every operation either applies completely or fails with one of these and leaves
/// the lot untouched.
#[derive(Debug, Error)]
pub enum ParkingError {
    #[error("Sorry Parking Already Created, It CAN NOT be again recreated.")]
    AlreadyExists,

    #[error("Sorry, Car Parking Does not Exist")]
    NotExist,

    #[error("Parking level {0} does not exist")]
    UnknownLevel(LevelId),

    #[error("{name} value is incorrect")]
    InvalidValue { name: &'static str },

    #[error("Processing Error")]
    Processing {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ParkingError {
    pub fn invalid(name: &'static str) -> Self {
        ParkingError::InvalidValue { name }
    }

    pub fn processing(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ParkingError::Processing {
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ParkingError>;

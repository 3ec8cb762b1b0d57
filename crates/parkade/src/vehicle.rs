//! Vehicle and status row value types.

use std::fmt;

use serde::Serialize;

use crate::SlotNumber;
use crate::error::{ParkingError, Result};

/// A vehicle as the lot sees it: a registration number and a free-text color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    registration_no: String,
    color: String,
}

impl Vehicle {
    /// Build a vehicle. Both fields must be non-blank.
    pub fn new(registration_no: impl Into<String>, color: impl Into<String>) -> Result<Self> {
        let registration_no = registration_no.into();
        let color = color.into();
        if registration_no.trim().is_empty() {
            return Err(ParkingError::invalid("registration_number"));
        }
        if color.trim().is_empty() {
            return Err(ParkingError::invalid("color"));
        }
        Ok(Self {
            registration_no,
            color,
        })
    }

    pub fn registration_no(&self) -> &str {
        &self.registration_no
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    /// Color comparison used by every color query (ASCII case-insensitive).
    pub fn has_color(&self, color: &str) -> bool {
        self.color.eq_ignore_ascii_case(color)
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[registrationNo={}, color={}]",
            self.registration_no, self.color
        )
    }
}

/// One occupied slot in a status listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRow {
    pub slot: SlotNumber,
    pub registration_no: String,
    pub color: String,
}

impl fmt::Display for StatusRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.slot, self.registration_no, self.color)
    }
}

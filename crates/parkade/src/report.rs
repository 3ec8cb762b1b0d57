//! Human-readable reports emitted by the parking service.
//!
//! Every service operation describes its outcome as a [`Report`] and hands it to a
//! [`Reporter`]. `Display` on [`Report`] is the console text.

use std::fmt;
use std::io::Write;
use std::sync::Mutex;

use crate::SlotNumber;
use crate::vehicle::StatusRow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    LotCreated { capacity: u64 },
    Allocated(SlotNumber),
    LotFull,
    AlreadyParked,
    SlotFreed(SlotNumber),
    SlotAlreadyEmpty,
    StatusHeader,
    StatusRow(StatusRow),
    LotEmpty,
    Registrations(Vec<String>),
    Slots(Vec<SlotNumber>),
    Slot(SlotNumber),
    NotFound,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::LotCreated { capacity } => {
                write!(f, "Created parking lot with {capacity} slots")
            }
            Report::Allocated(slot) => write!(f, "Allocated slot number: {slot}"),
            Report::LotFull => f.write_str("Sorry, parking lot is full"),
            Report::AlreadyParked => f.write_str("Sorry, vehicle is already parked."),
            Report::SlotFreed(slot) => write!(f, "Slot number {slot} is free"),
            Report::SlotAlreadyEmpty => f.write_str("Slot number is Empty Already."),
            Report::StatusHeader => f.write_str("Slot No.\tRegistration No.\tColor"),
            Report::StatusRow(row) => row.fmt(f),
            Report::LotEmpty => f.write_str("Sorry, parking lot is empty."),
            Report::Registrations(regs) => f.write_str(&regs.join(",")),
            Report::Slots(slots) => {
                let joined: Vec<String> = slots.iter().map(ToString::to_string).collect();
                f.write_str(&joined.join(","))
            }
            Report::Slot(slot) => write!(f, "{slot}"),
            Report::NotFound => f.write_str("Not Found"),
        }
    }
}

/// Sink for service reports.
pub trait Reporter: Send + Sync {
    fn report(&self, report: &Report);
}

/// Writes one line per report to any writer (stdout by default).
pub struct ConsoleReporter<W: Write + Send = std::io::Stdout> {
    out: Mutex<W>,
}

impl ConsoleReporter {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Write a free-form line (errors, usage) through the same writer.
    pub fn line(&self, text: impl fmt::Display) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(out, "{text}").and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "Failed to write console output");
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn report(&self, report: &Report) {
        self.line(report);
    }
}

/// Keeps every report in memory.
#[derive(Default)]
pub struct MemoryReporter {
    reports: Mutex<Vec<Report>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        match self.reports.lock() {
            Ok(reports) => reports.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Rendered console lines, in order.
    pub fn lines(&self) -> Vec<String> {
        self.reports().iter().map(ToString::to_string).collect()
    }

    pub fn clear(&self) {
        match self.reports.lock() {
            Ok(mut reports) => reports.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, report: &Report) {
        match self.reports.lock() {
            Ok(mut reports) => reports.push(report.clone()),
            Err(poisoned) => poisoned.into_inner().push(report.clone()),
        }
    }
}

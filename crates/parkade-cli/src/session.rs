//! Session: drives a [`ParkingService`] from command lines.
//!
//! Service failures are printed and processing continues with the next line.
//! Only I/O failures on the input end a run early.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use parkade::{
    ConsoleReporter, LevelId, ParkingError, ParkingService, PolicyKind, Reporter, Vehicle,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::command::{COMMAND_HELP, Command, CommandError};

pub const BANNER: &str = "\
===================================================================
===================      PARKADE PARKING LOT     ==================
===================================================================";

/// Counters for a finished batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub lines: usize,
    pub executed: usize,
    pub rejected: usize,
}

pub struct Session<W: Write + Send + 'static = std::io::Stdout> {
    service: ParkingService,
    console: Arc<ConsoleReporter<W>>,
    level: LevelId,
}

impl Session {
    pub fn stdout(level: LevelId, policy: PolicyKind) -> Self {
        Self::new(ConsoleReporter::stdout(), level, policy)
    }
}

impl<W: Write + Send + 'static> Session<W> {
    pub fn new(console: ConsoleReporter<W>, level: LevelId, policy: PolicyKind) -> Self {
        let console = Arc::new(console);
        let reporter: Arc<dyn Reporter> = console.clone();
        Self {
            service: ParkingService::new(reporter).with_policy(policy),
            console,
            level,
        }
    }

    pub fn service(&self) -> &ParkingService {
        &self.service
    }

    pub fn banner(&self) {
        self.console.line(BANNER);
        self.console.line(COMMAND_HELP);
    }

    /// Run one parsed command against the configured level.
    pub fn execute(&self, command: Command) -> Result<(), ParkingError> {
        let level = self.level;
        match command {
            Command::CreateParkingLot { capacity } => {
                self.service.create_parking_lot(level, capacity)?;
            }
            Command::Park {
                registration_no,
                color,
            } => {
                self.service.park(level, Vehicle::new(registration_no, color)?)?;
            }
            Command::Leave { slot } => {
                self.service.unpark(level, slot)?;
            }
            Command::Status => {
                self.service.status(level)?;
            }
            Command::RegistrationNumbersForColor { color } => {
                self.service.registrations_for_color(level, &color)?;
            }
            Command::SlotNumbersForColor { color } => {
                self.service.slots_for_color(level, &color)?;
            }
            Command::SlotNumberForRegistration { registration_no } => {
                self.service.slot_for_registration(level, &registration_no)?;
            }
        }
        Ok(())
    }

    /// Parse and execute one line. Execution failures are printed, not returned;
    /// the error is only for lines that are not valid commands.
    pub fn handle_line(&self, line: &str) -> Result<(), CommandError> {
        let command = Command::parse(line)?;
        let keyword = command.keyword();
        if let Err(e) = self.execute(command) {
            tracing::warn!(command = keyword, error = %e, "Command failed");
            self.console.line(&e);
        }
        Ok(())
    }

    /// Execute every line of a batch input.
    pub async fn run_batch<R: AsyncBufRead + Unpin>(
        &self,
        mut reader: R,
    ) -> anyhow::Result<BatchSummary> {
        let mut buf = Vec::new();
        let mut summary = BatchSummary::default();

        while let Some(line) = read_line_lossy(&mut reader, &mut buf)
            .await
            .context("Invalid File")?
        {
            summary.lines += 1;
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            match self.handle_line(input) {
                Ok(()) => summary.executed += 1,
                Err(e) => {
                    tracing::debug!(line = summary.lines, error = %e, "Rejected command");
                    summary.rejected += 1;
                    self.console.line(format_args!(
                        "Incorrect Command Found at line: {} ,Input: {}",
                        summary.lines, input
                    ));
                }
            }
        }

        tracing::debug!(
            lines = summary.lines,
            executed = summary.executed,
            rejected = summary.rejected,
            "Batch finished"
        );
        Ok(summary)
    }

    /// Prompt-driven loop until `exit`, end of input, or Ctrl-C.
    pub async fn run_interactive<R: AsyncBufRead + Unpin>(
        &self,
        mut reader: R,
    ) -> anyhow::Result<()> {
        self.console.line("Please Enter 'exit' to end Execution");
        self.console.line("Input:");

        let mut buf = Vec::new();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            let line = tokio::select! {
                line = read_line_lossy(&mut reader, &mut buf) => line.context("Invalid Request")?,
                _ = &mut ctrl_c => {
                    tracing::info!("Interrupted, leaving");
                    break;
                }
            };
            let Some(line) = line else {
                break;
            };

            let input = line.trim();
            if input.eq_ignore_ascii_case("exit") {
                break;
            }
            if input.is_empty() {
                continue;
            }
            if let Err(e) = self.handle_line(input) {
                tracing::debug!(error = %e, "Rejected command");
                self.console.line(COMMAND_HELP);
            }
        }
        Ok(())
    }

    /// Tear the lot down.
    pub fn finish(&self) {
        self.service.cleanup();
    }

    /// Take back the console writer once the session is done.
    pub fn into_output(self) -> Option<W> {
        let Session {
            service, console, ..
        } = self;
        drop(service);
        Arc::try_unwrap(console)
            .ok()
            .map(|console| console.into_inner())
    }
}

/// Read one line, replacing bytes that are not UTF-8. `None` at end of input.
async fn read_line_lossy<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> std::io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

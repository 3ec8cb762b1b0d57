//! parkade-cli: line-oriented front end for the parkade engine.

pub mod command;
pub mod config;
pub mod logging;
pub mod session;

use anyhow::Context;
use tokio::io::BufReader;

pub use command::{Command, CommandError};
pub use config::{Config, USAGE, parse_args};
pub use session::{BatchSummary, Session};

/// Run a full session: batch file when configured, interactive otherwise.
///
/// The lot is always torn down before returning.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let session = Session::stdout(config.level, config.policy);
    session.banner();

    let result = match &config.input {
        Some(path) => match tokio::fs::File::open(path).await {
            Ok(file) => session.run_batch(BufReader::new(file)).await.map(|summary| {
                tracing::info!(
                    input = %path.display(),
                    executed = summary.executed,
                    rejected = summary.rejected,
                    "Batch complete"
                );
            }),
            Err(e) => Err(e).with_context(|| format!("Invalid File: {}", path.display())),
        },
        None => {
            session
                .run_interactive(BufReader::new(tokio::io::stdin()))
                .await
        }
    };

    session.finish();
    result
}

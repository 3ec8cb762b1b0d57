use std::process;

use parkade_cli::{USAGE, logging, parse_args};

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("error: {msg}");
                eprintln!();
            }
            eprintln!("{USAGE}");
            process::exit(2);
        }
    };

    logging::init_tracing();
    tracing::debug!(?config, "Starting parkade");

    if let Err(e) = parkade_cli::run(config).await {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

use clap::Parser;
use log::{info, warn};

mod args;
mod ranking;

use crate::args::Args;
use crate::ranking::RankError;

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    info!("args: {:?}", args);

    match ranking::run_program(&args) {
        Ok(table) => {
            info!("Ranked {} courses", table.rows.len());
        }
        // A missing survey is not a failure: report it and stop before writing anything.
        Err(e @ RankError::InputNotFound { .. }) => {
            println!("Error: {}", e);
        }
        Err(e) => {
            warn!("Error occurred {:?}", e);
            eprintln!("An error occurred: {}", e);
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            std::process::exit(1);
        }
    }
}

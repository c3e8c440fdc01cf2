use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

use maplink_core::{run, RunSettings};

#[derive(Debug, Parser)]
#[command(name = "maplink", version, about = "Replay chat sessions through the map link repairer")]
struct Args {
    /// Zone directory JSON: place names, map ids and map geometry.
    #[arg(long)]
    zones: PathBuf,

    /// Recorded session JSON of observed links and pasted messages.
    #[arg(long)]
    session: PathBuf,

    /// Fixed seed for coordinate jitter.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn setup_logger(debug: bool) -> Result<(), fern::InitError> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(err) = setup_logger(args.debug) {
        eprintln!("Failed to initialise logging: {err}");
    }

    let settings = RunSettings {
        zones_path: args.zones,
        session_path: args.session,
        seed: args.seed,
        debug: args.debug,
    };

    match run(settings) {
        Ok(report) => print!("{}", report),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

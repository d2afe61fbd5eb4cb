// crates/l1menu-cli/src/main.rs

//! Reads a trigger menu XML file and prints it back in canonical form.
//!
//! ```bash
//! l1menu L1Menu_Collisions2018.xml > canonical.xml
//! l1menu --strict -v L1Menu_Collisions2018.xml
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use l1menu::{MenuError, ReadOptions, load_menu_from_file, save_menu_to_writer};
use log::{error, info};

/// Round-trips a Level-1 trigger menu through the XML codec.
#[derive(Parser)]
#[command(name = "l1menu")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Menu XML file to read
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Fail on absent elements instead of reading them as empty
    #[arg(long)]
    strict: bool,

    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:?} failure on {}", e.category(), cli.file.display());
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), MenuError> {
    let options = ReadOptions {
        require_fields: cli.strict,
    };
    let menu = load_menu_from_file(&cli.file, &options)?;
    info!(
        "Loaded '{}' ({} algorithms) from {}",
        menu.name,
        menu.algorithms.len(),
        cli.file.display()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    save_menu_to_writer(&menu, &mut out)?;
    out.flush()?;
    Ok(())
}

// src/cli/main.rs

use licensor::commands::{execute_command, parse_command, Command, USAGE};
use licensor::config::init_config;
use licensor::errors::LicenseResult;
use licensor::logging::init_logging;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if let Err(e) = run(&args) {
        eprintln!("error [{}]: {e}", e.kind());
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> LicenseResult<()> {
    let cmd = parse_command(args).inspect_err(|_| eprintln!("{USAGE}"))?;

    // Keygen and help need no configured keys.
    if matches!(cmd, Command::Keygen { .. } | Command::Help) {
        println!("{}", execute_command(cmd, &Default::default())?);
        return Ok(());
    }

    let config = init_config()?;
    init_logging(&config.logging);

    println!("{}", execute_command(cmd, &config.keys)?);
    Ok(())
}

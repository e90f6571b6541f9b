/// Cadence CLI
///
/// Reads line sources and timed tick sources through the process
/// interpreters, and prints the effective configuration.

use cadence_core::cli;

fn main() {
    if let Err(e) = cli::run_cli() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

//! tagtext - render extended markdown with inline tags to HTML

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = tagtext_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

use KiMech::cli::cli_main::run_from_args;
use std::process::ExitCode;

pub fn main() -> ExitCode {
    match run_from_args() {
        Ok(report) => {
            println!(
                "{} scenarios simulated, {} failed, {} plots written",
                report.initial.scenarios,
                report.initial.failed.len(),
                report.initial.plots.len()
            );
            if let Some(modified) = report.modified {
                println!(
                    "after parameter changes: {} failed, {} plots written",
                    modified.failed.len(),
                    modified.plots.len()
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

use std::process::ExitCode;

use groupnotes::ui::output;

fn main() -> ExitCode {
    match groupnotes::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

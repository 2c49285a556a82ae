use std::process::ExitCode;

fn main() -> ExitCode {
    match sea_ice_history::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

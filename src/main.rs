use std::process::ExitCode;

fn main() -> ExitCode {
    match rescuetime_export::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("rtx: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

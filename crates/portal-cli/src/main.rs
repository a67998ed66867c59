use std::process::ExitCode;

fn main() -> ExitCode {
    match portal_admin::run(std::env::args_os().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("portal: {err:#}");
            ExitCode::FAILURE
        }
    }
}

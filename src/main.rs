use std::process::ExitCode;

fn main() -> ExitCode {
    callmap::cli::run()
}

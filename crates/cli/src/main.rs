use std::process::ExitCode;

fn main() -> ExitCode {
    nippo_cli::run()
}

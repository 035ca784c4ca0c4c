use std::process::ExitCode;

fn main() -> ExitCode {
    docgenie::cli::run()
}

use std::process::ExitCode;

fn main() -> ExitCode {
    dropcart_cli::run()
}

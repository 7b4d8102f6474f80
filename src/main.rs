use clap::Parser;
use flintsteel::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}

use clap::Parser;
use satscope::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}

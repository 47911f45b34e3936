use clap::Parser;
use downsort::cli::{self, Args};
use std::process;

fn main() {
    let args = Args::parse();

    if let Err(e) = cli::run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

mod cli;

use clap::Parser;
use cli::Cli;

fn main() {
    env_logger::init();

    if let Err(e) = Cli::parse().run() {
        log::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

// main.rs
use clap::Parser;
use pokedeck::cli::{self, Args};
use pokedeck::logging;

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    if let Err(e) = cli::run(args) {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

// src/main.rs

use clap::Parser;
use member_atlas::cli::{self, Cli};
use member_atlas::lifecycle;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    lifecycle::init_logging(cli.verbose);

    if let Err(e) = cli::run(cli).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

//! vmfleet CLI - Bulk lifecycle operations for managed VM fleets

use clap::Parser;

use vmfleet::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

//! roci-stream CLI binary entry point.

use clap::Parser;
use roci_stream::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    roci_stream::cli::init_logging(cli.log.as_deref());

    let result = match cli.command {
        Commands::Replay(args) => roci_stream::cli::replay::handle_replay(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

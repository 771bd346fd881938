use clap::Parser;
use tracing::error;

use leaderboard::cli::Cli;
use leaderboard::collectors::CollectorRegistry;
use leaderboard::logging::init_subscriber;
use leaderboard::runner::{ensure_data_dir, run};

#[tokio::main]
async fn main() {
    // Tokens for config substitution may live in a local .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_subscriber(cli.debug);

    let options = cli.run_options();
    let registry = CollectorRegistry::with_defaults();

    let result = match ensure_data_dir(&options.data_dir) {
        Ok(()) => run(&options, &registry).await,
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        error!("{err}");
        std::process::exit(err.exit_code());
    }
}

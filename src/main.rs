use clap::Parser;
use std::process::ExitCode;
use tracing::error;
use weka_event_logger::{app, config, utils::logging};

#[derive(Parser)]
#[command(name = "weka-event-logger")]
#[command(about = "Poll a WEKA cluster for events and append them to a rotating log", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose mode
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let path = config::config_path();
    let config = match config::Config::load(&path) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}, exiting");
            return ExitCode::FAILURE;
        }
    };

    match app::run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}, exiting");
            ExitCode::FAILURE
        }
    }
}

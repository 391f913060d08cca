use std::sync::Arc;

use clap::Parser;
use mplus_tracker::client::RaiderIoClient;
use mplus_tracker::config::{Cli, Settings};
use mplus_tracker::{Error, logging, tui};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    let settings = Settings::from(cli);

    logging::init(settings.log_file.as_deref())?;
    tracing::debug!(?settings, "resolved settings");

    let client = RaiderIoClient::new(settings.clone())?;
    tui::run(&settings, Arc::new(client))
}

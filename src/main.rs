use std::fs::File;
use std::process::ExitCode;

use clap::Parser;
use kobo::cli::{self, Cli};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to kobo.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("kobo.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    log::info!("kobo starting up");

    if cli::run(cli).await {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

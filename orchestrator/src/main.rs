use std::process::ExitCode;

use clap::Parser;

use common::{log_error, log_info};
use orchestrator::{
    args::{Cli, Command},
    decode,
};

fn main() -> ExitCode {
    orchestrator::logging::init_logging();

    let cli = Cli::parse();
    log_info!("Starting the orchestrator");

    let result = match &cli.command {
        Command::Decode(args) => decode::run(args).map(|_| ()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log_error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

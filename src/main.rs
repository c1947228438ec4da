// src/main.rs

use runmon::config::RunConfig;
use runmon::engine::ExitReason;
use runmon::{logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(ExitReason::Completed) => {}
        Ok(reason) => std::process::exit(reason.exit_code()),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> runmon::errors::Result<ExitReason> {
    let config = RunConfig::from_args(std::env::args_os())?;
    logging::init_logging()?;
    run(config).await
}

use avd_core::logging;

mod service;

use crate::service::Service;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible; fall back to stderr if the
    // state dir is unwritable.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = Service::run_from_args().await {
        eprintln!("avd error: {:#}", err);
        std::process::exit(1);
    }
}

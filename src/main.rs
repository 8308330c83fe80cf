use SpinTriangle::modules::app::App;
use SpinTriangle::modules::config::AppConfig;
use SpinTriangle::modules::logging::{LoggingConfig, init_logging};
use anyhow::{Context, Result};

fn main() {
    init_logging(LoggingConfig::default());

    // run() returns only after the window and GPU state are dropped
    if let Err(e) = run() {
        log::error!("{e:#}");
        std::process::exit(-1);
    }
}

fn run() -> Result<()> {
    App::run(AppConfig::default()).context("startup failed")
}

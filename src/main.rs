use anyhow::Context;
use std::process::exit;
use testsuite_rs::config::{ConfigurationProvider, EnvConfiguration};
use testsuite_rs::logging::init_logging;
use testsuite_rs::report::ConsoleSink;
use testsuite_rs::Runner;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        exit(2);
    }
}

fn run() -> anyhow::Result<()> {
    let configuration = EnvConfiguration
        .configuration()
        .context("Failed to read configuration")?;
    init_logging(configuration.log_level, configuration.log_file.as_deref())
        .context("Failed to initialize logging")?;
    log::debug!("Loaded configuration {:#?}", configuration);

    let summary = Runner::with_provider(configuration)
        .sink(ConsoleSink)
        .handle_interrupts(true)
        .invoke()
        .context("Test run failed")?;

    exit(summary.exit_code());
}

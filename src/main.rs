use insight_agents::{Config, cli, log_error, logger, ui};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();

    // A broken config file is reported again when a command loads it
    let telemetry = Config::load().is_ok_and(|config| config.telemetry.enabled);
    if let Err(e) = logger::init(telemetry) {
        eprintln!("Warning: {e}");
    }

    if let Err(e) = cli::main().await {
        log_error!("{e:#}");
        ui::print_error(&format!("Error: {e:#}"));
        std::process::exit(1);
    }
}

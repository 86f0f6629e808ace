use anyhow::Result;
use clap::Parser;
use tiny_bank::{
    bin_utils::{Service, config::Config},
    repository::json_file::JsonFileRepository,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let config = Config::parse();

    // stdout belongs to the menu
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let service = Service {
        input: std::io::stdin().lock(),
        output: &mut std::io::stdout(),
        repository: JsonFileRepository::new(&config.data_file),
        address_lookup: config.address_lookup(),
        limits: config.limits(),
    };
    service.run()?;
    Ok(())
}

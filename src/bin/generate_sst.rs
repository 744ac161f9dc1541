use sst_pipeline::config::{Config, DEFAULT_CONFIG_PATH};
use sst_pipeline::generator::SstGenerator;
use sst_pipeline::logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = Config::from_file_or_default(DEFAULT_CONFIG_PATH)?;
    let output = config.generator().output.clone();

    let mut generator = SstGenerator::new(config.generator().clone())?;
    let summary = generator.generate(&output)?;
    tracing::info!("dataset written: {}", summary);

    println!(
        "Sample SST NetCDF file created as '{}'",
        summary.path.display()
    );

    Ok(())
}

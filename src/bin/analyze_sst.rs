use sst_pipeline::analyzer::Analyzer;
use sst_pipeline::config::{Config, DEFAULT_CONFIG_PATH};
use sst_pipeline::logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = Config::from_file_or_default(DEFAULT_CONFIG_PATH)?;

    let analyzer = Analyzer::new(config.analyzer().clone())?;
    let report = analyzer.run()?;

    println!("{}", report);

    Ok(())
}

use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal, NormalError};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cf_time::TimeUnits;
use crate::config::{ConfigError, GeneratorConfig};
use crate::grid::Grid;
use crate::writers::{DatasetAttributes, NcWriter, WriteError};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid distribution: {0}")]
    Distribution(#[from] NormalError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

#[derive(Debug, Clone)]
pub struct GenerationSummary {
    pub path: PathBuf,
    pub shape: (usize, usize, usize),
    pub sample_mean: f64,
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (time: {}, lat: {}, lon: {}), sample mean {:.3}",
            self.path.display(),
            self.shape.0,
            self.shape.1,
            self.shape.2,
            self.sample_mean
        )
    }
}

/// Synthesizes a normally distributed SST field over a global grid.
pub struct SstGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl SstGenerator {
    /// Seeded from `config.seed` when present, from the OS otherwise.
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerateError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self { config, rng })
    }

    pub fn grid(&self) -> Grid {
        Grid::from_config(&self.config)
    }

    pub fn attributes(&self) -> DatasetAttributes {
        DatasetAttributes {
            variable: "sst".to_string(),
            units: "degC".to_string(),
            long_name: "sea surface temperature".to_string(),
            description: self.config.description.clone(),
            time_units: TimeUnits::days_since(self.config.start_date),
        }
    }

    /// Writes the dataset to `path`, one time step at a time.
    pub fn generate<P: AsRef<Path>>(&mut self, path: P) -> Result<GenerationSummary, GenerateError> {
        let grid = self.grid();
        let (nt, ny, nx) = grid.shape();
        let normal = Normal::new(self.config.mean, self.config.std_dev)?;

        tracing::info!(
            path = %path.as_ref().display(),
            time = nt,
            lat = ny,
            lon = nx,
            "generating synthetic SST"
        );

        let mut writer = NcWriter::create(path, &grid, &self.attributes())?;

        let mut total = 0.0;
        for t in 0..nt {
            let slab = Array2::from_shape_simple_fn((ny, nx), || normal.sample(&mut self.rng));
            total += slab.sum();
            writer.write_time_slab(t, &slab)?;
        }

        let sample_mean = if grid.is_empty() {
            f64::NAN
        } else {
            total / grid.len() as f64
        };

        Ok(GenerationSummary {
            path: writer.path().to_path_buf(),
            shape: grid.shape(),
            sample_mean,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeStep;
    use chrono::NaiveDate;

    fn small_config(seed: Option<u64>) -> GeneratorConfig {
        GeneratorConfig {
            start_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2000, 2, 29).unwrap(),
            frequency: TimeStep::Daily,
            n_lat: 6,
            n_lon: 12,
            seed,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = GeneratorConfig {
            std_dev: f64::NAN,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            SstGenerator::new(config),
            Err(GenerateError::Config(ConfigError::StdDev(_)))
        ));
    }

    #[test]
    fn test_grid_and_attributes() {
        let generator = SstGenerator::new(small_config(Some(1))).unwrap();
        assert_eq!(generator.grid().shape(), (60, 6, 12));

        let attrs = generator.attributes();
        assert_eq!(attrs.variable, "sst");
        assert_eq!(attrs.description, "Synthetic Sea Surface Temperature data");
        assert_eq!(attrs.time_units.to_string(), "days since 2000-01-01 00:00:00");
    }

    #[test]
    fn test_unwritable_path_fails() {
        let mut generator = SstGenerator::new(small_config(Some(1))).unwrap();
        let result = generator.generate("/nonexistent-dir/for/sure/sst.nc");
        assert!(matches!(result, Err(GenerateError::Write(_))));
    }
}

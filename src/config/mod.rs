use chrono::{Duration, Months, NaiveDate};

use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::bbox::Bbox;
use crate::chunks::ChunkSpec;

pub mod error;
pub use error::ConfigError;

pub mod time_step;
pub use time_step::TimeStep;

pub const DEFAULT_CONFIG_PATH: &str = "./data/config/sst_config.json";
pub const DEFAULT_DATA_FILE: &str = "sst_data.nc";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Settings of the synthetic dataset generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub output: PathBuf,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub frequency: TimeStep,
    pub n_lat: usize,
    pub n_lon: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub seed: Option<u64>,
    pub description: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_DATA_FILE),
            start_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2000, 12, 31).unwrap_or_default(),
            frequency: TimeStep::Daily,
            n_lat: 180,
            n_lon: 360,
            mean: 15.0,
            std_dev: 10.0,
            seed: None,
            description: "Synthetic Sea Surface Temperature data".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_date > self.end_date {
            return Err(ConfigError::DateOrder);
        }
        if self.n_lat == 0 || self.n_lon == 0 {
            return Err(ConfigError::GridSize);
        }
        if !self.mean.is_finite() {
            return Err(ConfigError::Mean(self.mean));
        }
        if !self.std_dev.is_finite() || self.std_dev < 0.0 {
            return Err(ConfigError::StdDev(self.std_dev));
        }
        Ok(())
    }

    /// Dates from `start_date` to `end_date` inclusive, stepping by `frequency`.
    pub fn dates(&self) -> DateRange {
        DateRange {
            current: self.start_date,
            end: self.end_date,
            frequency: self.frequency,
        }
    }
}

/// Settings of the analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    pub input: PathBuf,
    pub variable: String,
    pub chunks: ChunkSpec,
    pub bbox: Bbox,
    pub point: GeoPoint,
    pub month: u32,
    pub output_dir: PathBuf,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_DATA_FILE),
            variable: "sst".to_string(),
            chunks: ChunkSpec::default(),
            bbox: Bbox::default(),
            point: GeoPoint {
                lat: 30.0,
                lon: 160.0,
            },
            month: 1,
            output_dir: PathBuf::from("."),
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.chunks.is_valid() {
            return Err(ConfigError::ChunkSize);
        }
        if !(1..=12).contains(&self.month) {
            return Err(ConfigError::Month(self.month));
        }
        Bbox::new(self.bbox.xmin, self.bbox.xmax, self.bbox.ymin, self.bbox.ymax)
            .map_err(ConfigError::Bbox)?;
        if !(-90.0..=90.0).contains(&self.point.lat) {
            return Err(ConfigError::Point(self.point.lat));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    generator: GeneratorConfig,
    analyzer: AnalyzerConfig,
}

// Every field is optional and falls back to the defaults above; whatever is
// present is validated before a Config is handed out.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize, Default)]
        #[serde(default)]
        struct ConfigHelper {
            generator: GeneratorHelper,
            analyzer: AnalyzerHelper,
        }

        #[derive(Deserialize, Default)]
        #[serde(default)]
        struct GeneratorHelper {
            output: Option<PathBuf>,
            start_date: Option<String>,
            end_date: Option<String>,
            frequency: Option<String>,
            n_lat: Option<usize>,
            n_lon: Option<usize>,
            mean: Option<f64>,
            std_dev: Option<f64>,
            seed: Option<u64>,
            description: Option<String>,
        }

        #[derive(Deserialize, Default)]
        #[serde(default)]
        struct AnalyzerHelper {
            input: Option<PathBuf>,
            variable: Option<String>,
            chunks: Option<ChunkSpec>,
            bbox: Option<BboxHelper>,
            point: Option<GeoPoint>,
            month: Option<u32>,
            output_dir: Option<PathBuf>,
        }

        #[derive(Deserialize)]
        struct BboxHelper {
            xmin: f64,
            xmax: f64,
            ymin: f64,
            ymax: f64,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;
        let defaults = GeneratorConfig::default();
        let g = helper.generator;

        let parse_date = |value: Option<String>, fallback: NaiveDate, field: &str| {
            match value {
                Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map_err(|e| D::Error::custom(format!("Invalid {} format: {}", field, e))),
                None => Ok(fallback),
            }
        };

        let start_date = parse_date(g.start_date, defaults.start_date, "start_date")?;
        let end_date = parse_date(g.end_date, defaults.end_date, "end_date")?;

        let frequency = match g.frequency {
            Some(s) => s
                .parse::<TimeStep>()
                .map_err(|e| D::Error::custom(ConfigError::from(e)))?,
            None => defaults.frequency,
        };

        let generator = GeneratorConfig {
            output: g.output.unwrap_or(defaults.output),
            start_date,
            end_date,
            frequency,
            n_lat: g.n_lat.unwrap_or(defaults.n_lat),
            n_lon: g.n_lon.unwrap_or(defaults.n_lon),
            mean: g.mean.unwrap_or(defaults.mean),
            std_dev: g.std_dev.unwrap_or(defaults.std_dev),
            seed: g.seed,
            description: g.description.unwrap_or(defaults.description),
        };
        generator.validate().map_err(D::Error::custom)?;

        let defaults = AnalyzerConfig::default();
        let a = helper.analyzer;

        let bbox = match a.bbox {
            Some(b) => Bbox::new(b.xmin, b.xmax, b.ymin, b.ymax)
                .map_err(|e| D::Error::custom(format!("Invalid bbox: {}", e)))?,
            None => defaults.bbox,
        };

        let analyzer = AnalyzerConfig {
            input: a.input.unwrap_or(defaults.input),
            variable: a.variable.unwrap_or(defaults.variable),
            chunks: a.chunks.unwrap_or(defaults.chunks),
            bbox,
            point: a.point.unwrap_or(defaults.point),
            month: a.month.unwrap_or(defaults.month),
            output_dir: a.output_dir.unwrap_or(defaults.output_dir),
        };
        analyzer.validate().map_err(D::Error::custom)?;

        Ok(Config {
            generator,
            analyzer,
        })
    }
}

impl Config {
    pub fn new(generator: GeneratorConfig, analyzer: AnalyzerConfig) -> Result<Self, ConfigError> {
        generator.validate()?;
        analyzer.validate()?;
        Ok(Self {
            generator,
            analyzer,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Loads `path` when it exists, otherwise returns the built-in defaults.
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!(path = %path.display(), "loading configuration");
            Self::from_file(path)
        } else {
            tracing::info!(path = %path.display(), "no configuration file, using defaults");
            Ok(Config::default())
        }
    }

    pub fn generator(&self) -> &GeneratorConfig {
        &self.generator
    }

    pub fn analyzer(&self) -> &AnalyzerConfig {
        &self.analyzer
    }
}

/// Iterator over the dates of a [`GeneratorConfig`].
#[derive(Debug, Clone)]
pub struct DateRange {
    current: NaiveDate,
    end: NaiveDate,
    frequency: TimeStep,
}

impl DateRange {
    fn increment_date(&self, current_date: NaiveDate) -> Result<NaiveDate, String> {
        match self.frequency {
            TimeStep::Daily => Ok(current_date + Duration::days(1)),
            TimeStep::Weekly => Ok(current_date + Duration::weeks(1)),
            TimeStep::Monthly => current_date
                .checked_add_months(Months::new(1))
                .ok_or_else(|| format!("Failed to add a month to date: {}", current_date)),
        }
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current <= self.end {
            let current_date = self.current;
            self.current = self.increment_date(self.current).ok()?;
            Some(current_date)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("Invalid date")
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.json");
        let mut file = File::create(&file_path).unwrap();

        let config_data = r#"
    {
        "generator": {
            "start_date": "2001-01-01",
            "end_date": "2001-01-10",
            "frequency": "daily",
            "n_lat": 4,
            "n_lon": 8,
            "seed": 42
        },
        "analyzer": {
            "chunks": { "time": 3, "lat": 4, "lon": 8 },
            "bbox": { "xmin": 0, "xmax": 180, "ymin": -45, "ymax": 45 },
            "month": 2
        }
    }
    "#;

        file.write_all(config_data.as_bytes()).unwrap();

        let config = Config::from_file(file_path).unwrap();
        let generator = config.generator();

        assert_eq!(generator.frequency, TimeStep::Daily);
        assert_eq!(generator.start_date, date(2001, 1, 1));
        assert_eq!(generator.end_date, date(2001, 1, 10));
        assert_eq!(generator.seed, Some(42));
        assert_eq!((generator.n_lat, generator.n_lon), (4, 8));
        // Unset fields keep their defaults
        assert_eq!(generator.mean, 15.0);

        let analyzer = config.analyzer();
        assert_eq!(analyzer.chunks.time, 3);
        assert_eq!(analyzer.month, 2);
        assert_eq!(analyzer.bbox.ymax, 45.0);
        assert_eq!(analyzer.variable, "sst");
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.analyzer().point, GeoPoint { lat: 30.0, lon: 160.0 });
        assert_eq!(config.generator().output, PathBuf::from("sst_data.nc"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let cases = [
            r#"{ "generator": { "start_date": "2000-02-01", "end_date": "2000-01-01" } }"#,
            r#"{ "generator": { "start_date": "01/02/2000" } }"#,
            r#"{ "generator": { "frequency": "hourly" } }"#,
            r#"{ "generator": { "n_lat": 0 } }"#,
            r#"{ "generator": { "std_dev": -1.0 } }"#,
            r#"{ "analyzer": { "chunks": { "time": 0, "lat": 1, "lon": 1 } } }"#,
            r#"{ "analyzer": { "month": 13 } }"#,
            r#"{ "analyzer": { "bbox": { "xmin": 250, "xmax": 120, "ymin": 10, "ymax": 50 } } }"#,
            r#"{ "analyzer": { "point": { "lat": 95, "lon": 0 } } }"#,
        ];

        for case in cases {
            assert!(serde_json::from_str::<Config>(case).is_err(), "accepted: {}", case);
        }
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::from_file_or_default(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());

        assert!(matches!(
            Config::from_file(dir.path().join("absent.json")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_date_range_daily_covers_leap_year() {
        let dates: Vec<NaiveDate> = GeneratorConfig::default().dates().collect();
        assert_eq!(dates.len(), 366);
        assert_eq!(dates[0], date(2000, 1, 1));
        assert_eq!(dates[59], date(2000, 2, 29));
        assert_eq!(dates[365], date(2000, 12, 31));
    }

    #[test]
    fn test_date_range_weekly_and_monthly() {
        let mut generator = GeneratorConfig {
            start_date: date(2023, 1, 31),
            end_date: date(2023, 4, 30),
            frequency: TimeStep::Monthly,
            ..GeneratorConfig::default()
        };

        let monthly: Vec<NaiveDate> = generator.dates().collect();
        // February 31st does not exist, falls back to the 28th and stays there
        assert_eq!(
            monthly,
            vec![date(2023, 1, 31), date(2023, 2, 28), date(2023, 3, 28), date(2023, 4, 28)]
        );

        generator.frequency = TimeStep::Weekly;
        generator.end_date = date(2023, 2, 14);
        let weekly: Vec<NaiveDate> = generator.dates().collect();
        assert_eq!(weekly, vec![date(2023, 1, 31), date(2023, 2, 7), date(2023, 2, 14)]);
    }

    #[test]
    fn test_config_new_validates() {
        let analyzer = AnalyzerConfig {
            month: 0,
            ..AnalyzerConfig::default()
        };
        assert!(matches!(
            Config::new(GeneratorConfig::default(), analyzer),
            Err(ConfigError::Month(0))
        ));
    }
}

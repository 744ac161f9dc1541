use chrono::NaiveDateTime;

use crate::config::GeneratorConfig;
use crate::date_gen::DateTimeGenerator;

/// `n` evenly spaced values over `[start, stop]`, both ends included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Coordinate axes of a (time, lat, lon) dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    time: Vec<NaiveDateTime>,
    lat: Vec<f64>,
    lon: Vec<f64>,
}

impl Grid {
    pub fn new(time: Vec<NaiveDateTime>, lat: Vec<f64>, lon: Vec<f64>) -> Self {
        Self { time, lat, lon }
    }

    /// Global grid: latitude over [-90, 90], longitude over [0, 360], time from
    /// the configured date series.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        let time = DateTimeGenerator::new(config.clone()).generate_datetime_series();

        Self {
            time,
            lat: linspace(-90.0, 90.0, config.n_lat),
            lon: linspace(0.0, 360.0, config.n_lon),
        }
    }

    pub fn time(&self) -> &[NaiveDateTime] {
        &self.time
    }

    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// (time, lat, lon)
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.time.len(), self.lat.len(), self.lon.len())
    }

    pub fn len(&self) -> usize {
        let (t, y, x) = self.shape();
        t * y * x
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

use chrono::{Month, NaiveDate};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::{AnalyzerConfig, ConfigError};
use crate::lazy::{GroupKey, GroupedField, LazyField, Map2, SelectionError, Series};
use crate::plot::{PlotError, PlotStyle, plot_map, plot_series};
use crate::readers::{DataReader, NcReader, ReadError};
use crate::utils::FieldStats;

pub const MAP_FILE: &str = "monthly_mean_sst.png";
pub const SERIES_FILE: &str = "yearly_mean_sst_point.png";

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Plot(#[from] PlotError),
    #[error("Failed to create output directory: {0}")]
    Io(#[from] std::io::Error),
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub region_shape: (usize, usize, usize),
    pub month_stats: FieldStats,
    pub point: (f64, f64),
    pub point_in_region: bool,
    /// Yearly means stamped at the end of each year.
    pub yearly: Vec<(NaiveDate, f64)>,
    pub map_path: PathBuf,
    pub series_path: PathBuf,
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Region (time, lat, lon): ({}, {}, {})",
            self.region_shape.0, self.region_shape.1, self.region_shape.2
        )?;
        writeln!(f, "Monthly mean grid:\n{}", self.month_stats)?;
        write!(f, "Nearest grid point: lat={:.3}, lon={:.3}", self.point.0, self.point.1)?;
        if !self.point_in_region {
            write!(f, " (requested point lies outside the region)")?;
        }
        writeln!(f)?;
        for (date, value) in &self.yearly {
            writeln!(f, "  {}: {:.3}", date, value)?;
        }
        write!(
            f,
            "Plots: {}, {}",
            self.map_path.display(),
            self.series_path.display()
        )
    }
}

/// Products of the analysis before anything is drawn.
pub struct Products {
    pub region_shape: (usize, usize, usize),
    /// Whether the requested point falls inside the configured bbox; when it
    /// does not, the series comes from the nearest cell on the region edge.
    pub point_in_region: bool,
    pub monthly: GroupedField,
    pub month_map: Map2,
    pub yearly: GroupedField,
    pub point_series: Series,
}

pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self, AnalyzeError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Opens the configured file, prints its metadata, computes and plots.
    pub fn run(&self) -> Result<AnalysisReport, AnalyzeError> {
        let reader = NcReader::open(&self.config.input, &self.config.variable)?;

        let info = reader.info().clone().with_chunks(self.config.chunks);
        println!("{}", info);
        if let Some(variable) = info.variable(&self.config.variable) {
            println!("{}", variable);
        }

        let products = self.compute(&reader)?;
        self.render(products)
    }

    /// Region subset, monthly climatology and yearly mean at the configured point.
    pub fn compute<R: DataReader + ?Sized>(&self, reader: &R) -> Result<Products, AnalyzeError> {
        let field = LazyField::new(reader, self.config.chunks);

        let region = field.sel_region(&self.config.bbox)?;
        tracing::info!(shape = ?region.shape(), bbox = ?self.config.bbox, "selected region");

        let monthly = region.groupby(GroupKey::Month).mean().compute()?;
        tracing::info!(key = monthly.key.name(), labels = ?monthly.labels, "computed monthly climatology");
        let month_map = monthly.sel_label(self.config.month as i32)?;

        let yearly = region.resample_yearly().mean().compute()?;
        tracing::info!(key = yearly.key.name(), labels = ?yearly.labels, "computed yearly mean");
        let point = self.config.point;
        let point_in_region = self.config.bbox.contains(point.lat, point.lon);
        if !point_in_region {
            tracing::warn!(lat = point.lat, lon = point.lon, "point lies outside the region, using the nearest edge cell");
        }
        let point_series = yearly.sel_nearest(point.lat, point.lon)?;

        Ok(Products {
            region_shape: region.shape(),
            point_in_region,
            monthly,
            month_map,
            yearly,
            point_series,
        })
    }

    fn render(&self, products: Products) -> Result<AnalysisReport, AnalyzeError> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let month_name = Month::try_from(self.config.month as u8)
            .map(|m| m.name().to_string())
            .unwrap_or_else(|_| self.config.month.to_string());

        let map_path = self.config.output_dir.join(MAP_FILE);
        let map_style = PlotStyle::new(
            format!("Monthly Mean Sea Surface Temperature ({})", month_name),
            "Longitude",
            "Latitude",
        );
        plot_map(&products.month_map, &map_style, &map_path)?;

        let point = self.config.point;
        let series_path = self.config.output_dir.join(SERIES_FILE);
        let series_style = PlotStyle::new(
            format!("Yearly Mean SST at (lat={}, lon={})", point.lat, point.lon),
            "Year",
            "Sea Surface Temperature (°C)",
        );
        plot_series(&products.point_series, &series_style, &series_path)?;

        let series = &products.point_series;
        Ok(AnalysisReport {
            region_shape: products.region_shape,
            month_stats: FieldStats::from_values(products.month_map.values.iter().copied()),
            point: (series.lat, series.lon),
            point_in_region: products.point_in_region,
            yearly: series.dates.iter().copied().zip(series.values.iter().copied()).collect(),
            map_path,
            series_path,
        })
    }
}

//! PNG rendering of the analysis products.

pub mod colormap;

use plotters::prelude::*;
use std::fmt::Display;
use std::path::Path;
use thiserror::Error;

use crate::lazy::{Map2, Series};
use colormap::coolwarm_scaled;

const COLORBAR_STEPS: usize = 128;

#[derive(Debug, Error, PartialEq)]
pub enum PlotError {
    #[error("Nothing to plot: {0} has no finite values")]
    Empty(String),
    #[error("Failed to render plot: {0}")]
    Render(String),
}

fn render<E: Display>(e: E) -> PlotError {
    PlotError::Render(e.to_string())
}

#[derive(Debug, Clone)]
pub struct PlotStyle {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Pixels; 10 x 6 inches at 100 dpi by default.
    pub size: (u32, u32),
}

impl PlotStyle {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            size: (1000, 600),
        }
    }
}

/// Smallest and largest finite values, widened when they coincide.
fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if lo > hi {
        return None;
    }
    if hi - lo < f64::EPSILON {
        return Some((lo - 0.5, hi + 0.5));
    }
    Some((lo, hi))
}

/// Cell boundaries around each coordinate, halfway between neighbours.
fn cell_edges(coords: &[f64]) -> Vec<f64> {
    match coords.len() {
        0 => Vec::new(),
        1 => vec![coords[0] - 0.5, coords[0] + 0.5],
        n => {
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(coords[0] - (coords[1] - coords[0]) / 2.0);
            for pair in coords.windows(2) {
                edges.push((pair[0] + pair[1]) / 2.0);
            }
            edges.push(coords[n - 1] + (coords[n - 1] - coords[n - 2]) / 2.0);
            edges
        }
    }
}

/// Color map of a (lat, lon) grid with a colorbar on the right.
pub fn plot_map(map: &Map2, style: &PlotStyle, path: &Path) -> Result<(), PlotError> {
    let (vmin, vmax) =
        finite_range(map.values.iter().copied()).ok_or_else(|| PlotError::Empty(map.name.clone()))?;

    let lat_edges = cell_edges(&map.lat);
    let lon_edges = cell_edges(&map.lon);
    let (x_lo, x_hi) = (lon_edges[0].min(lon_edges[map.lon.len()]), lon_edges[0].max(lon_edges[map.lon.len()]));
    let (y_lo, y_hi) = (lat_edges[0].min(lat_edges[map.lat.len()]), lat_edges[0].max(lat_edges[map.lat.len()]));

    let root = BitMapBackend::new(path, style.size).into_drawing_area();
    root.fill(&WHITE).map_err(render)?;
    let bar_left = (style.size.0 as i32 - 130).max(1);
    let (plot_area, bar_area) = root.split_horizontally(bar_left);

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(&style.title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(render)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(style.x_label.as_str())
        .y_desc(style.y_label.as_str())
        .draw()
        .map_err(render)?;

    let cells = map.values.indexed_iter().filter(|(_, v)| v.is_finite()).map(|((i, j), &v)| {
        Rectangle::new(
            [(lon_edges[j], lat_edges[i]), (lon_edges[j + 1], lat_edges[i + 1])],
            coolwarm_scaled(v, vmin, vmax).filled(),
        )
    });
    chart.draw_series(cells).map_err(render)?;

    let mut bar = ChartBuilder::on(&bar_area)
        .margin_top(50)
        .margin_bottom(60)
        .margin_right(15)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..1.0, vmin..vmax)
        .map_err(render)?;

    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc(map.name.as_str())
        .draw()
        .map_err(render)?;

    let step = (vmax - vmin) / COLORBAR_STEPS as f64;
    bar.draw_series((0..COLORBAR_STEPS).map(|k| {
        let lo = vmin + step * k as f64;
        Rectangle::new([(0.0, lo), (1.0, lo + step)], coolwarm_scaled(lo + step / 2.0, vmin, vmax).filled())
    }))
    .map_err(render)?;

    root.present().map_err(render)?;
    tracing::info!(path = %path.display(), "wrote map plot");

    Ok(())
}

/// Line plot with circle markers of a per-label series.
pub fn plot_series(series: &Series, style: &PlotStyle, path: &Path) -> Result<(), PlotError> {
    let points: Vec<(f64, f64)> = series
        .labels
        .iter()
        .zip(&series.values)
        .filter(|(_, v)| v.is_finite())
        .map(|(&label, &v)| (label as f64, v))
        .collect();

    let (x_min, x_max) =
        finite_range(points.iter().map(|p| p.0)).ok_or_else(|| PlotError::Empty(series.name.clone()))?;
    let (y_min, y_max) =
        finite_range(points.iter().map(|p| p.1)).ok_or_else(|| PlotError::Empty(series.name.clone()))?;
    let y_pad = ((y_max - y_min) * 0.1).max(0.5);

    let root = BitMapBackend::new(path, style.size).into_drawing_area();
    root.fill(&WHITE).map_err(render)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&style.title, ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(65)
        .build_cartesian_2d(x_min - 0.5..x_max + 0.5, y_min - y_pad..y_max + y_pad)
        .map_err(render)?;

    chart
        .configure_mesh()
        .x_desc(style.x_label.as_str())
        .y_desc(style.y_label.as_str())
        .x_labels(points.len().clamp(2, 12))
        .x_label_formatter(&|x| format!("{:.0}", x))
        .draw()
        .map_err(render)?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
        .map_err(render)?;
    chart
        .draw_series(points.iter().map(|&p| Circle::new(p, 5, BLUE.filled())))
        .map_err(render)?;

    root.present().map_err(render)?;
    tracing::info!(path = %path.display(), points = points.len(), "wrote series plot");

    Ok(())
}

//! Deferred, chunk-by-chunk evaluation over a [`DataReader`].
//!
//! Selections and reductions only record what to compute. Data is read when
//! `compute` is called, one chunk block at a time, so peak memory is one block
//! plus the (much smaller) reduced output.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use ndarray::{Array2, Array3, Axis, Zip, s};
use std::collections::BTreeMap;
use std::ops::Range;
use thiserror::Error;

use crate::bbox::Bbox;
use crate::chunks::{ChunkSpec, Selection};
use crate::readers::{DataReader, ReadError};
use crate::select::{nearest_cell, slice_indices};

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("Selection {lo}..={hi} on {axis} matches no grid points")]
    Empty { axis: &'static str, lo: f64, hi: f64 },
    #[error("No group labelled {0}")]
    MissingLabel(i32),
    #[error("Cannot select a nearest point on an empty grid")]
    EmptyGrid,
}

/// Calendar unit used to group timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// Calendar month, 1..=12, across all years.
    Month,
    /// Calendar year.
    Year,
}

impl GroupKey {
    pub fn label(&self, time: &NaiveDateTime) -> i32 {
        match self {
            GroupKey::Month => time.month() as i32,
            GroupKey::Year => time.year(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GroupKey::Month => "month",
            GroupKey::Year => "year",
        }
    }
}

/// A not-yet-read view of one variable.
pub struct LazyField<'r, R: DataReader + ?Sized> {
    reader: &'r R,
    selection: Selection,
    chunks: ChunkSpec,
}

impl<'r, R: DataReader + ?Sized> Clone for LazyField<'r, R> {
    fn clone(&self) -> Self {
        Self {
            reader: self.reader,
            selection: self.selection.clone(),
            chunks: self.chunks,
        }
    }
}

impl<'r, R: DataReader + ?Sized> LazyField<'r, R> {
    pub fn new(reader: &'r R, chunks: ChunkSpec) -> Self {
        Self {
            reader,
            selection: Selection::full(reader.grid().shape()),
            chunks,
        }
    }

    pub fn name(&self) -> &str {
        self.reader.variable()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        self.selection.shape()
    }

    pub fn time(&self) -> &[NaiveDateTime] {
        &self.reader.grid().time()[self.selection.time.clone()]
    }

    pub fn lat(&self) -> &[f64] {
        &self.reader.grid().lat()[self.selection.lat.clone()]
    }

    pub fn lon(&self) -> &[f64] {
        &self.reader.grid().lon()[self.selection.lon.clone()]
    }

    /// Keeps the grid points whose coordinates fall inside `bbox`, edges included.
    pub fn sel_region(&self, bbox: &Bbox) -> Result<Self, SelectionError> {
        let lat = offset(
            slice_indices(self.lat(), bbox.ymin, bbox.ymax).ok_or(SelectionError::Empty {
                axis: "lat",
                lo: bbox.ymin,
                hi: bbox.ymax,
            })?,
            self.selection.lat.start,
        );
        let lon = offset(
            slice_indices(self.lon(), bbox.xmin, bbox.xmax).ok_or(SelectionError::Empty {
                axis: "lon",
                lo: bbox.xmin,
                hi: bbox.xmax,
            })?,
            self.selection.lon.start,
        );

        Ok(Self {
            reader: self.reader,
            selection: Selection {
                time: self.selection.time.clone(),
                lat,
                lon,
            },
            chunks: self.chunks,
        })
    }

    pub fn groupby(&self, key: GroupKey) -> GroupBy<'r, R> {
        GroupBy {
            field: self.clone(),
            key,
            resample: false,
        }
    }

    /// One bin per calendar year, labelled by its last day.
    pub fn resample_yearly(&self) -> GroupBy<'r, R> {
        GroupBy {
            field: self.clone(),
            key: GroupKey::Year,
            resample: true,
        }
    }

    /// Reads the whole selection.
    pub fn compute(&self) -> Result<Array3<f64>, ReadError> {
        let mut out = Array3::<f64>::zeros(self.shape());

        for block in self.chunks.blocks(&self.selection) {
            let data = self.reader.read_block(&block)?;
            let t0 = block.time.start - self.selection.time.start;
            let y0 = block.lat.start - self.selection.lat.start;
            let x0 = block.lon.start - self.selection.lon.start;
            let (bt, by, bx) = data.dim();

            out.slice_mut(s![t0..t0 + bt, y0..y0 + by, x0..x0 + bx])
                .assign(&data);
        }

        Ok(out)
    }
}

fn offset(range: Range<usize>, by: usize) -> Range<usize> {
    range.start + by..range.end + by
}

pub struct GroupBy<'r, R: DataReader + ?Sized> {
    field: LazyField<'r, R>,
    key: GroupKey,
    resample: bool,
}

impl<'r, R: DataReader + ?Sized> GroupBy<'r, R> {
    /// Mean over time within each group, skipping NaN.
    pub fn mean(self) -> LazyReduction<'r, R> {
        LazyReduction {
            field: self.field,
            key: self.key,
            resample: self.resample,
        }
    }
}

pub struct LazyReduction<'r, R: DataReader + ?Sized> {
    field: LazyField<'r, R>,
    key: GroupKey,
    resample: bool,
}

impl<'r, R: DataReader + ?Sized> LazyReduction<'r, R> {
    /// Sorted labels of the groups present in the selected time range.
    pub fn labels(&self) -> Vec<i32> {
        let mut labels: Vec<i32> = self.field.time().iter().map(|t| self.key.label(t)).collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    pub fn compute(&self) -> Result<GroupedField, ReadError> {
        let labels = self.labels();
        let group_of: BTreeMap<i32, usize> =
            labels.iter().enumerate().map(|(i, &l)| (l, i)).collect();

        let selection = self.field.selection();
        let (_, ny, nx) = selection.shape();
        let time = self.field.reader.grid().time();

        let mut sums = Array3::<f64>::zeros((labels.len(), ny, nx));
        let mut counts = Array3::<u32>::zeros((labels.len(), ny, nx));

        let blocks = self.field.chunks.blocks(selection);
        tracing::debug!(
            key = self.key.name(),
            groups = labels.len(),
            blocks = blocks.len(),
            "computing grouped mean"
        );

        for block in blocks {
            let data = self.field.reader.read_block(&block)?;
            let y0 = block.lat.start - selection.lat.start;
            let x0 = block.lon.start - selection.lon.start;
            let (_, by, bx) = data.dim();

            for (k, t) in block.time.clone().enumerate() {
                let g = group_of[&self.key.label(&time[t])];
                Zip::from(sums.slice_mut(s![g, y0..y0 + by, x0..x0 + bx]))
                    .and(counts.slice_mut(s![g, y0..y0 + by, x0..x0 + bx]))
                    .and(data.index_axis(Axis(0), k))
                    .for_each(|sum, count, &value| {
                        if !value.is_nan() {
                            *sum += value;
                            *count += 1;
                        }
                    });
            }
        }

        Zip::from(&mut sums).and(&counts).for_each(|sum, &count| {
            *sum = if count == 0 { f64::NAN } else { *sum / count as f64 };
        });

        Ok(GroupedField {
            name: self.field.name().to_string(),
            key: self.key,
            resample: self.resample,
            labels,
            lat: self.field.lat().to_vec(),
            lon: self.field.lon().to_vec(),
            values: sums,
        })
    }
}

/// Result of a grouped reduction: one (lat, lon) grid per label.
#[derive(Debug, Clone)]
pub struct GroupedField {
    pub name: String,
    pub key: GroupKey,
    resample: bool,
    pub labels: Vec<i32>,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    /// (group, lat, lon)
    pub values: Array3<f64>,
}

impl GroupedField {
    pub fn sel_label(&self, label: i32) -> Result<Map2, SelectionError> {
        let index = self
            .labels
            .iter()
            .position(|&l| l == label)
            .ok_or(SelectionError::MissingLabel(label))?;

        Ok(Map2 {
            name: self.name.clone(),
            lat: self.lat.clone(),
            lon: self.lon.clone(),
            values: self.values.index_axis(Axis(0), index).to_owned(),
        })
    }

    pub fn sel_nearest(&self, lat: f64, lon: f64) -> Result<Series, SelectionError> {
        let (i, j) = nearest_cell(&self.lat, &self.lon, lat, lon).ok_or(SelectionError::EmptyGrid)?;

        Ok(Series {
            name: self.name.clone(),
            labels: self.labels.clone(),
            dates: self.label_dates(),
            lat: self.lat[i],
            lon: self.lon[j],
            values: self.values.slice(s![.., i, j]).to_vec(),
        })
    }

    /// Timestamps of resampled bins (`YYYY-12-31`); empty for climatologies.
    fn label_dates(&self) -> Vec<NaiveDate> {
        if !self.resample {
            return Vec::new();
        }
        self.labels
            .iter()
            .filter_map(|&year| NaiveDate::from_ymd_opt(year, 12, 31))
            .collect()
    }
}

/// A materialized (lat, lon) grid.
#[derive(Debug, Clone)]
pub struct Map2 {
    pub name: String,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub values: Array2<f64>,
}

impl Map2 {
    pub fn value_at_nearest(&self, lat: f64, lon: f64) -> Option<f64> {
        let (i, j) = nearest_cell(&self.lat, &self.lon, lat, lon)?;
        self.values.get((i, j)).copied()
    }
}

/// Values of one grid cell across group labels.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub labels: Vec<i32>,
    pub dates: Vec<NaiveDate>,
    /// Grid coordinates actually selected.
    pub lat: f64,
    pub lon: f64,
    pub values: Vec<f64>,
}

use ndarray::Array2;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cf_time::{CALENDAR, TimeUnits};
use crate::grid::Grid;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),
    #[error("Missing variable: {0}")]
    MissingVariable(String),
    #[error("Time index {index} out of range (time has {len} steps)")]
    TimeIndex { index: usize, len: usize },
    #[error("Slab shape {found:?} does not match grid (lat, lon) {expected:?}")]
    Shape {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

/// Metadata written alongside the field.
#[derive(Debug, Clone)]
pub struct DatasetAttributes {
    pub variable: String,
    pub units: String,
    pub long_name: String,
    pub description: String,
    pub time_units: TimeUnits,
}

pub struct NcWriter {
    path: PathBuf,
    file: netcdf::FileMut,
    variable: String,
    shape: (usize, usize, usize),
}

impl NcWriter {
    /// Creates (or overwrites) `path` and writes dimensions, coordinates and
    /// attributes. The field itself is filled with [`NcWriter::write_time_slab`].
    pub fn create<P: AsRef<Path>>(
        path: P,
        grid: &Grid,
        attrs: &DatasetAttributes,
    ) -> Result<Self, WriteError> {
        let path = path.as_ref();
        let mut file = netcdf::create(path)?;
        let (nt, ny, nx) = grid.shape();

        file.add_dimension("time", nt)?;
        file.add_dimension("lat", ny)?;
        file.add_dimension("lon", nx)?;

        {
            let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
            lat_var.put_attribute("standard_name", "latitude")?;
            lat_var.put_attribute("units", "degrees_north")?;
            lat_var.put_values(grid.lat(), ..)?;
        }

        {
            let mut lon_var = file.add_variable::<f64>("lon", &["lon"])?;
            lon_var.put_attribute("standard_name", "longitude")?;
            lon_var.put_attribute("units", "degrees_east")?;
            lon_var.put_values(grid.lon(), ..)?;
        }

        {
            let mut time_var = file.add_variable::<i64>("time", &["time"])?;
            time_var.put_attribute("standard_name", "time")?;
            time_var.put_attribute("units", attrs.time_units.to_string().as_str())?;
            time_var.put_attribute("calendar", CALENDAR)?;
            time_var.put_values(&attrs.time_units.encode(grid.time()), ..)?;
        }

        {
            let mut field = file.add_variable::<f64>(&attrs.variable, &["time", "lat", "lon"])?;
            field.put_attribute("units", attrs.units.as_str())?;
            field.put_attribute("long_name", attrs.long_name.as_str())?;
        }

        file.add_attribute("description", attrs.description.as_str())?;

        tracing::debug!(path = %path.display(), shape = ?grid.shape(), "created NetCDF file");

        Ok(Self {
            path: path.to_path_buf(),
            file,
            variable: attrs.variable.clone(),
            shape: grid.shape(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the (lat, lon) values of time step `index`.
    pub fn write_time_slab(&mut self, index: usize, slab: &Array2<f64>) -> Result<(), WriteError> {
        let (nt, ny, nx) = self.shape;
        if index >= nt {
            return Err(WriteError::TimeIndex { index, len: nt });
        }
        if slab.dim() != (ny, nx) {
            return Err(WriteError::Shape {
                expected: (ny, nx),
                found: slab.dim(),
            });
        }

        let slab = slab.as_standard_layout();
        let values = slab.as_slice().unwrap_or_default();

        let mut var = self
            .file
            .variable_mut(&self.variable)
            .ok_or_else(|| WriteError::MissingVariable(self.variable.clone()))?;
        var.put_values(values, (index, .., ..))?;

        Ok(())
    }
}

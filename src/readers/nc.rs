use ndarray::Array3;
use std::path::Path;

use super::types::{CoordinateInfo, DataReader, DatasetInfo, ReadError, VariableInfo};
use super::utils::{attribute_to_string, check_readable, dtype_name, read_f64};
use crate::cf_time::TimeUnits;
use crate::chunks::Block;
use crate::grid::Grid;

const DIMENSIONS: [&str; 3] = ["time", "lat", "lon"];

/// NetCDF reader for one (time, lat, lon) variable.
///
/// Opening only reads metadata and the coordinate variables; the field itself
/// is fetched block by block through [`DataReader::read_block`].
pub struct NcReader {
    file: netcdf::File,
    variable: String,
    info: DatasetInfo,
    grid: Grid,
}

impl NcReader {
    pub fn open<P: AsRef<Path>>(path: P, variable: &str) -> Result<Self, ReadError> {
        let path = path.as_ref();
        check_readable(path)?;

        let file = netcdf::open(path)?;

        let var = file
            .variable(variable)
            .ok_or_else(|| ReadError::MissingVariable(variable.to_string()))?;
        let found: Vec<String> = var.dimensions().iter().map(|d| d.name().to_string()).collect();
        if found != DIMENSIONS {
            return Err(ReadError::Dimensions {
                variable: variable.to_string(),
                found,
            });
        }

        let lat = Self::read_coordinate(&file, "lat")?;
        let lon = Self::read_coordinate(&file, "lon")?;
        let time = Self::read_time(&file)?;
        let grid = Grid::new(time, lat, lon);

        let info = Self::describe(path, &file, &grid)?;
        tracing::debug!(path = %path.display(), shape = ?grid.shape(), "opened NetCDF dataset");

        Ok(Self {
            file,
            variable: variable.to_string(),
            info,
            grid,
        })
    }

    fn read_coordinate(file: &netcdf::File, name: &str) -> Result<Vec<f64>, ReadError> {
        let var = file
            .variable(name)
            .ok_or_else(|| ReadError::MissingVariable(name.to_string()))?;
        read_f64(&var, ..)
    }

    fn read_time(file: &netcdf::File) -> Result<Vec<chrono::NaiveDateTime>, ReadError> {
        let var = file
            .variable("time")
            .ok_or_else(|| ReadError::MissingVariable("time".to_string()))?;

        let units = var
            .attribute("units")
            .map(|a| a.value())
            .transpose()?
            .map(|v| attribute_to_string(&v))
            .ok_or_else(|| ReadError::MissingAttribute {
                variable: "time".to_string(),
                attribute: "units".to_string(),
            })?;

        let values = read_f64(&var, ..)?;
        Ok(TimeUnits::parse(&units)?.decode(&values)?)
    }

    fn describe(path: &Path, file: &netcdf::File, grid: &Grid) -> Result<DatasetInfo, ReadError> {
        let dimensions: Vec<(String, usize)> = file
            .dimensions()
            .map(|d| (d.name().to_string(), d.len()))
            .collect();

        let fmt_first_last = |values: &[f64]| {
            (
                values.first().map(|v| format!("{:.4}", v)).unwrap_or_default(),
                values.last().map(|v| format!("{:.4}", v)).unwrap_or_default(),
            )
        };

        let mut coordinates = Vec::new();
        for (name, values) in [("lat", grid.lat()), ("lon", grid.lon())] {
            let (first, last) = fmt_first_last(values);
            coordinates.push(CoordinateInfo {
                name: name.to_string(),
                len: values.len(),
                dtype: "float64".to_string(),
                first,
                last,
            });
        }
        coordinates.push(CoordinateInfo {
            name: "time".to_string(),
            len: grid.time().len(),
            dtype: "datetime".to_string(),
            first: grid.time().first().map(|t| t.date().to_string()).unwrap_or_default(),
            last: grid.time().last().map(|t| t.date().to_string()).unwrap_or_default(),
        });

        let mut variables = Vec::new();
        for var in file.variables() {
            let name = var.name().to_string();
            if DIMENSIONS.contains(&name.as_str()) {
                continue;
            }

            let mut attributes = Vec::new();
            for attr in var.attributes() {
                attributes.push((attr.name().to_string(), attribute_to_string(&attr.value()?)));
            }

            variables.push(VariableInfo {
                name,
                dimensions: var
                    .dimensions()
                    .iter()
                    .map(|d| (d.name().to_string(), d.len()))
                    .collect(),
                dtype: dtype_name(&var.vartype()),
                attributes,
                chunks: None,
            });
        }

        let mut attributes = Vec::new();
        for attr in file.attributes() {
            attributes.push((attr.name().to_string(), attribute_to_string(&attr.value()?)));
        }

        Ok(DatasetInfo {
            source: path.to_path_buf(),
            dimensions,
            coordinates,
            variables,
            attributes,
        })
    }
}

impl DataReader for NcReader {
    fn info(&self) -> &DatasetInfo {
        &self.info
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn variable(&self) -> &str {
        &self.variable
    }

    fn read_block(&self, block: &Block) -> Result<Array3<f64>, ReadError> {
        let shape = self.grid.shape();
        if block.time.end > shape.0 || block.lat.end > shape.1 || block.lon.end > shape.2 {
            return Err(ReadError::OutOfBounds {
                block: block.clone(),
                shape,
            });
        }

        let var = self
            .file
            .variable(&self.variable)
            .ok_or_else(|| ReadError::MissingVariable(self.variable.clone()))?;

        let values = read_f64(
            &var,
            (block.time.clone(), block.lat.clone(), block.lon.clone()),
        )?;

        Ok(Array3::from_shape_vec(block.shape(), values)?)
    }
}

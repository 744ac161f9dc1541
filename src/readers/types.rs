use ndarray::Array3;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::cf_time::TimeUnitsError;
use crate::chunks::{Block, ChunkSpec};
use crate::grid::Grid;

/// Random access to one (time, lat, lon) variable of a gridded dataset.
pub trait DataReader {
    fn info(&self) -> &DatasetInfo;

    fn grid(&self) -> &Grid;

    /// Name of the variable served by [`DataReader::read_block`].
    fn variable(&self) -> &str;

    /// Reads the values of `block`, shaped (time, lat, lon).
    fn read_block(&self, block: &Block) -> Result<Array3<f64>, ReadError>;
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(PathBuf),
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),
    #[error("Missing variable: {0}")]
    MissingVariable(String),
    #[error("Variable {variable} has no '{attribute}' attribute")]
    MissingAttribute { variable: String, attribute: String },
    #[error("Variable {variable} has dimensions {found:?}, expected (time, lat, lon)")]
    Dimensions { variable: String, found: Vec<String> },
    #[error("Variable {variable} has non-numeric type {dtype}")]
    UnsupportedType { variable: String, dtype: String },
    #[error("Failed to decode time: {0}")]
    TimeUnits(#[from] TimeUnitsError),
    #[error("Block {block:?} is outside of shape {shape:?}")]
    OutOfBounds {
        block: Block,
        shape: (usize, usize, usize),
    },
    #[error("Data shape {found:?} does not match grid shape {expected:?}")]
    GridMismatch {
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },
    #[error("Unexpected data shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateInfo {
    pub name: String,
    pub len: usize,
    pub dtype: String,
    pub first: String,
    pub last: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub name: String,
    pub dimensions: Vec<(String, usize)>,
    pub dtype: String,
    pub attributes: Vec<(String, String)>,
    pub chunks: Option<ChunkSpec>,
}

/// Self-description of an opened dataset, printed before any data is read.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetInfo {
    pub source: PathBuf,
    pub dimensions: Vec<(String, usize)>,
    pub coordinates: Vec<CoordinateInfo>,
    pub variables: Vec<VariableInfo>,
    pub attributes: Vec<(String, String)>,
}

impl DatasetInfo {
    pub fn variable(&self, name: &str) -> Option<&VariableInfo> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn with_chunks(mut self, chunks: ChunkSpec) -> Self {
        for variable in &mut self.variables {
            if variable.dimensions.len() == 3 {
                variable.chunks = Some(chunks);
            }
        }
        self
    }
}

fn write_dims(f: &mut fmt::Formatter<'_>, dims: &[(String, usize)]) -> fmt::Result {
    let parts: Vec<String> = dims.iter().map(|(n, l)| format!("{}: {}", n, l)).collect();
    write!(f, "({})", parts.join(", "))
}

impl fmt::Display for DatasetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<Dataset> {}", self.source.display())?;
        write!(f, "Dimensions:  ")?;
        write_dims(f, &self.dimensions)?;
        writeln!(f)?;

        writeln!(f, "Coordinates:")?;
        for coord in &self.coordinates {
            writeln!(
                f,
                "  * {:<8} ({}) {} {} ... {}",
                coord.name, coord.name, coord.dtype, coord.first, coord.last
            )?;
        }

        writeln!(f, "Data variables:")?;
        for variable in &self.variables {
            let dims: Vec<&str> = variable.dimensions.iter().map(|(n, _)| n.as_str()).collect();
            write!(f, "    {:<8} ({}) {}", variable.name, dims.join(", "), variable.dtype)?;
            if let Some(chunks) = variable.chunks {
                write!(f, " chunks={}", chunks)?;
            }
            writeln!(f)?;
        }

        write!(f, "Attributes:")?;
        for (key, value) in &self.attributes {
            write!(f, "\n    {}:  {}", key, value)?;
        }

        Ok(())
    }
}

impl fmt::Display for VariableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Variable '{}'> {} ", self.name, self.dtype)?;
        write_dims(f, &self.dimensions)?;
        if let Some(chunks) = self.chunks {
            write!(f, "\nChunks: {}", chunks)?;
            if let [(_, nt), (_, ny), (_, nx)] = self.dimensions.as_slice() {
                let (ct, cy, cx) = chunks.chunk_counts((*nt, *ny, *nx));
                write!(f, " in {} chunks ({} x {} x {})", ct * cy * cx, ct, cy, cx)?;
            }
        }
        if !self.attributes.is_empty() {
            write!(f, "\nAttributes:")?;
            for (key, value) in &self.attributes {
                write!(f, "\n    {}:  {}", key, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sst_info() -> VariableInfo {
        VariableInfo {
            name: "sst".to_string(),
            dimensions: vec![
                ("time".to_string(), 366),
                ("lat".to_string(), 180),
                ("lon".to_string(), 360),
            ],
            dtype: "float64".to_string(),
            attributes: vec![("units".to_string(), "degC".to_string())],
            chunks: None,
        }
    }

    #[test]
    fn test_variable_display_reports_chunk_layout() {
        let info = DatasetInfo {
            source: PathBuf::from("sst_data.nc"),
            dimensions: Vec::new(),
            coordinates: Vec::new(),
            variables: vec![sst_info()],
            attributes: Vec::new(),
        }
        .with_chunks(ChunkSpec::default());

        let text = info.variable("sst").unwrap().to_string();
        assert!(text.starts_with("<Variable 'sst'> float64 (time: 366, lat: 180, lon: 360)"));
        assert!(text.contains("Chunks: (time: 12, lat: 180, lon: 360) in 31 chunks (31 x 1 x 1)"));
        assert!(text.contains("units:  degC"));
    }

    #[test]
    fn test_variable_display_without_chunks() {
        assert!(!sst_info().to_string().contains("Chunks"));
    }
}

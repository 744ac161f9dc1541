use ndarray::{Array3, s};
use std::path::PathBuf;

use super::types::{CoordinateInfo, DataReader, DatasetInfo, ReadError, VariableInfo};
use crate::chunks::Block;
use crate::grid::Grid;

/// A dataset already held in memory, served through the same block interface
/// as files on disk.
pub struct MemoryReader {
    variable: String,
    info: DatasetInfo,
    grid: Grid,
    data: Array3<f64>,
}

impl MemoryReader {
    pub fn new(variable: &str, grid: Grid, data: Array3<f64>) -> Result<Self, ReadError> {
        if data.dim() != grid.shape() {
            return Err(ReadError::GridMismatch {
                expected: grid.shape(),
                found: data.dim(),
            });
        }

        let (nt, ny, nx) = grid.shape();
        let dimensions = vec![
            ("time".to_string(), nt),
            ("lat".to_string(), ny),
            ("lon".to_string(), nx),
        ];

        let info = DatasetInfo {
            source: PathBuf::from("<memory>"),
            dimensions: dimensions.clone(),
            coordinates: vec![
                CoordinateInfo {
                    name: "lat".to_string(),
                    len: ny,
                    dtype: "float64".to_string(),
                    first: grid.lat().first().map(|v| v.to_string()).unwrap_or_default(),
                    last: grid.lat().last().map(|v| v.to_string()).unwrap_or_default(),
                },
                CoordinateInfo {
                    name: "lon".to_string(),
                    len: nx,
                    dtype: "float64".to_string(),
                    first: grid.lon().first().map(|v| v.to_string()).unwrap_or_default(),
                    last: grid.lon().last().map(|v| v.to_string()).unwrap_or_default(),
                },
            ],
            variables: vec![VariableInfo {
                name: variable.to_string(),
                dimensions,
                dtype: "float64".to_string(),
                attributes: Vec::new(),
                chunks: None,
            }],
            attributes: Vec::new(),
        };

        Ok(Self {
            variable: variable.to_string(),
            info,
            grid,
            data,
        })
    }
}

impl DataReader for MemoryReader {
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

        Ok(self
            .data
            .slice(s![block.time.clone(), block.lat.clone(), block.lon.clone()])
            .to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn grid(days: usize) -> Grid {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let time = (0..days)
            .map(|d| (start + chrono::Duration::days(d as i64)).and_hms_opt(0, 0, 0).unwrap())
            .collect();
        Grid::new(time, vec![10.0, 20.0], vec![120.0, 130.0, 140.0])
    }

    #[test]
    fn test_shape_mismatch_is_reported_as_such() {
        let result = MemoryReader::new("sst", grid(4), Array3::zeros((4, 3, 2)));

        assert!(matches!(
            result,
            Err(ReadError::GridMismatch {
                expected: (4, 2, 3),
                found: (4, 3, 2)
            })
        ));
    }

    #[test]
    fn test_read_block() {
        let data = Array3::from_shape_fn((4, 2, 3), |(t, y, x)| (t * 100 + y * 10 + x) as f64);
        let reader = MemoryReader::new("sst", grid(4), data).unwrap();

        let block = Block {
            time: 1..3,
            lat: 1..2,
            lon: 0..3,
        };
        let values = reader.read_block(&block).unwrap();
        assert_eq!(values.dim(), (2, 1, 3));
        assert_eq!(values[[1, 0, 2]], 212.0);

        let outside = Block {
            time: 0..5,
            ..block
        };
        assert!(matches!(reader.read_block(&outside), Err(ReadError::OutOfBounds { .. })));
    }
}

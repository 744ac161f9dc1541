use serde::Deserialize;
use std::fmt;
use std::ops::Range;

/// Fixed chunk sizes along (time, lat, lon).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChunkSpec {
    pub time: usize,
    pub lat: usize,
    pub lon: usize,
}

impl Default for ChunkSpec {
    fn default() -> Self {
        ChunkSpec {
            time: 12,
            lat: 180,
            lon: 360,
        }
    }
}

/// Index ranges selected along each axis of a (time, lat, lon) array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub time: Range<usize>,
    pub lat: Range<usize>,
    pub lon: Range<usize>,
}

impl Selection {
    pub fn full(shape: (usize, usize, usize)) -> Self {
        Selection {
            time: 0..shape.0,
            lat: 0..shape.1,
            lon: 0..shape.2,
        }
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.time.len(), self.lat.len(), self.lon.len())
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty() || self.lat.is_empty() || self.lon.is_empty()
    }
}

/// One contiguous piece of a selection, never crossing a chunk boundary.
pub type Block = Selection;

impl ChunkSpec {
    pub fn is_valid(&self) -> bool {
        self.time > 0 && self.lat > 0 && self.lon > 0
    }

    /// Splits `selection` into blocks aligned on the chunk grid of the full array,
    /// time-major.
    pub fn blocks(&self, selection: &Selection) -> Vec<Block> {
        if selection.is_empty() {
            return Vec::new();
        }

        let times = split_axis(&selection.time, self.time);
        let lats = split_axis(&selection.lat, self.lat);
        let lons = split_axis(&selection.lon, self.lon);

        let mut blocks = Vec::with_capacity(times.len() * lats.len() * lons.len());
        for time in &times {
            for lat in &lats {
                for lon in &lons {
                    blocks.push(Block {
                        time: time.clone(),
                        lat: lat.clone(),
                        lon: lon.clone(),
                    });
                }
            }
        }

        blocks
    }

    /// Number of chunks covering an array of `shape`.
    pub fn chunk_counts(&self, shape: (usize, usize, usize)) -> (usize, usize, usize) {
        (
            shape.0.div_ceil(self.time.max(1)),
            shape.1.div_ceil(self.lat.max(1)),
            shape.2.div_ceil(self.lon.max(1)),
        )
    }
}

fn split_axis(range: &Range<usize>, chunk: usize) -> Vec<Range<usize>> {
    let chunk = chunk.max(1);
    let mut pieces = Vec::new();
    let mut start = range.start;

    while start < range.end {
        let boundary = (start / chunk + 1) * chunk;
        let end = boundary.min(range.end);
        pieces.push(start..end);
        start = end;
    }

    pieces
}

impl fmt::Display for ChunkSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(time: {}, lat: {}, lon: {})", self.time, self.lat, self.lon)
    }
}

//! Coordinate-value lookups on 1-D monotonic axes.

use std::ops::Range;

/// Index range of every coordinate within `[lo, hi]`, inclusive.
///
/// Works on ascending and descending axes. Returns `None` when no coordinate
/// falls inside the bounds.
pub fn slice_indices(coords: &[f64], lo: f64, hi: f64) -> Option<Range<usize>> {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };

    let first = coords.iter().position(|&c| c >= lo && c <= hi)?;
    let last = coords.iter().rposition(|&c| c >= lo && c <= hi)?;

    Some(first..last + 1)
}

/// Index of the coordinate closest to `target`. An exact tie goes to the
/// higher index, the right-hand neighbour on an ascending axis.
pub fn nearest_index(coords: &[f64], target: f64) -> Option<usize> {
    coords
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_nan())
        .min_by(|(ia, a), (ib, b)| {
            let da = (*a - target).abs();
            let db = (*b - target).abs();
            da.total_cmp(&db).then(ib.cmp(ia))
        })
        .map(|(i, _)| i)
}

/// Nearest cell of a rectilinear grid to `(lat, lon)`, as `(lat_idx, lon_idx)`.
pub fn nearest_cell(lat: &[f64], lon: &[f64], target_lat: f64, target_lon: f64) -> Option<(usize, usize)> {
    Some((nearest_index(lat, target_lat)?, nearest_index(lon, target_lon)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::linspace;

    #[test]
    fn test_slice_indices_ascending() {
        let lat = linspace(-90.0, 90.0, 180);
        let range = slice_indices(&lat, 10.0, 50.0).unwrap();

        for (i, &value) in lat.iter().enumerate() {
            let inside = (10.0..=50.0).contains(&value);
            assert_eq!(range.contains(&i), inside, "lat[{}] = {}", i, value);
        }
    }

    #[test]
    fn test_slice_indices_descending_and_swapped_bounds() {
        let coords = vec![50.0, 40.0, 30.0, 20.0, 10.0];
        assert_eq!(slice_indices(&coords, 20.0, 40.0), Some(1..4));
        assert_eq!(slice_indices(&coords, 40.0, 20.0), Some(1..4));
    }

    #[test]
    fn test_slice_indices_empty() {
        let lon = linspace(0.0, 360.0, 360);
        assert_eq!(slice_indices(&lon, -170.0, -120.0), None);
        assert_eq!(slice_indices(&[], 0.0, 1.0), None);
    }

    #[test]
    fn test_nearest_index() {
        let coords = vec![0.0, 1.0, 2.0, 3.0];
        assert_eq!(nearest_index(&coords, 1.2), Some(1));
        assert_eq!(nearest_index(&coords, 1.5), Some(2));
        assert_eq!(nearest_index(&coords, 0.5), Some(1));
        assert_eq!(nearest_index(&coords, -10.0), Some(0));
        assert_eq!(nearest_index(&coords, 99.0), Some(3));
        assert_eq!(nearest_index(&[], 1.0), None);
    }

    #[test]
    fn test_nearest_cell_breaks_ties_upward() {
        let lat = vec![0.0, 25.0, 35.0];
        let lon = vec![150.0, 155.0, 165.0, 170.0];

        assert_eq!(nearest_cell(&lat, &lon, 30.0, 160.0), Some((2, 2)));
    }

    #[test]
    fn test_nearest_cell_minimizes_distance() {
        let lat = linspace(-90.0, 90.0, 180);
        let lon = linspace(0.0, 360.0, 360);
        let (i, j) = nearest_cell(&lat, &lon, 30.0, 160.0).unwrap();

        let best = lat
            .iter()
            .flat_map(|&a| lon.iter().map(move |&o| (a - 30.0).powi(2) + (o - 160.0).powi(2)))
            .fold(f64::INFINITY, f64::min);
        let found = (lat[i] - 30.0).powi(2) + (lon[j] - 160.0).powi(2);

        assert_eq!(found, best);
    }
}

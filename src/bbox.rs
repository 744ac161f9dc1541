use serde::Deserialize;

/// Geographic bounding box, inclusive on every edge.
///
/// Longitudes may follow either the [-180, 180] or the [0, 360] convention,
/// they are compared as-is against the grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Bbox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Bbox {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self, String> {
        if !(-180.0..=360.0).contains(&xmin) || !(-180.0..=360.0).contains(&xmax) {
            return Err("Longitude values must be between -180 and 360".to_string());
        }

        if !(-90.0..=90.0).contains(&ymin) || !(-90.0..=90.0).contains(&ymax) {
            return Err("Latitude values must be between -90 and 90".to_string());
        }

        if xmin > xmax || ymin > ymax {
            return Err("Min values must be <= max values".to_string());
        }

        Ok(Bbox {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.ymin..=self.ymax).contains(&lat) && (self.xmin..=self.xmax).contains(&lon)
    }
}

impl Default for Bbox {
    // North Pacific
    fn default() -> Self {
        Bbox {
            xmin: 120.0,
            xmax: 250.0,
            ymin: 10.0,
            ymax: 50.0,
        }
    }
}

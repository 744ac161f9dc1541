use std::fmt;

/// Summary of a block of values, NaN excluded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub valid: usize,
    pub total: usize,
}

impl FieldStats {
    pub fn from_values(values: impl Iterator<Item = f64>) -> Self {
        let mut stats = FieldStats {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            mean: f64::NAN,
            valid: 0,
            total: 0,
        };
        let mut sum = 0.0;

        for value in values {
            stats.total += 1;
            if value.is_nan() {
                continue;
            }
            stats.valid += 1;
            stats.min = stats.min.min(value);
            stats.max = stats.max.max(value);
            sum += value;
        }

        if stats.valid > 0 {
            stats.mean = sum / stats.valid as f64;
        } else {
            stats.min = f64::NAN;
            stats.max = f64::NAN;
        }

        stats
    }
}

impl fmt::Display for FieldStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Min: {:.2} °C", self.min)?;
        writeln!(f, "  Max: {:.2} °C", self.max)?;
        writeln!(f, "  Mean: {:.2} °C", self.mean)?;
        write!(
            f,
            "  Valid cells: {} / {} ({:.1}%)",
            self.valid,
            self.total,
            if self.total == 0 {
                0.0
            } else {
                100.0 * self.valid as f64 / self.total as f64
            }
        )
    }
}

//! MinMax scaling
//!
//! Linear map between a configured `[min, max]` range and `[0, 1]`.
//! Values outside the range are not clamped, and a degenerate range
//! (`min == max`) yields non-finite results rather than an error.

/// MinMax scaling parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Forward transform: `(value - min) / (max - min)`
    pub fn scale(&self, value: f64) -> f64 {
        (value - self.min) / self.range()
    }

    /// Inverse transform: `value * (max - min) + min`
    pub fn unscale(&self, value: f64) -> f64 {
        value * self.range() + self.min
    }

    fn range(&self) -> f64 {
        self.max - self.min
    }
}

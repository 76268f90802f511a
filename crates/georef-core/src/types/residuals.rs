use serde::{Deserialize, Serialize};

use crate::Real;

/// Summary statistics of point errors (distances in destination units).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResidualStats {
    /// Mean error.
    pub mean: Real,
    /// Root mean square error.
    pub rms: Real,
    /// Largest error.
    pub max: Real,
    /// Number of errors summarized.
    pub count: usize,
}

impl ResidualStats {
    /// Summarize a set of non-negative errors. Empty input gives all zeros.
    pub fn from_errors<I>(errors: I) -> Self
    where
        I: IntoIterator<Item = Real>,
    {
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let mut max: Real = 0.0;
        let mut count = 0usize;
        for e in errors {
            sum += e;
            sum_sq += e * e;
            max = max.max(e);
            count += 1;
        }
        if count == 0 {
            return Self::default();
        }
        let n = count as Real;
        Self {
            mean: sum / n,
            rms: (sum_sq / n).sqrt(),
            max,
            count,
        }
    }
}

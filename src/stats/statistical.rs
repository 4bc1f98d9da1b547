/// Spreads and maxima below this are treated as zero
const EPSILON: f32 = 1e-6;

/// Min/max/average over a batch of values
///
/// Values are added one by one, then [`finalize`](Self::finalize) is called
/// once before any deviation is queried. Deviations of values taken from the
/// batch lie in `[0, 1]`; degenerate batches (empty, or all values equal)
/// report a deviation of zero instead of dividing by zero.
#[derive(Debug, Clone)]
pub struct StatisticalData {
    min: f32,
    max: f32,
    sum: f32,
    count: usize,
    avg: f32,
    spread: f32,
}

impl Default for StatisticalData {
    fn default() -> Self {
        Self {
            min: f32::MAX,
            max: f32::MIN,
            sum: 0.0,
            count: 0,
            avg: 0.0,
            spread: 0.0,
        }
    }
}

impl StatisticalData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and finalize from an iterator of values
    pub fn from_values<I: IntoIterator<Item = f32>>(values: I) -> Self {
        let mut data = Self::new();
        for value in values {
            data.add_value(value);
        }
        data.finalize();
        data
    }

    pub fn add_value(&mut self, value: f32) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
        self.count += 1;
    }

    pub fn finalize(&mut self) {
        if self.count == 0 {
            self.min = 0.0;
            self.max = 0.0;
            self.avg = 0.0;
        } else {
            self.avg = self.sum / self.count as f32;
        }
        self.spread = self.max - self.min;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn min_value(&self) -> f32 {
        self.min
    }

    pub fn max_value(&self) -> f32 {
        self.max
    }

    pub fn avg_value(&self) -> f32 {
        self.avg
    }

    /// 0 for the largest value of the batch, 1 for the smallest
    pub fn deviation_from_max(&self, value: f32) -> f32 {
        if self.spread > EPSILON {
            (self.max - value) / self.spread
        } else {
            0.0
        }
    }

    /// 0 for zero, 1 for the largest value of the batch
    pub fn deviation_from_zero(&self, value: f32) -> f32 {
        if self.max > EPSILON {
            value / self.max
        } else {
            0.0
        }
    }
}

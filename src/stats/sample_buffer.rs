/// Ring buffer holding the last N samples of an economic quantity
///
/// Starts filled with zeros; the average always runs over the full
/// capacity so the first samples ramp up slowly unless the buffer is
/// refilled with [`fill`](Self::fill).
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    next: usize,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity.max(1)],
            next: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Overwrite the oldest sample
    pub fn add_value(&mut self, value: f32) {
        self.samples[self.next] = value;
        self.next = (self.next + 1) % self.samples.len();
    }

    /// Replace every sample with `value`
    pub fn fill(&mut self, value: f32) {
        self.samples.iter_mut().for_each(|s| *s = value);
    }

    pub fn average_value(&self) -> f32 {
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }
}

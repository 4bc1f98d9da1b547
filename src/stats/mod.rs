//! Running statistics shared by the scoring functions

mod sample_buffer;
mod statistical;

pub use sample_buffer::SampleBuffer;
pub use statistical::StatisticalData;

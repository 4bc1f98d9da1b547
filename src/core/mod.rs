pub mod config;
pub mod decisions;
pub mod error;
pub mod types;

pub use config::{load_profile, StrategyConfig};
pub use decisions::{DecisionSource, FixedDecisions, SeededDecisions};
pub use error::{Result, StrategosError};

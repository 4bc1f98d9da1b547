//! Strategos - strategic core of an RTS game AI
//!
//! Tracks danger on a grid of map sectors, weighs own forces against it,
//! picks what to build next and runs attacks from launch to retreat.

pub mod agent;
pub mod attack;
pub mod brain;
pub mod core;
pub mod forces;
pub mod sector;
pub mod stats;
pub mod units;

pub use agent::{EngineEvent, StrategicAgent};
pub use attack::Order;
pub use crate::core::config::{load_profile, StrategyConfig};
pub use crate::core::error::{Result, StrategosError};

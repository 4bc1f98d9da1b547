//! Strategic grid of map sectors
//!
//! Each sector accumulates decaying combat-power and threat statistics;
//! the [`SectorMap`] owns all of them and answers neighbourhood queries.

pub mod layout;
pub mod map;
pub mod spot;
pub mod state;

pub use layout::{MapLayout, SectorTerrain};
pub use map::SectorMap;
pub use spot::{Extractor, MetalSpot};
pub use state::{Sector, SectorBounds};

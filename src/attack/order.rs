//! High-level orders handed to the host's movement layer

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::core::types::{GroupId, SectorIndex};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    /// Move the group to the sector and engage whatever it meets there
    #[display(fmt = "{} attack-move to {}", group, sector)]
    MoveTo { group: GroupId, sector: SectorIndex },
    /// Stop and fall back to the nearest rally point
    #[display(fmt = "{} halt", group)]
    Halt { group: GroupId },
}

impl Order {
    pub fn group(&self) -> GroupId {
        match self {
            Order::MoveTo { group, .. } | Order::Halt { group } => *group,
        }
    }
}

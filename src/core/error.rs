use thiserror::Error;

use crate::core::types::{GroupId, SectorIndex, TeamId, UnitDefId};

#[derive(Error, Debug)]
pub enum StrategosError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Sector {0} lies outside the sector map")]
    SectorOutOfBounds(SectorIndex),

    #[error("Sector {sector} is already claimed as base by {team}")]
    SectorAlreadyClaimed { sector: SectorIndex, team: TeamId },

    #[error("Sector {sector} is not part of the base of {team}")]
    SectorNotInBase { sector: SectorIndex, team: TeamId },

    #[error("No base sectors assigned")]
    NoBaseSectors,

    #[error("Invalid unit definition: {0}")]
    InvalidUnitDef(UnitDefId),

    #[error("Unknown unit group: {0}")]
    UnknownGroup(GroupId),
}

pub type Result<T> = std::result::Result<T, StrategosError>;

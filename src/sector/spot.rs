use serde::{Deserialize, Serialize};

use crate::core::types::{UnitDefId, Vec2};

/// Positions closer than this (in world units) refer to the same metal spot
pub const SPOT_TOLERANCE: f32 = 1.0;

/// Extractor standing on a metal spot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extractor {
    /// Host-side unit handle
    pub unit: u32,
    pub def: UnitDefId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetalSpot {
    pub pos: Vec2,
    pub amount: f32,
    pub occupied: bool,
    pub extractor: Option<Extractor>,
}

impl MetalSpot {
    pub fn new(pos: Vec2, amount: f32) -> Self {
        Self {
            pos,
            amount,
            occupied: false,
            extractor: None,
        }
    }

    pub fn is_at(&self, pos: Vec2) -> bool {
        self.pos.distance(&pos) < SPOT_TOLERANCE
    }

    /// Mark the spot as free again and forget its extractor
    pub fn release(&mut self) {
        self.occupied = false;
        self.extractor = None;
    }
}

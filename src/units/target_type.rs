//! Target types and the per-target-type value vector
//!
//! Every threat, combat power and damage estimate in the crate is expressed
//! as a [`TargetTypeValues`]: one non-negative number per target type.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Index, IndexMut, Mul};

/// What a weapon can hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetType {
    Surface,
    Air,
    Floater,
    Submerged,
    Static,
}

impl TargetType {
    pub const COUNT: usize = 5;

    pub const ALL: [TargetType; 5] = [
        TargetType::Surface,
        TargetType::Air,
        TargetType::Floater,
        TargetType::Submerged,
        TargetType::Static,
    ];

    /// Target types of units that can move
    pub const MOBILE: [TargetType; 4] = [
        TargetType::Surface,
        TargetType::Air,
        TargetType::Floater,
        TargetType::Submerged,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_mobile(&self) -> bool {
        !matches!(self, TargetType::Static)
    }

    pub fn name(&self) -> &'static str {
        match self {
            TargetType::Surface => "surface",
            TargetType::Air => "air",
            TargetType::Floater => "floater",
            TargetType::Submerged => "submerged",
            TargetType::Static => "static",
        }
    }
}

/// One value per target type
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TargetTypeValues([f32; TargetType::COUNT]);

impl TargetTypeValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filled(value: f32) -> Self {
        Self([value; TargetType::COUNT])
    }

    /// Convenience constructor for a single non-zero entry
    pub fn single(target_type: TargetType, value: f32) -> Self {
        let mut values = Self::new();
        values[target_type] = value;
        values
    }

    /// `a_weight * a + b_weight * b`, element-wise
    pub fn blend(a_weight: f32, a: &Self, b_weight: f32, b: &Self) -> Self {
        let mut result = Self::new();
        for tt in TargetType::ALL {
            result[tt] = a_weight * a[tt] + b_weight * b[tt];
        }
        result
    }

    pub fn fill(&mut self, value: f32) {
        self.0 = [value; TargetType::COUNT];
    }

    pub fn multiply_values(&mut self, factor: f32) {
        self.0.iter_mut().for_each(|v| *v *= factor);
    }

    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    pub fn mobile_sum(&self) -> f32 {
        TargetType::MOBILE.iter().map(|tt| self[*tt]).sum()
    }

    /// Dot product with a weight vector
    pub fn weighted_sum(&self, weights: &Self) -> f32 {
        self.0.iter().zip(weights.0.iter()).map(|(v, w)| v * w).sum()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TargetType, f32)> + '_ {
        TargetType::ALL.iter().map(move |tt| (*tt, self[*tt]))
    }

    /// Mobile target type with the highest strictly positive value
    ///
    /// Ties keep the earlier target type in [`TargetType::MOBILE`] order.
    pub fn highest_mobile(&self) -> Option<(TargetType, f32)> {
        let mut highest: Option<(TargetType, f32)> = None;
        for tt in TargetType::MOBILE {
            let value = self[tt];
            let best = highest.map(|(_, v)| v).unwrap_or(0.0);
            if value > best {
                highest = Some((tt, value));
            }
        }
        highest
    }
}

impl Index<TargetType> for TargetTypeValues {
    type Output = f32;
    fn index(&self, tt: TargetType) -> &f32 {
        &self.0[tt.index()]
    }
}

impl IndexMut<TargetType> for TargetTypeValues {
    fn index_mut(&mut self, tt: TargetType) -> &mut f32 {
        &mut self.0[tt.index()]
    }
}

impl Add for TargetTypeValues {
    type Output = Self;
    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for TargetTypeValues {
    fn add_assign(&mut self, rhs: Self) {
        for (v, r) in self.0.iter_mut().zip(rhs.0.iter()) {
            *v += r;
        }
    }
}

impl Mul<f32> for TargetTypeValues {
    type Output = Self;
    fn mul(mut self, rhs: f32) -> Self {
        self.multiply_values(rhs);
        self
    }
}

//! Offensive layer: attacks, their groups and the orders they issue

pub mod manager;
pub mod order;
pub mod power;
pub mod state;

pub use manager::{AttackManager, GroupPool, GroupPools};
pub use order::Order;
pub use power::ForceProfile;
pub use state::{Attack, AttackState, Rejection};

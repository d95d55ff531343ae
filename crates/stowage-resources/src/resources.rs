//! The three-dimensional resource vector placements are computed over.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::quantity::Quantity;

/// CPU, memory, and GPU demanded by or available on one entity.
///
/// Every vector handed to the placement engine is non-negative. [`sub`]
/// is signed: a vector with negative components may exist as an
/// intermediate (e.g. usage = schedulable − available) but is never part
/// of a placement result.
///
/// [`sub`]: Resources::sub
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub cpu: Quantity,
    pub memory: Quantity,
    pub gpu: Quantity,
}

impl Resources {
    pub fn new(cpu: Quantity, memory: Quantity, gpu: Quantity) -> Self {
        Resources { cpu, memory, gpu }
    }

    /// The all-zero vector.
    pub fn zero() -> Self {
        Resources::default()
    }

    /// Component-wise `self += other`.
    pub fn add(&mut self, other: &Resources) {
        self.cpu = self.cpu.saturating_add(other.cpu);
        self.memory = self.memory.saturating_add(other.memory);
        self.gpu = self.gpu.saturating_add(other.gpu);
    }

    /// Component-wise signed `self -= other`. The result may have negative
    /// components; interpretation is the caller's.
    pub fn sub(&mut self, other: &Resources) {
        self.cpu = self.cpu.saturating_sub(other.cpu);
        self.memory = self.memory.saturating_sub(other.memory);
        self.gpu = self.gpu.saturating_sub(other.gpu);
    }

    /// True when **any** component of `self` strictly exceeds the matching
    /// component of `other`. A demand fits an availability exactly when
    /// `!demand.greater_than(available)`.
    pub fn greater_than(&self, other: &Resources) -> bool {
        self.cpu > other.cpu || self.memory > other.memory || self.gpu > other.gpu
    }

    pub fn is_zero(&self) -> bool {
        self.cpu.is_zero() && self.memory.is_zero() && self.gpu.is_zero()
    }

    /// True when any component is negative. Inputs with negative components
    /// are a caller bug and are rejected by the strategies.
    pub fn is_negative(&self) -> bool {
        self.cpu.is_negative() || self.memory.is_negative() || self.gpu.is_negative()
    }
}

impl fmt::Display for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cpu={} memory={} gpu={}",
            self.cpu, self.memory, self.gpu
        )
    }
}

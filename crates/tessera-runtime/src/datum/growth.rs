//! Capacity growth strategies for owned datum storage.

use std::fmt;

/// How much capacity a full datum adds on its next `push_back`.
///
/// The effective increment is never less than one, whatever the policy
/// computes.
#[derive(Clone, Copy, Default)]
pub enum GrowthPolicy {
    /// Grow by the current capacity, doubling it.
    #[default]
    Doubling,
    /// Grow by a fixed number of elements.
    Linear(usize),
    /// Caller-supplied function of `(len, capacity)`.
    Custom(fn(usize, usize) -> usize),
}

impl GrowthPolicy {
    /// Number of elements to add when `len == capacity`.
    pub fn increment(&self, len: usize, capacity: usize) -> usize {
        let step = match self {
            Self::Doubling => capacity,
            Self::Linear(step) => *step,
            Self::Custom(f) => f(len, capacity),
        };
        step.max(1)
    }
}

impl fmt::Debug for GrowthPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doubling => f.write_str("Doubling"),
            Self::Linear(step) => f.debug_tuple("Linear").field(step).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

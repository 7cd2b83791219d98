//! Scope and arena configuration.

use crate::datum::GrowthPolicy;

/// Configuration applied to scopes created by an arena.
///
/// All values are plain data; a config can be cloned and shared between
/// arenas.
#[derive(Clone, Debug)]
pub struct ScopeConfig {
    /// Number of attributes a new scope reserves room for.
    ///
    /// Default: 8.
    pub initial_capacity: usize,

    /// Growth policy given to every datum a scope appends.
    ///
    /// Default: [`GrowthPolicy::Doubling`].
    pub growth: GrowthPolicy,
}

impl ScopeConfig {
    /// Default attribute capacity for new scopes.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 8;

    /// Config with default values.
    pub fn new() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            growth: GrowthPolicy::Doubling,
        }
    }

    /// Replace the initial attribute capacity.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Replace the datum growth policy.
    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ScopeConfig::default();
        assert_eq!(config.initial_capacity, ScopeConfig::DEFAULT_INITIAL_CAPACITY);
        assert!(matches!(config.growth, GrowthPolicy::Doubling));
    }

    #[test]
    fn builders_override_fields() {
        let config = ScopeConfig::new()
            .with_initial_capacity(2)
            .with_growth(GrowthPolicy::Linear(4));
        assert_eq!(config.initial_capacity, 2);
        assert_eq!(config.growth.increment(0, 0), 4);
    }
}

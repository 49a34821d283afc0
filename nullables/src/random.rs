//! Nullable random: deterministic suffix generation.

use pledge_ledger::RandomSource;

/// A deterministic random source for testing.
///
/// Returns pre-configured values in order, cycling when exhausted. Each value
/// is reduced modulo the requested bound.
pub struct NullRandom {
    outputs: Vec<u16>,
    index: usize,
}

impl NullRandom {
    /// Create with a sequence of deterministic values.
    ///
    /// # Panics
    /// Panics if `outputs` is empty.
    pub fn new(outputs: Vec<u16>) -> Self {
        assert!(!outputs.is_empty(), "NullRandom needs at least one output");
        Self { outputs, index: 0 }
    }

    /// Create with a single value that will be returned for every call.
    pub fn constant(value: u16) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        self.index
    }
}

impl RandomSource for NullRandom {
    fn below(&mut self, bound: u16) -> u16 {
        let value = self.outputs[self.index % self.outputs.len()];
        self.index += 1;
        value % bound
    }
}

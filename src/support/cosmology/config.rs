/// Quadrature settings for line-of-sight distance integrals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegrationConfig {
    /// Number of Simpson intervals between `0` and `z`.
    ///
    /// Odd counts are rounded up to the next even number; the minimum is `2`.
    pub intervals: usize,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self { intervals: 256 }
    }
}

impl IntegrationConfig {
    /// The interval count actually used by the composite Simpson rule.
    pub(super) fn even_intervals(&self) -> usize {
        self.intervals.max(2).next_multiple_of(2)
    }
}

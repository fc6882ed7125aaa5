//! Limit query parameters for dashboard list endpoints.

use serde::Deserialize;

/// `?limit=` query parameter with clamped defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

impl LimitQuery {
    /// Maximum items a single request may ask for.
    const MAX_LIMIT: usize = 100;

    /// Default items when unspecified.
    const DEFAULT_LIMIT: usize = 5;

    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

//! Pairwise trait interaction model.

use crate::config::InteractionOverride;
use crate::taxonomy::TraitCode;

/// Weight of a pair with no override.
pub const NEUTRAL_INTERACTION: f64 = 1.0;

/// Dense `N×N` interaction matrix over a fixed trait order.
///
/// Cells are directional: `(i, j)` and `(j, i)` are independent.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl InteractionMatrix {
    /// Creates an `n×n` matrix filled with [`NEUTRAL_INTERACTION`].
    #[must_use]
    pub fn neutral(size: usize) -> Self {
        Self {
            size,
            cells: vec![NEUTRAL_INTERACTION; size * size],
        }
    }

    /// Builds the matrix for `order`, applying each override whose traits
    /// both appear in `order`. Later overrides win over earlier ones.
    #[must_use]
    pub fn build(order: &[TraitCode], overrides: &[InteractionOverride]) -> Self {
        let mut matrix = Self::neutral(order.len());
        let position = |raw: &str| order.iter().position(|code| code.as_str() == raw);

        for o in overrides {
            match (position(&o.from), position(&o.to)) {
                (Some(i), Some(j)) => matrix.set(i, j, o.weight),
                _ => tracing::debug!(
                    from = %o.from,
                    to = %o.to,
                    "interaction override names a trait outside the current order"
                ),
            }
        }
        matrix
    }

    /// Matrix dimension.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Weight of `(row, col)`.
    ///
    /// # Panics
    /// Panics if either index is out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.size && col < self.size, "interaction index out of bounds");
        self.cells[row * self.size + col]
    }

    /// Sets the weight of `(row, col)` only.
    ///
    /// # Panics
    /// Panics if either index is out of bounds.
    pub fn set(&mut self, row: usize, col: usize, weight: f64) {
        assert!(row < self.size && col < self.size, "interaction index out of bounds");
        self.cells[row * self.size + col] = weight;
    }
}

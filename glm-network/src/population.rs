//! Population context shared by the GLM components.

use crate::error::{invalid, Result};

/// Size of the neural population and of the weight basis.
///
/// The network model reads `N` and `B` from here at construction and
/// keeps its own copy; the population itself stays with the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Population {
    n: usize,
    b: usize,
}

impl Population {
    /// * `n` - number of neurons (nodes), at least one
    /// * `b` - dimension of the weight basis, at least one
    pub fn new(n: usize, b: usize) -> Result<Self> {
        if n == 0 {
            return Err(invalid!("population needs at least one node"));
        }
        if b == 0 {
            return Err(invalid!("basis dimension must be positive"));
        }
        Ok(Population { n, b })
    }

    /// Number of nodes `N`
    pub fn num_nodes(&self) -> usize {
        self.n
    }

    /// Basis dimension `B`
    pub fn basis_dim(&self) -> usize {
        self.b
    }
}

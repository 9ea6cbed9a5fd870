//! Block-pair sufficient statistics of an observed network.
//!
//! For every ordered block pair `(c1, c2)` this tracks, over rows in `c1`
//! and columns in `c2` of the adjacency matrix:
//!
//! * the number of present edges,
//! * the number of absent edges,
//! * the summed weight of present edges.
//!
//! Diagonal entries `A[i,i]` are counted like any other entry.

use ndarray::prelude::*;

/// C×C edge, non-edge and weight statistics.
#[derive(Debug, Clone)]
pub struct BlockStats {
    /// Present edge counts
    pub edges: Array2<f64>,
    /// Absent edge counts
    pub non_edges: Array2<f64>,
    /// Summed weights over present edges
    pub weights: Array2<f64>,
}

impl BlockStats {
    /// Collect statistics from adjacency `a`, optional weights `w` and
    /// the block `membership` of every node.
    ///
    /// * `a` - N×N binary adjacency
    /// * `w` - N×N weights, only read where `a` is one
    /// * `membership` - block per node, length N
    /// * `k` - number of blocks
    pub fn from_network(
        a: &Array2<f64>,
        w: Option<&Array2<f64>>,
        membership: &[usize],
        k: usize,
    ) -> Self {
        let mut edges = Array2::zeros((k, k));
        let mut non_edges = Array2::zeros((k, k));
        let mut weights = Array2::zeros((k, k));

        for ((i, j), &a_ij) in a.indexed_iter() {
            let c1 = membership[i];
            let c2 = membership[j];
            if a_ij > 0.0 {
                edges[[c1, c2]] += 1.0;
                if let Some(w) = w {
                    weights[[c1, c2]] += w[[i, j]];
                }
            } else {
                non_edges[[c1, c2]] += 1.0;
            }
        }

        BlockStats {
            edges,
            non_edges,
            weights,
        }
    }
}

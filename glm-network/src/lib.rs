//! Stochastic block model (SBM) priors over the connectivity of a
//! spike-train GLM.
//!
//! Neurons are partitioned into `C` blocks. Whether neuron `i` drives
//! neuron `j`, and with what weight, depends only on the ordered block
//! pair `(c[i], c[j])`. Block assignments, connection probabilities and
//! weight scales are inferred from an observed weighted adjacency matrix
//! by Gibbs sampling.
//!
//! # Model
//!
//! ```text
//! m        ~ Dirichlet(pi)
//! c[i]     ~ Categorical(m)
//! p[c1,c2] ~ Beta(tau1, tau0)
//! A[i,j]   ~ Bernoulli(p[c[i], c[j]])
//! W[i,j]   ~ Gamma(kappa, v[c[i], c[j]])   where A[i,j] = 1
//! ```
//!
//! Block weight means and covariances carry a Normal-Inverse-Wishart
//! prior and are expanded to node level for the regression.

#![deny(missing_docs)]

/// Seeded samplers and log densities
pub mod distributions;

/// Error taxonomy
pub mod error;

/// Gibbs updates of the block model
pub mod gibbs;

/// Capability trait and observed network container
pub mod network;

/// Options, hyperparameters and initial state
pub mod params;

/// Population size and basis dimension
pub mod population;

/// Block model parameter store
pub mod sbm;

/// Block-pair edge and weight statistics
pub mod sufficient_stats;

/// Adapters for the generic Gibbs runner
pub mod chain;

#[cfg(test)]
mod test;

pub use chain::{GibbsSbm, SbmSample};
pub use error::{NetworkError, Result};
pub use gibbs::GibbsSampler;
pub use network::{NetworkData, NetworkModel, SbmMode};
pub use params::{Broadcast, SbmInit, SbmOptions};
pub use population::Population;
pub use sbm::StochasticBlockModel;

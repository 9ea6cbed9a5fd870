//! Generic MCMC plumbing: a seeded Gibbs sweep driver, chain storage with
//! element-wise posterior summaries, and per-step wall-clock profiling.

/// Collected samples and their summaries
pub mod chain;

/// Sweep driver with warm-up and thinning
pub mod gibbs;

/// Named step timers
pub mod profile;

/// Traits implemented by chain parameters and models
pub mod traits;

pub use chain::McmcChain;
pub use gibbs::GibbsRunner;
pub use profile::StepTimer;
pub use traits::{ChainParam, GibbsModel};

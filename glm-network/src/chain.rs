//! Adapters between the block model and the generic Gibbs runner.

use crate::error::Result;
use crate::gibbs::GibbsSampler;
use crate::network::NetworkData;
use crate::sbm::StochasticBlockModel;
use mcmc_util::{ChainParam, GibbsModel};
use ndarray::prelude::*;
use rand::rngs::SmallRng;

/// Flattened snapshot of `(c, m, p, v)`.
///
/// Layout: `c` as floats (N), then `m` (C), then `p` (C×C, row-major),
/// then `v` (C×C, row-major).
#[derive(Debug, Clone)]
pub struct SbmSample {
    n: usize,
    k: usize,
    values: Vec<f64>,
}

impl SbmSample {
    /// Copy the current state out of `sbm`.
    pub fn from_model(sbm: &StochasticBlockModel) -> Self {
        let n = sbm.num_nodes();
        let k = sbm.num_blocks();
        let mut values = Vec::with_capacity(n + k + 2 * k * k);
        values.extend(sbm.assignments().iter().map(|&ci| ci as f64));
        values.extend(sbm.block_weights().iter());
        values.extend(sbm.connection_probs().iter());
        values.extend(sbm.weight_scales().iter());
        SbmSample { n, k, values }
    }

    /// Reinterpret a flat vector, e.g. a posterior mean, with the same layout.
    pub fn from_values(n: usize, k: usize, values: Vec<f64>) -> Option<Self> {
        if values.len() != n + k + 2 * k * k {
            return None;
        }
        Some(SbmSample { n, k, values })
    }

    /// Block assignments as floats; averaged samples give fractional labels.
    pub fn assignments(&self) -> &[f64] {
        &self.values[..self.n]
    }

    /// Block size distribution
    pub fn block_weights(&self) -> ArrayView1<'_, f64> {
        ArrayView1::from(&self.values[self.n..self.n + self.k])
    }

    /// Connection probabilities, C×C
    pub fn connection_probs(&self) -> Array2<f64> {
        self.block_table(self.n + self.k)
    }

    /// Weight scales, C×C
    pub fn weight_scales(&self) -> Array2<f64> {
        self.block_table(self.n + self.k + self.k * self.k)
    }

    fn block_table(&self, start: usize) -> Array2<f64> {
        let k = self.k;
        Array2::from_shape_fn((k, k), |(i, j)| self.values[start + i * k + j])
    }
}

impl ChainParam for SbmSample {
    fn dim(&self) -> usize {
        self.values.len()
    }

    fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// A block model bound to its observed network, ready for
/// [`mcmc_util::GibbsRunner`].
pub struct GibbsSbm {
    sbm: StochasticBlockModel,
    data: NetworkData,
    sampler: GibbsSampler,
}

impl GibbsSbm {
    /// Bind `sbm` to `data`. With `profile`, every update is timed.
    pub fn new(sbm: StochasticBlockModel, data: NetworkData, profile: bool) -> Result<Self> {
        crate::network::check_square("adjacency", data.adjacency(), sbm.num_nodes())?;
        let sampler = if profile {
            GibbsSampler::with_profiling()
        } else {
            GibbsSampler::new()
        };
        Ok(GibbsSbm { sbm, data, sampler })
    }

    /// Current model state
    pub fn model(&self) -> &StochasticBlockModel {
        &self.sbm
    }

    /// The sampler, including its step timings
    pub fn sampler(&self) -> &GibbsSampler {
        &self.sampler
    }
}

impl GibbsModel for GibbsSbm {
    type Sample = SbmSample;

    fn sweep(&mut self, rng: &mut SmallRng) -> anyhow::Result<()> {
        self.sampler.resample(&mut self.sbm, &self.data, rng)?;
        Ok(())
    }

    fn snapshot(&self) -> SbmSample {
        SbmSample::from_model(&self.sbm)
    }

    fn log_probability(&self) -> f64 {
        self.sbm.log_prior().unwrap_or(f64::NAN)
    }
}

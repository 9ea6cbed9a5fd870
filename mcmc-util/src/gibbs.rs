use indicatif::{ProgressBar, ProgressDrawTarget};
use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::chain::McmcChain;
use crate::traits::GibbsModel;

/// Gibbs chain runner configuration.
#[derive(Debug, Clone)]
pub struct GibbsRunner {
    pub n_samples: usize,
    pub warmup: usize,
    pub thin: usize,
    pub seed: u64,
    pub show_progress: bool,
}

impl Default for GibbsRunner {
    fn default() -> Self {
        Self {
            n_samples: 100,
            warmup: 0,
            thin: 1,
            seed: 42,
            show_progress: false,
        }
    }
}

impl GibbsRunner {
    pub fn new(n_samples: usize, warmup: usize) -> Self {
        Self {
            n_samples,
            warmup,
            ..Default::default()
        }
    }

    /// Total number of sweeps, warm-up included
    pub fn total_sweeps(&self) -> usize {
        self.warmup + self.n_samples * self.thin.max(1)
    }

    /// Run a single chain, mutating `model` in place.
    ///
    /// The first `warmup` sweeps are discarded; afterwards every `thin`-th
    /// state is kept together with its log-probability.
    pub fn run<M: GibbsModel>(&self, model: &mut M) -> anyhow::Result<McmcChain<M::Sample>> {
        let thin = self.thin.max(1);
        let total = self.total_sweeps();
        let mut rng = SmallRng::seed_from_u64(self.seed);

        let pb = ProgressBar::new(total as u64);
        if !self.show_progress {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }

        let mut chain = McmcChain::with_capacity(self.n_samples);

        for i in 0..total {
            model.sweep(&mut rng)?;

            if i >= self.warmup && (i - self.warmup) % thin == 0 {
                chain.push(model.snapshot(), model.log_probability());
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!(
            "kept {} of {} sweeps (warmup {}, thin {})",
            chain.n_samples(),
            total,
            self.warmup,
            thin
        );

        Ok(chain)
    }
}

use rand::rngs::SmallRng;

/// A state that can be stored in a chain and summarised element-wise.
pub trait ChainParam: Clone {
    fn dim(&self) -> usize;

    /// Flat view of every scalar in the state
    fn as_slice(&self) -> &[f64];
}

impl ChainParam for Vec<f64> {
    fn dim(&self) -> usize {
        self.len()
    }

    fn as_slice(&self) -> &[f64] {
        self
    }
}

/// A model updated by full Gibbs sweeps.
///
/// `sweep` resamples every latent variable once from its conditional,
/// `snapshot` copies out the current state, and `log_probability` is a
/// trace statistic recorded alongside each kept sample.
pub trait GibbsModel {
    type Sample: ChainParam;

    fn sweep(&mut self, rng: &mut SmallRng) -> anyhow::Result<()>;

    fn snapshot(&self) -> Self::Sample;

    fn log_probability(&self) -> f64;
}

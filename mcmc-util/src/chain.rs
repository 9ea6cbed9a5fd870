use crate::traits::ChainParam;

/// Collected MCMC samples with their log-probabilities.
#[derive(Debug, Clone)]
pub struct McmcChain<P: ChainParam> {
    pub samples: Vec<P>,
    pub log_probs: Vec<f64>,
}

impl<P: ChainParam> Default for McmcChain<P> {
    fn default() -> Self {
        McmcChain {
            samples: vec![],
            log_probs: vec![],
        }
    }
}

impl<P: ChainParam> McmcChain<P> {
    pub fn with_capacity(n: usize) -> Self {
        McmcChain {
            samples: Vec::with_capacity(n),
            log_probs: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, sample: P, log_prob: f64) {
        self.samples.push(sample);
        self.log_probs.push(log_prob);
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    /// Element-wise posterior mean across samples.
    pub fn posterior_mean(&self) -> Vec<f64> {
        let n = self.n_samples();
        if n == 0 {
            return vec![];
        }
        let d = self.samples[0].dim();
        let mut mean = vec![0.0; d];
        for sample in &self.samples {
            let s = sample.as_slice();
            for (m, &v) in mean.iter_mut().zip(s.iter()) {
                *m += v;
            }
        }
        let inv_n = 1.0 / n as f64;
        for m in &mut mean {
            *m *= inv_n;
        }
        mean
    }

    /// Element-wise posterior variance across samples.
    pub fn posterior_variance(&self) -> Vec<f64> {
        let n = self.n_samples();
        if n < 2 {
            return vec![];
        }
        let mean = self.posterior_mean();
        let d = mean.len();
        let mut var = vec![0.0; d];
        for sample in &self.samples {
            let s = sample.as_slice();
            for i in 0..d {
                let diff = s[i] - mean[i];
                var[i] += diff * diff;
            }
        }
        let inv = 1.0 / (n - 1) as f64;
        for v in &mut var {
            *v *= inv;
        }
        var
    }

    /// Element-wise quantile (0 <= q <= 1) across samples.
    pub fn quantile(&self, q: f64) -> Vec<f64> {
        let n = self.n_samples();
        if n == 0 {
            return vec![];
        }
        let d = self.samples[0].dim();
        let mut result = vec![0.0; d];

        // Collect values per dimension
        let mut vals = vec![Vec::with_capacity(n); d];
        for sample in &self.samples {
            let s = sample.as_slice();
            for i in 0..d {
                vals[i].push(s[i]);
            }
        }

        for i in 0..d {
            vals[i].sort_unstable_by(|a, b| a.total_cmp(b));
            let idx = (q * (n - 1) as f64).clamp(0.0, (n - 1) as f64);
            let lo = idx.floor() as usize;
            let hi = idx.ceil() as usize;
            if lo == hi {
                result[i] = vals[i][lo];
            } else {
                let frac = idx - lo as f64;
                result[i] = vals[i][lo] * (1.0 - frac) + vals[i][hi] * frac;
            }
        }
        result
    }
}

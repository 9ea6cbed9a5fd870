//! Stochastic block model parameter store.
//!
//! Holds the block assignment of every node together with the block-level
//! parameters, and expands them to node-level matrices on demand:
//!
//! ```text
//! P[i,j]     = p[c[i], c[j]]        (0 on the diagonal without self-connections)
//! Mu[i,j]    = mu[c[i], c[j]]
//! Sigma[i,j] = Sigma[c[i], c[j]]
//! ```
//!
//! Nothing node-level is cached, so the accessors always reflect the
//! current assignment and block tables.

use crate::distributions::*;
use crate::error::{domain, invalid, Result};
use crate::network::SbmMode;
use crate::params::{Broadcast, SbmInit, SbmOptions};
use crate::population::Population;
use log::debug;
use ndarray::prelude::*;
use rand::Rng;

/// Tolerance on the sum of a block-size distribution.
const SIMPLEX_TOL: f64 = 1e-5;

/// Stochastic block model over a directed weighted network.
#[derive(Debug, Clone)]
pub struct StochasticBlockModel {
    pub(crate) n: usize,
    pub(crate) b: usize,
    pub(crate) options: SbmOptions,
    /// Dirichlet concentration, length C
    pub(crate) pi: Array1<f64>,
    /// Block assignment per node, length N
    pub(crate) c: Vec<usize>,
    /// Block size distribution, length C
    pub(crate) m: Array1<f64>,
    /// Connection probabilities, C×C
    pub(crate) p: Array2<f64>,
    /// Weight means, C×C×B
    pub(crate) mu: Array3<f64>,
    /// Weight covariances, C×C×B×B
    pub(crate) sigma: Array4<f64>,
    /// Gamma weight rates, C×C
    pub(crate) v: Array2<f64>,
    pub(crate) mode: SbmMode,
}

impl StochasticBlockModel {
    /// Build a block model for `population`.
    ///
    /// Every argument is validated before anything is drawn. Parameters
    /// missing from `init` are then drawn from their priors in the order
    /// `m`, `c`, `p`, `(mu, Sigma)`.
    pub fn new<R: Rng + ?Sized>(
        population: &Population,
        options: SbmOptions,
        init: SbmInit,
        rng: &mut R,
    ) -> Result<Self> {
        let n = population.num_nodes();
        let b = population.basis_dim();
        let k = options.num_blocks;

        if k == 0 {
            return Err(invalid!("C must be a positive integer number of blocks"));
        }

        let pi = match &options.pi {
            Broadcast::Scalar(x) => Array1::from_elem(k, *x),
            Broadcast::Full(x) => {
                if x.len() != k {
                    return Err(invalid!("pi must be a scalar or a length-{} vector", k));
                }
                x.clone()
            }
        };
        if pi.iter().any(|&x| !(x > 0.0 && x.is_finite())) {
            return Err(invalid!("pi must be positive, got {:?}", pi.to_vec()));
        }

        let mode = if init.c.is_some()
            && init.p.is_some()
            && init.mu.is_some()
            && init.sigma.is_some()
        {
            SbmMode::Fixed
        } else {
            SbmMode::Inferred
        };

        if let Some(m) = &init.m {
            check_simplex(m, k)?;
        }
        if let Some(c) = &init.c {
            check_assignment(c, n, k)?;
        }
        let p_fixed = init.p.map(|p| resolve_prob_matrix(p, k)).transpose()?;
        let niw_fixed = match (init.mu, init.sigma) {
            (Some(mu), Some(sigma)) => {
                check_shape("mu", mu.shape(), &[k, k, b])?;
                check_shape("Sigma", sigma.shape(), &[k, k, b, b])?;
                Some((mu, sigma))
            }
            (None, None) => {
                check_niw_hyper(&options, b)?;
                None
            }
            _ => return Err(invalid!("mu and Sigma must be given together")),
        };
        if let Some(v) = &init.v {
            check_shape("v", v.shape(), &[k, k])?;
            if v.iter().any(|&x| !(x > 0.0 && x.is_finite())) {
                return Err(invalid!("v must contain positive weight scales"));
            }
        }

        let m = match init.m {
            Some(m) => m,
            None => sample_dirichlet(&pi, rng)?,
        };

        let c = match init.c {
            Some(c) => c,
            None => (0..n).map(|_| sample_categorical(&m, rng)).collect(),
        };

        let p = match p_fixed {
            Some(p) => p,
            None => {
                let mut p = Array2::zeros((k, k));
                for p_ij in p.iter_mut() {
                    *p_ij = sample_beta(options.tau1, options.tau0, rng)?;
                }
                p
            }
        };

        let (mu, sigma) = match niw_fixed {
            Some(x) => x,
            None => {
                let mu0 = Array1::from_elem(b, options.mu0);
                let sigma0 = Array2::eye(b) * options.sigma0;
                let mut mu = Array3::zeros((k, k, b));
                let mut sigma = Array4::zeros((k, k, b, b));
                for c1 in 0..k {
                    for c2 in 0..k {
                        let (mu_cc, sigma_cc) =
                            sample_niw(&mu0, &sigma0, options.kappa0, options.nu0, rng)?;
                        mu.slice_mut(s![c1, c2, ..]).assign(&mu_cc);
                        sigma.slice_mut(s![c1, c2, .., ..]).assign(&sigma_cc);
                    }
                }
                (mu, sigma)
            }
        };

        let v = init.v.unwrap_or_else(|| Array2::ones((k, k)));

        debug!(
            "block model: N = {}, B = {}, C = {}, mode = {:?}",
            n, b, k, mode
        );

        Ok(StochasticBlockModel {
            n,
            b,
            options,
            pi,
            c,
            m,
            p,
            mu,
            sigma,
            v,
            mode,
        })
    }

    /// Number of nodes `N`
    pub fn num_nodes(&self) -> usize {
        self.n
    }

    /// Basis dimension `B`
    pub fn basis_dim(&self) -> usize {
        self.b
    }

    /// Number of blocks `C`
    pub fn num_blocks(&self) -> usize {
        self.options.num_blocks
    }

    /// Options the model was built with
    pub fn options(&self) -> &SbmOptions {
        &self.options
    }

    /// Dirichlet concentration after broadcasting
    pub fn pi(&self) -> &Array1<f64> {
        &self.pi
    }

    /// Fixed generator or inferred model
    pub fn mode(&self) -> SbmMode {
        self.mode
    }

    /// True when every structural parameter was supplied
    pub fn is_fixed(&self) -> bool {
        self.mode == SbmMode::Fixed
    }

    /// Block assignment `c`
    pub fn assignments(&self) -> &[usize] {
        &self.c
    }

    /// Block size distribution `m`
    pub fn block_weights(&self) -> &Array1<f64> {
        &self.m
    }

    /// Block connection probabilities `p`
    pub fn connection_probs(&self) -> &Array2<f64> {
        &self.p
    }

    /// Block weight means `mu`
    pub fn weight_means(&self) -> &Array3<f64> {
        &self.mu
    }

    /// Block weight covariances `Sigma`
    pub fn weight_covs(&self) -> &Array4<f64> {
        &self.sigma
    }

    /// Block weight scales `v`
    pub fn weight_scales(&self) -> &Array2<f64> {
        &self.v
    }

    /// Number of nodes in each block, length C
    pub fn block_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.num_blocks()];
        for &ci in &self.c {
            sizes[ci] += 1;
        }
        sizes
    }

    /// N×N edge probabilities `P[i,j] = p[c[i], c[j]]`.
    pub fn prob_matrix(&self) -> Array2<f64> {
        let c = &self.c;
        let mut probs = Array2::from_shape_fn((self.n, self.n), |(i, j)| self.p[[c[i], c[j]]]);
        if !self.options.allow_self_connections {
            probs.diag_mut().fill(0.0);
        }
        probs
    }

    /// N×N×B weight means.
    pub fn mean_matrix(&self) -> Array3<f64> {
        let c = &self.c;
        Array3::from_shape_fn((self.n, self.n, self.b), |(i, j, d)| {
            self.mu[[c[i], c[j], d]]
        })
    }

    /// N×N×B×B weight covariances.
    pub fn cov_matrix(&self) -> Array4<f64> {
        let c = &self.c;
        Array4::from_shape_fn((self.n, self.n, self.b, self.b), |(i, j, d, e)| {
            self.sigma[[c[i], c[j], d, e]]
        })
    }

    /// Joint log prior of `(m, p, v, c)`:
    ///
    /// ```text
    /// ln Dir(m | pi) + sum ln Beta(p | tau1, tau0)
    ///   + sum ln Gamma(v | mu0, Sigma0) + sum_i ln m[c_i]
    /// ```
    ///
    /// The Gamma term uses `mu0` as shape and `Sigma0` as rate, so both
    /// must be positive.
    pub fn log_prior(&self) -> Result<f64> {
        let opt = &self.options;
        if !(opt.mu0 > 0.0 && opt.sigma0 > 0.0) {
            return Err(domain!(
                "weight scale prior Gamma({}, {}) is improper",
                opt.mu0,
                opt.sigma0
            ));
        }

        let mut lp = dirichlet_log_pdf(&self.pi, &self.m);
        lp += self
            .p
            .iter()
            .map(|&x| beta_log_pdf(opt.tau1, opt.tau0, x))
            .sum::<f64>();
        lp += self
            .v
            .iter()
            .map(|&x| gamma_log_pdf(opt.mu0, opt.sigma0, x))
            .sum::<f64>();
        lp += self.c.iter().map(|&ci| self.m[ci].ln()).sum::<f64>();
        Ok(lp)
    }

    /// Draw a network from the current parameters.
    ///
    /// ```text
    /// A[i,j] ~ Bernoulli(P[i,j])
    /// W[i,j] ~ Gamma(kappa, v[c_i, c_j])   if A[i,j] = 1, else 0
    /// ```
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<(Array2<f64>, Array2<f64>)> {
        let probs = self.prob_matrix();
        let mut a = Array2::zeros((self.n, self.n));
        let mut w = Array2::zeros((self.n, self.n));

        for ((i, j), &p_ij) in probs.indexed_iter() {
            if rng.random::<f64>() < p_ij {
                a[[i, j]] = 1.0;
                let rate = self.v[[self.c[i], self.c[j]]];
                w[[i, j]] = sample_gamma(self.options.kappa, rate, rng)?;
            }
        }

        Ok((a, w))
    }
}

fn check_shape(what: &str, found: &[usize], expected: &[usize]) -> Result<()> {
    if found != expected {
        return Err(invalid!(
            "{} must have shape {:?}, got {:?}",
            what,
            expected,
            found
        ));
    }
    Ok(())
}

fn check_simplex(m: &Array1<f64>, k: usize) -> Result<()> {
    if m.len() != k {
        return Err(invalid!("m must be a length-{} probability vector", k));
    }
    if m.iter().any(|&x| !(x >= 0.0)) || (m.sum() - 1.0).abs() > SIMPLEX_TOL {
        return Err(invalid!(
            "m must be non-negative and sum to one, got {:?}",
            m.to_vec()
        ));
    }
    Ok(())
}

fn check_assignment(c: &[usize], n: usize, k: usize) -> Result<()> {
    if c.len() != n {
        return Err(invalid!(
            "c must be a length-{} vector of block assignments, got length {}",
            n,
            c.len()
        ));
    }
    if let Some(&bad) = c.iter().find(|&&ci| ci >= k) {
        return Err(invalid!("block assignment {} is outside [0, {})", bad, k));
    }
    Ok(())
}

fn resolve_prob_matrix(p: Broadcast<Array2<f64>>, k: usize) -> Result<Array2<f64>> {
    let p = match p {
        Broadcast::Scalar(x) => Array2::from_elem((k, k), x),
        Broadcast::Full(x) => {
            check_shape("p", x.shape(), &[k, k])?;
            x
        }
    };
    if p.iter().any(|x| !(0.0..=1.0).contains(x)) {
        return Err(invalid!("p must contain probabilities in [0, 1]"));
    }
    Ok(p)
}

fn check_niw_hyper(options: &SbmOptions, b: usize) -> Result<()> {
    if !(options.kappa0 > 0.0) {
        return Err(invalid!("kappa0 must be positive, got {}", options.kappa0));
    }
    if !(options.sigma0 > 0.0) {
        return Err(invalid!("Sigma0 must be positive, got {}", options.sigma0));
    }
    if !(options.nu0 > b as f64 - 1.0) {
        return Err(invalid!(
            "nu0 must exceed B - 1 = {}, got {}",
            b - 1,
            options.nu0
        ));
    }
    Ok(())
}

//! Construction options, hyperparameters and optional initial state.

use ndarray::prelude::*;

/// A parameter that can be given either as one scalar broadcast over
/// every entry or as a full array.
#[derive(Debug, Clone, PartialEq)]
pub enum Broadcast<A> {
    /// Same value everywhere
    Scalar(f64),
    /// Explicit array, shape checked at construction
    Full(A),
}

impl<A> From<f64> for Broadcast<A> {
    fn from(x: f64) -> Self {
        Broadcast::Scalar(x)
    }
}

impl From<Array1<f64>> for Broadcast<Array1<f64>> {
    fn from(x: Array1<f64>) -> Self {
        Broadcast::Full(x)
    }
}

impl From<Array2<f64>> for Broadcast<Array2<f64>> {
    fn from(x: Array2<f64>) -> Self {
        Broadcast::Full(x)
    }
}

/// Options for the stochastic block model.
///
/// Hyperparameter names follow the model:
///
/// ```text
/// m         ~ Dirichlet(pi)
/// c[i]      ~ Categorical(m)
/// p[c1,c2]  ~ Beta(tau1, tau0)
/// (mu, Sigma)[c1,c2] ~ NIW(mu0, Sigma0, kappa0, nu0)
/// W[i,j] | A[i,j]=1  ~ Gamma(kappa, v[c_i, c_j])
/// ```
#[derive(Debug, Clone)]
pub struct SbmOptions {
    /// Number of blocks C. Default: 1
    pub num_blocks: usize,
    /// Dirichlet concentration over block sizes. Default: 1.0
    pub pi: Broadcast<Array1<f64>>,
    /// Beta prior pseudo-count of absent edges. Default: 0.1
    pub tau0: f64,
    /// Beta prior pseudo-count of present edges. Default: 0.1
    pub tau1: f64,
    /// NIW prior mean (broadcast over the basis); also the Gamma shape
    /// prior of the weight scale. Default: 0.0
    pub mu0: f64,
    /// NIW mean precision scaling. Default: 1.0
    pub kappa0: f64,
    /// NIW degrees of freedom, must exceed `B - 1`. Default: 1.0
    pub nu0: f64,
    /// NIW scale (times identity); also the Gamma rate prior of the
    /// weight scale. Default: 1.0
    pub sigma0: f64,
    /// Shape of the Gamma weight model. Default: 1.0
    pub kappa: f64,
    /// Whether a node may connect to itself. Default: true
    pub allow_self_connections: bool,
}

impl Default for SbmOptions {
    fn default() -> Self {
        SbmOptions {
            num_blocks: 1,
            pi: Broadcast::Scalar(1.0),
            tau0: 0.1,
            tau1: 0.1,
            mu0: 0.0,
            kappa0: 1.0,
            nu0: 1.0,
            sigma0: 1.0,
            kappa: 1.0,
            allow_self_connections: true,
        }
    }
}

impl SbmOptions {
    /// Default options with `num_blocks` blocks.
    pub fn with_blocks(num_blocks: usize) -> Self {
        SbmOptions {
            num_blocks,
            ..Default::default()
        }
    }
}

/// Optional initial state. Anything left as `None` is drawn from its prior.
///
/// When `c`, `p`, `mu` and `sigma` are all given, the model is a fixed
/// generator and resampling does nothing.
#[derive(Debug, Clone, Default)]
pub struct SbmInit {
    /// Block assignment per node, length N
    pub c: Option<Vec<usize>>,
    /// Block size distribution, length C
    pub m: Option<Array1<f64>>,
    /// Block connection probabilities, C×C
    pub p: Option<Broadcast<Array2<f64>>>,
    /// Block weight means, C×C×B
    pub mu: Option<Array3<f64>>,
    /// Block weight covariances, C×C×B×B
    pub sigma: Option<Array4<f64>>,
    /// Block weight scales (Gamma rates), C×C
    pub v: Option<Array2<f64>>,
}

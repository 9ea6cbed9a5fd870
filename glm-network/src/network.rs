//! Capability set shared by network models.

use crate::error::{NetworkError, Result};
use crate::gibbs::GibbsSampler;
use crate::params::{SbmInit, SbmOptions};
use crate::population::Population;
use crate::sbm::StochasticBlockModel;
use ndarray::prelude::*;
use rand::Rng;

/// Whether a model generates data or is an object of inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SbmMode {
    /// All structural parameters were supplied; resampling does nothing.
    Fixed,
    /// Parameters are resampled from their conditionals.
    Inferred,
}

/// Observed directed network: binary adjacency and edge weights.
#[derive(Debug, Clone)]
pub struct NetworkData {
    adjacency: Array2<f64>,
    weights: Array2<f64>,
}

impl NetworkData {
    /// * `adjacency` - N×N with entries in {0, 1}
    /// * `weights` - N×N, only meaningful where `adjacency` is one
    pub fn new(adjacency: Array2<f64>, weights: Array2<f64>) -> Result<Self> {
        let n = adjacency.nrows();
        check_adjacency(&adjacency, n)?;
        check_square("weights", &weights, n)?;
        Ok(NetworkData { adjacency, weights })
    }

    /// Number of nodes
    pub fn num_nodes(&self) -> usize {
        self.adjacency.nrows()
    }

    /// Adjacency `A`
    pub fn adjacency(&self) -> &Array2<f64> {
        &self.adjacency
    }

    /// Weights `W`
    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }
}

pub(crate) fn check_square(what: &'static str, x: &Array2<f64>, n: usize) -> Result<()> {
    if x.dim() != (n, n) {
        return Err(NetworkError::Shape {
            what,
            expected: vec![n, n],
            found: x.shape().to_vec(),
        });
    }
    Ok(())
}

pub(crate) fn check_adjacency(a: &Array2<f64>, n: usize) -> Result<()> {
    check_square("adjacency", a, n)?;
    if let Some(bad) = a.iter().find(|&&x| x != 0.0 && x != 1.0) {
        return Err(NetworkError::InvalidParameter(format!(
            "adjacency entries must be 0 or 1, found {}",
            bad
        )));
    }
    Ok(())
}

/// A prior over network structure that can be drawn, expanded to node
/// level, and resampled given an observed network.
pub trait NetworkModel: Sized {
    /// Hyperparameters and structural choices
    type Options;

    /// Draw every parameter from its prior.
    fn from_prior<R: Rng + ?Sized>(
        population: &Population,
        options: Self::Options,
        rng: &mut R,
    ) -> Result<Self>;

    /// N×N connection probabilities
    fn prob_matrix(&self) -> Array2<f64>;

    /// N×N×B weight means
    fn mean_matrix(&self) -> Array3<f64>;

    /// N×N×B×B weight covariances
    fn cov_matrix(&self) -> Array4<f64>;

    /// One full Gibbs sweep given the observed network.
    fn resample<R: Rng + ?Sized>(&mut self, data: &NetworkData, rng: &mut R) -> Result<()>;
}

impl NetworkModel for StochasticBlockModel {
    type Options = SbmOptions;

    fn from_prior<R: Rng + ?Sized>(
        population: &Population,
        options: SbmOptions,
        rng: &mut R,
    ) -> Result<Self> {
        StochasticBlockModel::new(population, options, SbmInit::default(), rng)
    }

    fn prob_matrix(&self) -> Array2<f64> {
        StochasticBlockModel::prob_matrix(self)
    }

    fn mean_matrix(&self) -> Array3<f64> {
        StochasticBlockModel::mean_matrix(self)
    }

    fn cov_matrix(&self) -> Array4<f64> {
        StochasticBlockModel::cov_matrix(self)
    }

    fn resample<R: Rng + ?Sized>(&mut self, data: &NetworkData, rng: &mut R) -> Result<()> {
        GibbsSampler::new().resample(self, data, rng)
    }
}

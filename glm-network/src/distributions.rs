//! Log densities and seeded samplers for the block model.
//!
//! Every sampler takes the random source explicitly so a chain is
//! reproducible from its seed. Invalid distribution parameters come back
//! as [`NetworkError::Domain`](crate::error::NetworkError::Domain).
//!
//! # Densities
//!
//! ```text
//! ln Bern(a | p)        = a ln p + (1 - a) ln(1 - p)
//! ln Gamma(x | k, r)    = k ln r - lgamma(k) + (k - 1) ln x - r x
//! ln Beta(x | a, b)     = (a - 1) ln x + (b - 1) ln(1 - x) - lnB(a, b)
//! ln Dir(m | alpha)     = lgamma(sum alpha) - sum lgamma(alpha) + sum (alpha - 1) ln m
//! ```

use crate::error::{domain, Result};
use nalgebra::DMatrix;
use ndarray::prelude::*;
use rand::Rng;
use rand_distr::{Beta, ChiSquared, Distribution, Gamma, StandardNormal};
use special::Gamma as SpecialGamma;

#[inline]
fn ln_gamma(x: f64) -> f64 {
    SpecialGamma::ln_gamma(x).0
}

/// Bernoulli log-probability of a binary observation `a`.
#[inline]
pub fn bernoulli_log_pmf(prob: f64, a: f64) -> f64 {
    if a > 0.0 {
        prob.ln()
    } else {
        (-prob).ln_1p()
    }
}

/// Gamma log-density with `shape` and `rate`.
///
/// Outside the support (`x <= 0`) this is `-inf`, except the exponential
/// case `shape == 1` at zero.
#[inline]
pub fn gamma_log_pdf(shape: f64, rate: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return if x == 0.0 && shape == 1.0 {
            rate.ln()
        } else {
            f64::NEG_INFINITY
        };
    }
    shape * rate.ln() - ln_gamma(shape) + (shape - 1.0) * x.ln() - rate * x
}

/// Beta log-density of `x` with parameters `(a, b)`.
pub fn beta_log_pdf(a: f64, b: f64, x: f64) -> f64 {
    if !(0.0..=1.0).contains(&x) {
        return f64::NEG_INFINITY;
    }
    let ln_beta = ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b);
    (a - 1.0) * x.ln() + (b - 1.0) * (-x).ln_1p() - ln_beta
}

/// Dirichlet log-density of the simplex point `m`.
pub fn dirichlet_log_pdf(alpha: &Array1<f64>, m: &Array1<f64>) -> f64 {
    let norm = ln_gamma(alpha.sum()) - alpha.iter().map(|&a| ln_gamma(a)).sum::<f64>();
    norm + alpha
        .iter()
        .zip(m.iter())
        .map(|(&a, &x)| (a - 1.0) * x.ln())
        .sum::<f64>()
}

/// Draw from `Beta(a, b)`.
pub fn sample_beta<R: Rng + ?Sized>(a: f64, b: f64, rng: &mut R) -> Result<f64> {
    let beta = Beta::new(a, b).map_err(|e| domain!("Beta({}, {}): {}", a, b, e))?;
    Ok(beta.sample(rng))
}

/// Draw from `Gamma(shape, rate)`, i.e. scale `1 / rate`.
pub fn sample_gamma<R: Rng + ?Sized>(shape: f64, rate: f64, rng: &mut R) -> Result<f64> {
    if !(shape > 0.0 && shape.is_finite()) || !(rate > 0.0 && rate.is_finite()) {
        return Err(domain!("Gamma(shape = {}, rate = {})", shape, rate));
    }
    let gamma = Gamma::new(shape, 1.0 / rate)
        .map_err(|e| domain!("Gamma(shape = {}, rate = {}): {}", shape, rate, e))?;
    Ok(gamma.sample(rng))
}

/// Draw a point on the simplex from `Dirichlet(alpha)`.
///
/// If `X_i ~ Gamma(alpha_i, 1)`, then `X / sum(X) ~ Dirichlet(alpha)`.
pub fn sample_dirichlet<R: Rng + ?Sized>(alpha: &Array1<f64>, rng: &mut R) -> Result<Array1<f64>> {
    let mut x = Array1::zeros(alpha.len());
    for (xi, &a) in x.iter_mut().zip(alpha.iter()) {
        *xi = sample_gamma(a, 1.0, rng)?;
    }
    let total = x.sum();
    if !(total > 0.0 && total.is_finite()) {
        return Err(domain!("Dirichlet({:?}) draw underflowed", alpha.to_vec()));
    }
    x /= total;
    Ok(x)
}

/// Draw an index with probability proportional to `weights`.
pub fn sample_categorical<R: Rng + ?Sized>(weights: &Array1<f64>, rng: &mut R) -> usize {
    let total: f64 = weights.sum();
    let u: f64 = rng.random::<f64>() * total;
    let mut cum = 0.0;
    let mut last = 0;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cum += w;
        last = i;
        if cum >= u {
            return i;
        }
    }
    last
}

/// Sample from a categorical distribution given unnormalized
/// log-probabilities.
///
/// Subtracts the maximum before exponentiating. Entries that are `-inf`
/// or NaN carry no mass and are never returned. Returns `None` when no
/// entry is finite.
pub fn sample_categorical_log<R: Rng + ?Sized>(log_probs: &[f64], rng: &mut R) -> Option<usize> {
    let max = log_probs
        .iter()
        .cloned()
        .filter(|lp| lp.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);

    if !max.is_finite() {
        return None;
    }

    let weights: Vec<f64> = log_probs
        .iter()
        .map(|&lp| if lp.is_finite() { (lp - max).exp() } else { 0.0 })
        .collect();
    let total: f64 = weights.iter().sum();

    let u: f64 = rng.random::<f64>() * total;
    let mut cum = 0.0;
    let mut last = None;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cum += w;
        last = Some(i);
        if cum >= u {
            return Some(i);
        }
    }

    last
}

fn to_dmatrix(x: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| x[[i, j]])
}

fn to_array2(x: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((x.nrows(), x.ncols()), |(i, j)| x[(i, j)])
}

/// Draw a covariance matrix from `InvWishart(scale, nu)`.
///
/// Uses the Bartlett decomposition of `Wishart(scale^-1, nu)` and inverts
/// the draw. Requires `nu > dim - 1` and a positive definite `scale`.
pub fn sample_inv_wishart<R: Rng + ?Sized>(
    scale: &Array2<f64>,
    nu: f64,
    rng: &mut R,
) -> Result<Array2<f64>> {
    let d = scale.nrows();
    if nu <= (d as f64) - 1.0 {
        return Err(domain!("InvWishart needs nu > {}, got {}", d - 1, nu));
    }

    let precision = to_dmatrix(scale)
        .cholesky()
        .ok_or_else(|| domain!("InvWishart scale is not positive definite"))?
        .inverse();

    let chol_l = precision
        .cholesky()
        .ok_or_else(|| domain!("InvWishart precision is not positive definite"))?
        .l();

    // Bartlett factor: chi on the diagonal, standard normals below
    let mut bartlett = DMatrix::<f64>::zeros(d, d);
    for i in 0..d {
        let chi2 = ChiSquared::new(nu - i as f64)
            .map_err(|e| domain!("ChiSquared({}): {}", nu - i as f64, e))?;
        bartlett[(i, i)] = chi2.sample(rng).sqrt();
        for j in 0..i {
            bartlett[(i, j)] = StandardNormal.sample(rng);
        }
    }

    let factor = &chol_l * bartlett;
    let wishart = &factor * factor.transpose();

    let sigma = wishart
        .cholesky()
        .ok_or_else(|| domain!("Wishart draw is singular"))?
        .inverse();

    let sigma = (&sigma + sigma.transpose()) * 0.5;
    Ok(to_array2(&sigma))
}

/// Draw `(mu, Sigma)` from a Normal-Inverse-Wishart prior:
///
/// ```text
/// Sigma ~ InvWishart(sigma0, nu0)
/// mu    ~ N(mu0, Sigma / kappa0)
/// ```
pub fn sample_niw<R: Rng + ?Sized>(
    mu0: &Array1<f64>,
    sigma0: &Array2<f64>,
    kappa0: f64,
    nu0: f64,
    rng: &mut R,
) -> Result<(Array1<f64>, Array2<f64>)> {
    if kappa0 <= 0.0 {
        return Err(domain!("NIW needs kappa0 > 0, got {}", kappa0));
    }

    let sigma = sample_inv_wishart(sigma0, nu0, rng)?;

    let chol_l = (to_dmatrix(&sigma) / kappa0)
        .cholesky()
        .ok_or_else(|| domain!("NIW covariance is not positive definite"))?
        .l();

    let z = DMatrix::<f64>::from_fn(mu0.len(), 1, |_, _| StandardNormal.sample(rng));
    let shift = chol_l * z;

    let mu = Array1::from_shape_fn(mu0.len(), |i| mu0[i] + shift[(i, 0)]);
    Ok((mu, sigma))
}

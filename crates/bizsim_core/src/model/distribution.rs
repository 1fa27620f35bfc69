//! Parametric distribution catalog.
//!
//! A [`Distribution`] can only be obtained through validation: either
//! [`Distribution::new`] or deserialization, which routes through the same
//! checks. Sampling never re-validates.

use std::f64::consts::PI;

use rand::Rng;
use rand::distr::{Distribution as _, Open01, Uniform};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Parameters of a distribution family.
///
/// This is the unvalidated, serializable description of a distribution.
/// Turn it into a sampler with [`Distribution::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DistributionParams {
    /// Degenerate distribution that always yields `value`
    Fixed { value: f64 },
    Normal { mean: f64, std_dev: f64 },
    /// Continuous uniform on `[min, max)`
    Uniform { min: f64, max: f64 },
    Triangular { min: f64, mode: f64, max: f64 },
    Exponential { rate: f64 },
    /// Log-normal; `mu` and `sigma` describe the underlying normal
    LogNormal { mu: f64, sigma: f64 },
    Beta { alpha: f64, beta: f64 },
    Gamma { shape: f64, scale: f64 },
    Weibull { scale: f64, shape: f64 },
    ChiSquared { degrees_of_freedom: f64 },
    /// Fisher-Snedecor F with numerator `d1` and denominator `d2` degrees of freedom
    F { d1: f64, d2: f64 },
    /// Location-scale Student's t
    StudentT {
        location: f64,
        scale: f64,
        degrees_of_freedom: f64,
    },
    Pareto { scale: f64, shape: f64 },
    Logistic { location: f64, scale: f64 },
    /// Number of Bernoulli trials up to and including the first success
    Geometric { probability: f64 },
    Rayleigh { sigma: f64 },
}

fn ensure(ok: bool, distribution: &'static str, reason: &'static str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(SimulationError::InvalidParameter {
            distribution,
            reason,
        })
    }
}

/// Smallest accepted geometric success probability.
///
/// Below this `1 - p` rounds to 1 and the sampler cannot be set up.
pub const MIN_GEOMETRIC_PROBABILITY: f64 = f64::EPSILON;

fn positive(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

impl DistributionParams {
    /// Family name as used in serialized requests
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fixed { .. } => "fixed",
            Self::Normal { .. } => "normal",
            Self::Uniform { .. } => "uniform",
            Self::Triangular { .. } => "triangular",
            Self::Exponential { .. } => "exponential",
            Self::LogNormal { .. } => "log_normal",
            Self::Beta { .. } => "beta",
            Self::Gamma { .. } => "gamma",
            Self::Weibull { .. } => "weibull",
            Self::ChiSquared { .. } => "chi_squared",
            Self::F { .. } => "f",
            Self::StudentT { .. } => "student_t",
            Self::Pareto { .. } => "pareto",
            Self::Logistic { .. } => "logistic",
            Self::Geometric { .. } => "geometric",
            Self::Rayleigh { .. } => "rayleigh",
        }
    }

    /// Check every parameter against the domain of its family.
    pub fn validate(&self) -> Result<()> {
        let name = self.name();
        match *self {
            Self::Fixed { value } => ensure(value.is_finite(), name, "value must be finite"),
            Self::Normal { mean, std_dev } => {
                ensure(mean.is_finite(), name, "mean must be finite")?;
                ensure(
                    std_dev.is_finite() && std_dev >= 0.0,
                    name,
                    "std_dev must be non-negative and finite",
                )
            }
            Self::Uniform { min, max } => {
                ensure(
                    min.is_finite() && max.is_finite(),
                    name,
                    "min and max must be finite",
                )?;
                ensure(min < max, name, "min must be less than max")
            }
            Self::Triangular { min, mode, max } => {
                ensure(
                    min.is_finite() && mode.is_finite() && max.is_finite(),
                    name,
                    "min, mode and max must be finite",
                )?;
                ensure(min < max, name, "min must be less than max")?;
                ensure(
                    min <= mode && mode <= max,
                    name,
                    "mode must lie within [min, max]",
                )
            }
            Self::Exponential { rate } => ensure(positive(rate), name, "rate must be positive"),
            Self::LogNormal { mu, sigma } => {
                ensure(mu.is_finite(), name, "mu must be finite")?;
                ensure(
                    sigma.is_finite() && sigma >= 0.0,
                    name,
                    "sigma must be non-negative and finite",
                )
            }
            Self::Beta { alpha, beta } => ensure(
                positive(alpha) && positive(beta),
                name,
                "alpha and beta must be positive",
            ),
            Self::Gamma { shape, scale } | Self::Weibull { scale, shape } => ensure(
                positive(shape) && positive(scale),
                name,
                "shape and scale must be positive",
            ),
            Self::Pareto { scale, shape } => ensure(
                positive(shape) && positive(scale),
                name,
                "shape and scale must be positive",
            ),
            Self::ChiSquared { degrees_of_freedom } => ensure(
                positive(degrees_of_freedom),
                name,
                "degrees of freedom must be positive",
            ),
            Self::F { d1, d2 } => ensure(
                positive(d1) && positive(d2),
                name,
                "degrees of freedom must be positive",
            ),
            Self::StudentT {
                location,
                scale,
                degrees_of_freedom,
            } => {
                ensure(location.is_finite(), name, "location must be finite")?;
                ensure(positive(scale), name, "scale must be positive")?;
                ensure(
                    positive(degrees_of_freedom),
                    name,
                    "degrees of freedom must be positive",
                )
            }
            Self::Logistic { location, scale } => {
                ensure(location.is_finite(), name, "location must be finite")?;
                ensure(positive(scale), name, "scale must be positive")
            }
            Self::Geometric { probability } => ensure(
                (MIN_GEOMETRIC_PROBABILITY..=1.0).contains(&probability),
                name,
                "probability must be in [f64::EPSILON, 1]",
            ),
            Self::Rayleigh { sigma } => ensure(positive(sigma), name, "sigma must be positive"),
        }
    }
}

/// Prepared sampler for a validated parameter set
#[derive(Debug, Clone)]
enum Sampler {
    Fixed(f64),
    Normal(rand_distr::Normal<f64>),
    Uniform(Uniform<f64>),
    Triangular(rand_distr::Triangular<f64>),
    Exponential(rand_distr::Exp<f64>),
    LogNormal(rand_distr::LogNormal<f64>),
    Beta(rand_distr::Beta<f64>),
    Gamma(rand_distr::Gamma<f64>),
    Weibull(rand_distr::Weibull<f64>),
    ChiSquared(rand_distr::ChiSquared<f64>),
    F(rand_distr::FisherF<f64>),
    StudentT {
        standard: rand_distr::StudentT<f64>,
        location: f64,
        scale: f64,
    },
    Pareto(rand_distr::Pareto<f64>),
    Logistic { location: f64, scale: f64 },
    Geometric(rand_distr::Geometric),
    Rayleigh { sigma: f64 },
}

fn rejected<E>(distribution: &'static str) -> impl FnOnce(E) -> SimulationError {
    move |_| SimulationError::InvalidParameter {
        distribution,
        reason: "parameters rejected by sampler",
    }
}

impl Sampler {
    fn build(params: &DistributionParams) -> Result<Self> {
        let name = params.name();
        let sampler = match *params {
            DistributionParams::Fixed { value } => Sampler::Fixed(value),
            DistributionParams::Normal { mean, std_dev } => {
                Sampler::Normal(rand_distr::Normal::new(mean, std_dev).map_err(rejected(name))?)
            }
            DistributionParams::Uniform { min, max } => {
                Sampler::Uniform(Uniform::new(min, max).map_err(rejected(name))?)
            }
            DistributionParams::Triangular { min, mode, max } => Sampler::Triangular(
                rand_distr::Triangular::new(min, max, mode).map_err(rejected(name))?,
            ),
            DistributionParams::Exponential { rate } => {
                Sampler::Exponential(rand_distr::Exp::new(rate).map_err(rejected(name))?)
            }
            DistributionParams::LogNormal { mu, sigma } => {
                Sampler::LogNormal(rand_distr::LogNormal::new(mu, sigma).map_err(rejected(name))?)
            }
            DistributionParams::Beta { alpha, beta } => {
                Sampler::Beta(rand_distr::Beta::new(alpha, beta).map_err(rejected(name))?)
            }
            DistributionParams::Gamma { shape, scale } => {
                Sampler::Gamma(rand_distr::Gamma::new(shape, scale).map_err(rejected(name))?)
            }
            DistributionParams::Weibull { scale, shape } => {
                Sampler::Weibull(rand_distr::Weibull::new(scale, shape).map_err(rejected(name))?)
            }
            DistributionParams::ChiSquared { degrees_of_freedom } => Sampler::ChiSquared(
                rand_distr::ChiSquared::new(degrees_of_freedom).map_err(rejected(name))?,
            ),
            DistributionParams::F { d1, d2 } => {
                Sampler::F(rand_distr::FisherF::new(d1, d2).map_err(rejected(name))?)
            }
            DistributionParams::StudentT {
                location,
                scale,
                degrees_of_freedom,
            } => Sampler::StudentT {
                standard: rand_distr::StudentT::new(degrees_of_freedom).map_err(rejected(name))?,
                location,
                scale,
            },
            DistributionParams::Pareto { scale, shape } => {
                Sampler::Pareto(rand_distr::Pareto::new(scale, shape).map_err(rejected(name))?)
            }
            DistributionParams::Logistic { location, scale } => {
                Sampler::Logistic { location, scale }
            }
            DistributionParams::Geometric { probability } => {
                Sampler::Geometric(rand_distr::Geometric::new(probability).map_err(rejected(name))?)
            }
            DistributionParams::Rayleigh { sigma } => Sampler::Rayleigh { sigma },
        };
        Ok(sampler)
    }
}

/// A validated, immutable distribution ready for sampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "DistributionParams", into = "DistributionParams")]
pub struct Distribution {
    params: DistributionParams,
    sampler: Sampler,
}

impl Distribution {
    /// Validate `params` and prepare a sampler.
    pub fn new(params: DistributionParams) -> Result<Self> {
        params.validate()?;
        let sampler = Sampler::build(&params)?;
        Ok(Self { params, sampler })
    }

    pub fn fixed(value: f64) -> Result<Self> {
        Self::new(DistributionParams::Fixed { value })
    }

    pub fn normal(mean: f64, std_dev: f64) -> Result<Self> {
        Self::new(DistributionParams::Normal { mean, std_dev })
    }

    pub fn uniform(min: f64, max: f64) -> Result<Self> {
        Self::new(DistributionParams::Uniform { min, max })
    }

    pub fn triangular(min: f64, mode: f64, max: f64) -> Result<Self> {
        Self::new(DistributionParams::Triangular { min, mode, max })
    }

    pub fn exponential(rate: f64) -> Result<Self> {
        Self::new(DistributionParams::Exponential { rate })
    }

    pub fn log_normal(mu: f64, sigma: f64) -> Result<Self> {
        Self::new(DistributionParams::LogNormal { mu, sigma })
    }

    #[must_use]
    pub fn params(&self) -> &DistributionParams {
        &self.params
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.params.name()
    }

    /// Draw one value, advancing `rng`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match &self.sampler {
            Sampler::Fixed(value) => *value,
            Sampler::Normal(d) => d.sample(rng),
            Sampler::Uniform(d) => d.sample(rng),
            Sampler::Triangular(d) => d.sample(rng),
            Sampler::Exponential(d) => d.sample(rng),
            Sampler::LogNormal(d) => d.sample(rng),
            Sampler::Beta(d) => d.sample(rng),
            Sampler::Gamma(d) => d.sample(rng),
            Sampler::Weibull(d) => d.sample(rng),
            Sampler::ChiSquared(d) => d.sample(rng),
            Sampler::F(d) => d.sample(rng),
            Sampler::StudentT {
                standard,
                location,
                scale,
            } => location + scale * standard.sample(rng),
            Sampler::Pareto(d) => d.sample(rng),
            Sampler::Logistic { location, scale } => {
                // Inverse CDF on the open interval keeps ln() finite
                let u: f64 = Open01.sample(rng);
                location + scale * (u / (1.0 - u)).ln()
            }
            // rand_distr counts failures before the first success
            Sampler::Geometric(d) => d.sample(rng).saturating_add(1) as f64,
            Sampler::Rayleigh { sigma } => {
                let u: f64 = Open01.sample(rng);
                sigma * (-2.0 * u.ln()).sqrt()
            }
        }
    }

    /// Theoretical mean, `None` where it does not exist.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        let mean = match self.params {
            DistributionParams::Fixed { value } => value,
            DistributionParams::Normal { mean, .. } => mean,
            DistributionParams::Uniform { min, max } => (min + max) / 2.0,
            DistributionParams::Triangular { min, mode, max } => (min + mode + max) / 3.0,
            DistributionParams::Exponential { rate } => 1.0 / rate,
            DistributionParams::LogNormal { mu, sigma } => (mu + sigma * sigma / 2.0).exp(),
            DistributionParams::Beta { alpha, beta } => alpha / (alpha + beta),
            DistributionParams::Gamma { shape, scale } => shape * scale,
            DistributionParams::Weibull { scale, shape } => scale * gamma_fn(1.0 + 1.0 / shape),
            DistributionParams::ChiSquared { degrees_of_freedom } => degrees_of_freedom,
            DistributionParams::F { d2, .. } => {
                if d2 <= 2.0 {
                    return None;
                }
                d2 / (d2 - 2.0)
            }
            DistributionParams::StudentT {
                location,
                degrees_of_freedom,
                ..
            } => {
                if degrees_of_freedom <= 1.0 {
                    return None;
                }
                location
            }
            DistributionParams::Pareto { scale, shape } => {
                if shape <= 1.0 {
                    return None;
                }
                shape * scale / (shape - 1.0)
            }
            DistributionParams::Logistic { location, .. } => location,
            DistributionParams::Geometric { probability } => 1.0 / probability,
            DistributionParams::Rayleigh { sigma } => sigma * (PI / 2.0).sqrt(),
        };
        Some(mean)
    }

    /// Theoretical variance, `None` where it is undefined or infinite.
    #[must_use]
    pub fn variance(&self) -> Option<f64> {
        let variance = match self.params {
            DistributionParams::Fixed { .. } => 0.0,
            DistributionParams::Normal { std_dev, .. } => std_dev * std_dev,
            DistributionParams::Uniform { min, max } => (max - min).powi(2) / 12.0,
            DistributionParams::Triangular { min, mode, max } => {
                (min * min + mode * mode + max * max - min * mode - min * max - mode * max) / 18.0
            }
            DistributionParams::Exponential { rate } => 1.0 / (rate * rate),
            DistributionParams::LogNormal { mu, sigma } => {
                let s2 = sigma * sigma;
                (s2.exp() - 1.0) * (2.0 * mu + s2).exp()
            }
            DistributionParams::Beta { alpha, beta } => {
                let sum = alpha + beta;
                alpha * beta / (sum * sum * (sum + 1.0))
            }
            DistributionParams::Gamma { shape, scale } => shape * scale * scale,
            DistributionParams::Weibull { scale, shape } => {
                let g1 = gamma_fn(1.0 + 1.0 / shape);
                let g2 = gamma_fn(1.0 + 2.0 / shape);
                scale * scale * (g2 - g1 * g1)
            }
            DistributionParams::ChiSquared { degrees_of_freedom } => 2.0 * degrees_of_freedom,
            DistributionParams::F { d1, d2 } => {
                if d2 <= 4.0 {
                    return None;
                }
                2.0 * d2 * d2 * (d1 + d2 - 2.0) / (d1 * (d2 - 2.0).powi(2) * (d2 - 4.0))
            }
            DistributionParams::StudentT {
                scale,
                degrees_of_freedom,
                ..
            } => {
                if degrees_of_freedom <= 2.0 {
                    return None;
                }
                scale * scale * degrees_of_freedom / (degrees_of_freedom - 2.0)
            }
            DistributionParams::Pareto { scale, shape } => {
                if shape <= 2.0 {
                    return None;
                }
                scale * scale * shape / ((shape - 1.0).powi(2) * (shape - 2.0))
            }
            DistributionParams::Logistic { scale, .. } => scale * scale * PI * PI / 3.0,
            DistributionParams::Geometric { probability } => {
                (1.0 - probability) / (probability * probability)
            }
            DistributionParams::Rayleigh { sigma } => (4.0 - PI) / 2.0 * sigma * sigma,
        };
        Some(variance)
    }
}

impl PartialEq for Distribution {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params
    }
}

impl TryFrom<DistributionParams> for Distribution {
    type Error = SimulationError;

    fn try_from(params: DistributionParams) -> Result<Self> {
        Self::new(params)
    }
}

impl From<Distribution> for DistributionParams {
    fn from(distribution: Distribution) -> Self {
        distribution.params
    }
}

/// Lanczos approximation of the gamma function for `x > 0`
fn gamma_fn(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        return PI / ((PI * x).sin() * gamma_fn(1.0 - x));
    }
    let x = x - 1.0;
    let t = x + G + 0.5;
    let series = COEFFS
        .iter()
        .enumerate()
        .skip(1)
        .fold(COEFFS[0], |acc, (i, c)| acc + c / (x + i as f64));
    (2.0 * PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * series
}
